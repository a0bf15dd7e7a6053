use miette::Result;

use crate::field::Field;

#[tracing::instrument]
pub fn process(input: &str) -> Result<String> {
    let field: Field = input.parse()?;
    Ok(field.bulk_fence_cost().to_string())
}
