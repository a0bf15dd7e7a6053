use day_12::part1::process;
use miette::Context;
use tracing_subscriber::EnvFilter;

#[tracing::instrument]
fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let file = include_str!("../../input1.txt");
    let result = process(file).context("process part 1")?;
    println!("{}", result);
    Ok(())
}
