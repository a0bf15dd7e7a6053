use nom::{
    character::complete::{line_ending, satisfy},
    multi::{many1, separated_list1},
    IResult,
};
use nom_locate::LocatedSpan;

use crate::error::InvalidGrid;

pub type Span<'a> = LocatedSpan<&'a str>;

const NEWLINE: [char; 2] = ['\r', '\n'];

/// Any printable, non-whitespace character names a plot.
pub fn is_plot_label(c: char) -> bool {
    !c.is_whitespace() && !c.is_control()
}

fn parse_label(input: Span) -> IResult<Span, char> {
    satisfy(is_plot_label)(input)
}

fn parse_grid(input: Span) -> IResult<Span, Vec<Vec<char>>> {
    separated_list1(line_ending, many1(parse_label))(input)
}

/// Splits puzzle text into rows of plot labels.
///
/// Trailing line endings are ignored. Row widths are not checked here,
/// [`Field::from_rows`](crate::Field::from_rows) does that.
#[tracing::instrument(skip(input), fields(len = input.len()))]
pub fn parse_rows(input: &str) -> Result<Vec<Vec<char>>, InvalidGrid> {
    if input.trim_end_matches(NEWLINE).is_empty() {
        return Err(InvalidGrid::Empty);
    }

    let (rest, rows) = parse_grid(Span::new(input)).map_err(|e| match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => unexpected(e.input),
        nom::Err::Incomplete(_) => InvalidGrid::Empty,
    })?;

    if rest.fragment().trim_end_matches(NEWLINE).is_empty() {
        return Ok(rows);
    }

    // the separator matched but no row followed it
    match line_ending::<Span, nom::error::Error<Span>>(rest) {
        Ok((after, _)) if after.fragment().starts_with(NEWLINE) => Err(InvalidGrid::Ragged {
            row: rows.len(),
            expected: rows.first().map_or(0, Vec::len),
            found: 0,
        }),
        Ok((after, _)) => Err(unexpected(after)),
        Err(_) => Err(unexpected(rest)),
    }
}

fn unexpected(span: Span) -> InvalidGrid {
    match span.fragment().chars().next() {
        Some(label) => InvalidGrid::Label {
            row: span.location_line() as usize - 1,
            col: span.get_utf8_column() - 1,
            label,
        },
        None => InvalidGrid::Empty,
    }
}
