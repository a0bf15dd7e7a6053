use miette::Diagnostic;
use thiserror::Error;

/// Raised when a garden cannot be turned into a [`Field`](crate::Field).
///
/// Rows and columns are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum InvalidGrid {
    #[error("grid has no plots")]
    #[diagnostic(
        code(day_12::invalid_grid::empty),
        help("supply at least one row of plot labels")
    )]
    Empty,

    #[error("row {row} is {found} plots wide, expected {expected}")]
    #[diagnostic(
        code(day_12::invalid_grid::ragged),
        help("every row of the garden must have the same width")
    )]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{label:?} at row {row}, column {col} is not a plot label")]
    #[diagnostic(
        code(day_12::invalid_grid::label),
        help("plot labels are printable, non-whitespace characters")
    )]
    Label { row: usize, col: usize, label: char },
}
