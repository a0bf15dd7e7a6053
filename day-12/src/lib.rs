pub mod error;
pub mod field;
pub mod parser;
pub mod part1;
pub mod part2;

pub use error::InvalidGrid;
pub use field::{Direction, Field, Partition, Position, Region, RegionId};
