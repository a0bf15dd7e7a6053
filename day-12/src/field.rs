use std::{cell::OnceCell, fmt, str::FromStr};

use itertools::{iproduct, Itertools};

use crate::{error::InvalidGrid, parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// `(row, col)` offset of one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Self::North => (-1, 0),
            Self::South => (1, 0),
            Self::East => (0, 1),
            Self::West => (0, -1),
        }
    }
}

/// Dense id handed out in row-major discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(usize);

impl RegionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A maximal 4-connected group of plots sharing one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    id: RegionId,
    label: char,
    cells: Vec<Position>,
    perimeter: usize,
    sides: usize,
}

impl Region {
    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn label(&self) -> char {
        self.label
    }

    /// Member plots in flood-fill order.
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Number of unit fence segments around the region.
    pub fn perimeter(&self) -> usize {
        self.perimeter
    }

    /// Number of straight fence runs; collinear segments on the same facing count once.
    pub fn sides(&self) -> usize {
        self.sides
    }

    pub fn price(&self) -> usize {
        self.area() * self.perimeter
    }

    pub fn bulk_price(&self) -> usize {
        self.area() * self.sides
    }
}

/// Region assignment for every plot of a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    region_ids: Vec<RegionId>,
    regions: Vec<Region>,
}

impl Partition {
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

/// A rectangular garden of labelled plots.
///
/// Regions are flood-filled on first use and cached for the lifetime of the
/// field, so every query after the first reuses the same [`Partition`].
#[derive(Debug, Clone)]
pub struct Field {
    width: usize,
    height: usize,
    labels: Vec<char>,
    partition: OnceCell<Partition>,
}

impl Field {
    /// Builds a field from row strings, one label per character.
    pub fn new<I, R>(rows: I) -> Result<Self, InvalidGrid>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.as_ref().chars().collect())
                .collect(),
        )
    }

    pub fn from_rows(rows: Vec<Vec<char>>) -> Result<Self, InvalidGrid> {
        if rows.iter().all(Vec::is_empty) {
            return Err(InvalidGrid::Empty);
        }

        let width = rows[0].len();
        if let Some((row, cells)) = rows.iter().find_position(|cells| cells.len() != width) {
            return Err(InvalidGrid::Ragged {
                row,
                expected: width,
                found: cells.len(),
            });
        }

        let bad_label = rows.iter().enumerate().find_map(|(row, cells)| {
            cells
                .iter()
                .position(|&label| !parser::is_plot_label(label))
                .map(|col| (row, col, cells[col]))
        });
        if let Some((row, col, label)) = bad_label {
            return Err(InvalidGrid::Label { row, col, label });
        }

        Ok(Self {
            width,
            height: rows.len(),
            labels: rows.into_iter().flatten().collect(),
            partition: OnceCell::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    pub fn label(&self, pos: Position) -> Option<char> {
        self.contains(pos).then(|| self.labels[self.index(pos)])
    }

    /// The orthogonal neighbour of `pos`, if it lies inside the field.
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Option<Position> {
        let (d_row, d_col) = direction.delta();
        let next = Position {
            row: pos.row.checked_add_signed(d_row)?,
            col: pos.col.checked_add_signed(d_col)?,
        };
        self.contains(next).then_some(next)
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.height, 0..self.width).map(|(row, col)| Position { row, col })
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition.get().is_some()
    }

    pub fn partition(&self) -> &Partition {
        self.partition.get_or_init(|| self.build_partition())
    }

    pub fn regions(&self) -> &[Region] {
        self.partition().regions()
    }

    pub fn region_id(&self, pos: Position) -> Option<RegionId> {
        self.contains(pos)
            .then(|| self.partition().region_ids[self.index(pos)])
    }

    pub fn region_at(&self, pos: Position) -> Option<&Region> {
        let id = self.region_id(pos)?;
        self.partition().region(id)
    }

    pub fn unit_perimeter(&self, id: RegionId) -> Option<usize> {
        self.partition().region(id).map(Region::perimeter)
    }

    pub fn side_count(&self, id: RegionId) -> Option<usize> {
        self.partition().region(id).map(Region::sides)
    }

    /// Sum of area × perimeter over all regions.
    pub fn fence_cost(&self) -> usize {
        self.regions().iter().map(Region::price).sum()
    }

    /// Sum of area × sides over all regions.
    pub fn bulk_fence_cost(&self) -> usize {
        self.regions().iter().map(Region::bulk_price).sum()
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.width + pos.col
    }

    fn position(&self, index: usize) -> Position {
        Position {
            row: index / self.width,
            col: index % self.width,
        }
    }

    #[tracing::instrument(skip(self), fields(width = self.width, height = self.height))]
    fn build_partition(&self) -> Partition {
        let mut assigned: Vec<Option<RegionId>> = vec![None; self.labels.len()];
        let mut members: Vec<(char, Vec<Position>)> = Vec::new();
        let mut stack = Vec::new();

        for seed in 0..self.labels.len() {
            if assigned[seed].is_some() {
                continue;
            }

            let id = RegionId(members.len());
            let label = self.labels[seed];
            let mut cells = Vec::new();

            assigned[seed] = Some(id);
            stack.push(self.position(seed));

            while let Some(pos) = stack.pop() {
                cells.push(pos);
                for next in Direction::ALL
                    .into_iter()
                    .filter_map(|direction| self.neighbor(pos, direction))
                {
                    let index = self.index(next);
                    if assigned[index].is_none() && self.labels[index] == label {
                        assigned[index] = Some(id);
                        stack.push(next);
                    }
                }
            }

            tracing::trace!(id = id.0, %label, area = cells.len(), "flooded region");
            members.push((label, cells));
        }

        // every seed is assigned before its flood starts
        let region_ids: Vec<RegionId> = assigned.into_iter().flatten().collect();
        let sides = self.count_sides(&region_ids, members.len());

        let regions = members
            .into_iter()
            .zip(sides)
            .enumerate()
            .map(|(id, ((label, cells), sides))| {
                let perimeter = cells
                    .iter()
                    .map(|&pos| {
                        Direction::ALL
                            .into_iter()
                            .filter(|&facing| self.has_fence(&region_ids, pos, facing))
                            .count()
                    })
                    .sum();
                Region {
                    id: RegionId(id),
                    label,
                    cells,
                    perimeter,
                    sides,
                }
            })
            .collect_vec();

        tracing::debug!(
            regions = regions.len(),
            plots = self.labels.len(),
            "partitioned field"
        );

        Partition {
            region_ids,
            regions,
        }
    }

    /// A plot is fenced on `facing` when the field ends there or the
    /// neighbour belongs to another region.
    fn has_fence(&self, region_ids: &[RegionId], pos: Position, facing: Direction) -> bool {
        let id = region_ids[self.index(pos)];
        self.neighbor(pos, facing)
            .map_or(true, |next| region_ids[self.index(next)] != id)
    }

    fn count_sides(&self, region_ids: &[RegionId], region_count: usize) -> Vec<usize> {
        let mut sides = vec![0; region_count];

        for row in 0..self.height {
            let line = (0..self.width).map(|col| Position { row, col });
            self.sweep(
                region_ids,
                line,
                [Direction::North, Direction::South],
                &mut sides,
            );
        }

        for col in 0..self.width {
            let line = (0..self.height).map(|row| Position { row, col });
            self.sweep(
                region_ids,
                line,
                [Direction::West, Direction::East],
                &mut sides,
            );
        }

        sides
    }

    /// Walks one line of plots, opening a side for the plot's region whenever
    /// a fence on `facings` starts. A fence continues only while the previous
    /// plot in the line is in the same region and fenced on the same facing.
    fn sweep(
        &self,
        region_ids: &[RegionId],
        line: impl Iterator<Item = Position>,
        facings: [Direction; 2],
        sides: &mut [usize],
    ) {
        let mut previous: Option<(RegionId, [bool; 2])> = None;

        for pos in line {
            let id = region_ids[self.index(pos)];
            let fenced = facings.map(|facing| self.has_fence(region_ids, pos, facing));

            for (facing, &is_fenced) in fenced.iter().enumerate() {
                let continues =
                    matches!(previous, Some((prev, open)) if prev == id && open[facing]);
                if is_fenced && !continues {
                    sides[id.0] += 1;
                }
            }

            previous = Some((id, fenced));
        }
    }
}

impl FromStr for Field {
    type Err = InvalidGrid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_rows(s).and_then(Self::from_rows)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .labels
            .chunks(self.width)
            .map(|row| row.iter().collect::<String>())
            .join("\n");
        write!(f, "{}", rows)
    }
}
