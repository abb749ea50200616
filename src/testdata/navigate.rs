//! Bounded focus movement over the data grid

use std::str::FromStr;

/// A cell position, zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" | "ArrowUp" => Ok(Direction::Up),
            "down" | "ArrowDown" => Ok(Direction::Down),
            "left" | "ArrowLeft" => Ok(Direction::Left),
            "right" | "ArrowRight" => Ok(Direction::Right),
            other => Err(format!(
                "Unknown direction '{}'. Expected up, down, left or right",
                other
            )),
        }
    }
}

/// Move one cell in `direction`, clamped to the grid; never wraps
///
/// On an empty grid the position is returned unchanged.
pub fn navigate(pos: GridPos, direction: Direction, rows: usize, cols: usize) -> GridPos {
    if rows == 0 || cols == 0 {
        return pos;
    }
    let max_row = rows - 1;
    let max_col = cols - 1;
    let row = pos.row.min(max_row);
    let col = pos.col.min(max_col);

    match direction {
        Direction::Up => GridPos::new(row.saturating_sub(1), col),
        Direction::Down => GridPos::new((row + 1).min(max_row), col),
        Direction::Left => GridPos::new(row, col.saturating_sub(1)),
        Direction::Right => GridPos::new(row, (col + 1).min(max_col)),
    }
}
