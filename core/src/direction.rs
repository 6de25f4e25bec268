//! Move directions and the index arithmetic that lets one slide routine
//! walk the grid in any orientation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GRID_SIZE;

/// The four possible move directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

/// Iteration parameters for one direction.
///
/// `start` is the edge cell of the first line, `row_step` advances to the
/// next line and `tile_step` moves one cell toward the edge, i.e. the
/// direction tiles are compacted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWalk {
    pub start: usize,
    pub row_step: isize,
    pub tile_step: isize,
}

impl LineWalk {
    pub const fn new(start: usize, row_step: isize, tile_step: isize) -> Self {
        LineWalk {
            start,
            row_step,
            tile_step,
        }
    }

    /// Edge cell of line `line` (0..4).
    pub fn origin(&self, line: usize) -> usize {
        let offset = self.row_step * line as isize;
        self.start.wrapping_add_signed(offset)
    }

    /// Cells of line `line`, starting at the edge.
    pub fn cells(&self, line: usize) -> [usize; GRID_SIZE] {
        let origin = self.origin(line);
        std::array::from_fn(|k| origin.wrapping_add_signed(self.tile_step * k as isize))
    }
}

impl Direction {
    /// Convert a u8 to a Direction (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    /// Map a browser `KeyboardEvent.key` name to a direction.
    pub fn from_key_name(key: &str) -> Option<Direction> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Get all four directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    /// Resolve this direction into its line-walking parameters.
    pub const fn walk(self) -> LineWalk {
        match self {
            Direction::Up => LineWalk::new(0, 1, 4),
            Direction::Down => LineWalk::new(12, 1, -4),
            Direction::Left => LineWalk::new(0, 4, 1),
            Direction::Right => LineWalk::new(3, 4, -1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing text that names none of the four directions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction `{0}`")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(walk: LineWalk) -> (usize, isize, isize) {
        (walk.start, walk.row_step, walk.tile_step)
    }

    #[test]
    fn test_walk_table() {
        assert_eq!(parts(Direction::Up.walk()), (0, 1, 4));
        assert_eq!(parts(Direction::Down.walk()), (12, 1, -4));
        assert_eq!(parts(Direction::Left.walk()), (0, 4, 1));
        assert_eq!(parts(Direction::Right.walk()), (3, 4, -1));
    }

    #[test]
    fn test_lines_cover_grid_once() {
        for direction in Direction::all() {
            let walk = direction.walk();
            let mut seen = [false; 16];
            for line in 0..GRID_SIZE {
                for idx in walk.cells(line) {
                    assert!(!seen[idx], "{direction}: cell {idx} visited twice");
                    seen[idx] = true;
                }
            }
            assert!(seen.iter().all(|&s| s), "{direction}: grid not covered");
        }
    }

    #[test]
    fn test_line_cells() {
        assert_eq!(Direction::Right.walk().cells(1), [7, 6, 5, 4]);
        assert_eq!(Direction::Down.walk().cells(2), [14, 10, 6, 2]);
        assert_eq!(Direction::Up.walk().cells(3), [3, 7, 11, 15]);
    }

    #[test]
    fn test_direction_from_u8() {
        assert_eq!(Direction::from_u8(0), Some(Direction::Up));
        assert_eq!(Direction::from_u8(1), Some(Direction::Down));
        assert_eq!(Direction::from_u8(2), Some(Direction::Left));
        assert_eq!(Direction::from_u8(3), Some(Direction::Right));
        assert_eq!(Direction::from_u8(4), None);
        assert_eq!(Direction::from_u8(255), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("LEFT".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert!("diagonal".parse::<Direction>().is_err());
    }

    #[test]
    fn test_key_names() {
        assert_eq!(
            Direction::from_key_name("ArrowRight"),
            Some(Direction::Right)
        );
        assert_eq!(Direction::from_key_name("Enter"), None);
    }
}
