//! Grid coordinates: `A1` through `J10`, bijective with a row-major index.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    common::GameError,
    config::{BOARD_SIZE, ROW_LABELS},
    ship::Orientation,
};

/// A tile position. Ordering is row-major, so a `BTreeMap` keyed by
/// coordinates iterates `A1, A2, .., A10, B1, ..`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    row: u8,
    col: u8,
}

impl Coordinate {
    /// Zero-based row and column; `None` outside the grid.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE as usize && col < BOARD_SIZE as usize {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        let n = BOARD_SIZE as usize;
        Self::new(index / n, index % n)
    }

    pub fn index(&self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }

    pub fn row(&self) -> usize {
        self.row as usize
    }

    pub fn col(&self) -> usize {
        self.col as usize
    }

    pub fn row_label(&self) -> char {
        ROW_LABELS[self.row as usize]
    }

    /// All 100 coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE as usize * BOARD_SIZE as usize).filter_map(Self::from_index)
    }

    /// The coordinate `steps` tiles right (horizontal) or down (vertical).
    pub fn step(&self, orientation: Orientation, steps: usize) -> Option<Self> {
        match orientation {
            Orientation::Horizontal => Self::new(self.row(), self.col() + steps),
            Orientation::Vertical => Self::new(self.row() + steps, self.col()),
        }
    }

    /// Parse user input. Case, whitespace and commas are ignored, so `a3`,
    /// `A,3` and ` A 3 ` all name the same tile.
    pub fn parse(input: &str) -> Result<Self, GameError> {
        let normalized: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let invalid = || GameError::InvalidCoordinate(input.to_string());

        let mut chars = normalized.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let row = ROW_LABELS.iter().position(|&l| l == letter).ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let col: usize = digits.parse().map_err(|_| invalid())?;
        if col == 0 {
            return Err(invalid());
        }
        Self::new(row, col - 1).ok_or_else(invalid)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_label(), self.col + 1)
    }
}

impl FromStr for Coordinate {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Stored as the `A1` label so JSON maps keyed by coordinate stay readable.
impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Coordinate::parse(&raw).map_err(de::Error::custom)
    }
}
