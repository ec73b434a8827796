//! Ship kinds, orientation, and the straight run a ship occupies.

use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    common::{GameError, LoadError},
    coord::Coordinate,
    tile::FlavorTile,
};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl FromStr for Orientation {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Ok(Orientation::Horizontal),
            "v" | "vertical" => Ok(Orientation::Vertical),
            _ => Err(GameError::InvalidOrientation(s.to_string())),
        }
    }
}

/// The five ship types of a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    pub const ALL: [ShipKind; 5] = [
        ShipKind::Carrier,
        ShipKind::Battleship,
        ShipKind::Cruiser,
        ShipKind::Submarine,
        ShipKind::Destroyer,
    ];

    /// Number of tiles the ship occupies.
    pub const fn length(self) -> usize {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser => 3,
            ShipKind::Submarine => 3,
            ShipKind::Destroyer => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShipKind::Carrier => "carrier",
            ShipKind::Battleship => "battleship",
            ShipKind::Cruiser => "cruiser",
            ShipKind::Submarine => "submarine",
            ShipKind::Destroyer => "destroyer",
        }
    }

    /// Coordinates covered when the bow sits at `start`.
    /// Fails with `OutOfBounds` if any segment leaves the grid.
    pub fn run(self, start: Coordinate, orientation: Orientation) -> Result<Vec<Coordinate>, GameError> {
        (0..self.length())
            .map(|i| {
                start
                    .step(orientation, i)
                    .ok_or(GameError::OutOfBounds(self))
            })
            .collect()
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for ShipKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ShipKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| GameError::UnknownShip(s.to_string()))
    }
}

/// Per-kind segment flavor. When a ship is placed, segment `i` takes the
/// task in slot `i` instead of the tile's own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipCatalog {
    segments: BTreeMap<ShipKind, Vec<FlavorTile>>,
}

impl ShipCatalog {
    /// No segment flavor; placed ships keep the flavor of the tiles under them.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn new(segments: BTreeMap<ShipKind, Vec<FlavorTile>>) -> Self {
        Self { segments }
    }

    /// Load `ship_tiles.json`: `{ "carrier": [ {tile}, .. ], .. }`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn segment(&self, kind: ShipKind, index: usize) -> Option<&FlavorTile> {
        self.segments.get(&kind).and_then(|tiles| tiles.get(index))
    }
}
