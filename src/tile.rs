//! Tiles and the flavor catalog that seeds boards.

use std::{fs, path::Path};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    common::{GameError, LoadError},
    config::MIN_CATALOG_TILES,
    event::ActiveEvent,
    ship::ShipKind,
};

/// Immutable flavor record: the task a team must complete for this tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorTile {
    pub name: String,
    #[serde(default = "unknown_difficulty")]
    pub difficulty: String,
    #[serde(default, alias = "details")]
    pub description: String,
    #[serde(default = "one")]
    pub count: u32,
}

fn unknown_difficulty() -> String {
    "unknown".to_string()
}

fn one() -> u32 {
    1
}

impl FlavorTile {
    pub fn new(name: impl Into<String>, difficulty: impl Into<String>, description: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            difficulty: difficulty.into(),
            description: description.into(),
            count,
        }
    }
}

/// What a ship placement displaced. Has no snapshot field of its own, so
/// snapshots never nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub flavor: FlavorTile,
    pub ship: Option<ShipKind>,
}

/// Non-combat layer over a tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlay {
    #[default]
    Clear,
    Event(ActiveEvent),
    /// Terminal: left behind by a failed event.
    Wrecked,
}

/// One grid cell: flavor plus the mutable ship/event layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub flavor: FlavorTile,
    pub ship: Option<ShipKind>,
    pub overlay: Overlay,
    pub previous: Option<TileSnapshot>,
}

impl Tile {
    pub fn new(flavor: FlavorTile) -> Self {
        Self {
            flavor,
            ship: None,
            overlay: Overlay::Clear,
            previous: None,
        }
    }

    pub fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            flavor: self.flavor.clone(),
            ship: self.ship,
        }
    }

    /// Put the flavor and ship layers back as they were in `snapshot`.
    pub fn restore(&mut self, snapshot: TileSnapshot) {
        self.flavor = snapshot.flavor;
        self.ship = snapshot.ship;
    }

    pub fn is_wrecked(&self) -> bool {
        matches!(self.overlay, Overlay::Wrecked)
    }

    pub fn event(&self) -> Option<&ActiveEvent> {
        match &self.overlay {
            Overlay::Event(event) => Some(event),
            _ => None,
        }
    }
}

/// The pool of flavor tiles a board is dealt from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCatalog {
    tiles: Vec<FlavorTile>,
}

impl TileCatalog {
    pub fn new(tiles: Vec<FlavorTile>) -> Self {
        Self { tiles }
    }

    /// Load `base_tiles.json`: `{ "tiles": [ {name, difficulty, description, count}, .. ] }`.
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

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[FlavorTile] {
        &self.tiles
    }

    /// Fails with `InsufficientCatalog` unless one board's worth of tiles is present.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.tiles.len() < MIN_CATALOG_TILES {
            return Err(GameError::InsufficientCatalog {
                found: self.tiles.len(),
                required: MIN_CATALOG_TILES,
            });
        }
        Ok(())
    }

    /// A uniformly shuffled copy of the first `MIN_CATALOG_TILES` draws.
    pub fn deal<R: Rng>(&self, rng: &mut R) -> Result<Vec<FlavorTile>, GameError> {
        self.validate()?;
        let mut pool = self.tiles.clone();
        pool.shuffle(rng);
        pool.truncate(MIN_CATALOG_TILES);
        Ok(pool)
    }
}
