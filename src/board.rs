//! Board state: dealt tiles, ship placements, the shot log, and the lock.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    combat::{Actor, Shot},
    common::GameError,
    coord::Coordinate,
    event::ActiveEvent,
    ship::ShipKind,
    tile::{Overlay, Tile, TileCatalog},
};

/// One side's 10×10 board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: BTreeMap<Coordinate, Tile>,
    ships: BTreeMap<ShipKind, Vec<Coordinate>>,
    shots: BTreeMap<Coordinate, Shot>,
    locked: bool,
}

impl Board {
    /// Deal a fresh board: shuffle the catalog and lay one tile per
    /// coordinate in row-major order, never reusing a catalog entry.
    pub fn generate<R: Rng>(catalog: &TileCatalog, rng: &mut R) -> Result<Self, GameError> {
        let dealt = catalog.deal(rng)?;
        let tiles = Coordinate::all()
            .zip(dealt)
            .map(|(coord, flavor)| (coord, Tile::new(flavor)))
            .collect();
        Ok(Board {
            tiles,
            ships: BTreeMap::new(),
            shots: BTreeMap::new(),
            locked: false,
        })
    }

    pub fn tile(&self, coord: Coordinate) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub(crate) fn tile_mut(&mut self, coord: Coordinate) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (&Coordinate, &Tile)> {
        self.tiles.iter()
    }

    pub fn ships(&self) -> &BTreeMap<ShipKind, Vec<Coordinate>> {
        &self.ships
    }

    pub(crate) fn ships_mut(&mut self) -> &mut BTreeMap<ShipKind, Vec<Coordinate>> {
        &mut self.ships
    }

    pub fn ship_coords(&self, kind: ShipKind) -> Option<&[Coordinate]> {
        self.ships.get(&kind).map(Vec::as_slice)
    }

    pub fn shots(&self) -> &BTreeMap<Coordinate, Shot> {
        &self.shots
    }

    pub fn shot(&self, coord: Coordinate) -> Option<&Shot> {
        self.shots.get(&coord)
    }

    /// Append to the shot log. Callers check for re-targeting first.
    pub(crate) fn record_shot(&mut self, coord: Coordinate, shot: Shot) {
        debug_assert!(!self.shots.contains_key(&coord));
        self.shots.insert(coord, shot);
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Required kinds not yet placed, in the order given.
    pub fn missing_ships(&self, required: &[ShipKind]) -> Vec<ShipKind> {
        required
            .iter()
            .copied()
            .filter(|kind| !self.ships.contains_key(kind))
            .collect()
    }

    pub fn lock(&mut self, required: &[ShipKind]) -> Result<(), GameError> {
        if self.locked {
            return Err(GameError::AlreadyLocked);
        }
        let missing = self.missing_ships(required);
        if !missing.is_empty() {
            return Err(GameError::IncompleteFleet(missing));
        }
        self.locked = true;
        Ok(())
    }

    pub fn unlock(&mut self) -> Result<(), GameError> {
        if !self.locked {
            return Err(GameError::NotLocked);
        }
        self.locked = false;
        Ok(())
    }

    /// Returns `true` when every segment of `kind` has a damaging shot on it.
    pub fn is_sunk(&self, kind: ShipKind) -> bool {
        match self.ships.get(&kind) {
            Some(coords) => coords
                .iter()
                .all(|c| self.shots.get(c).is_some_and(|s| s.hit)),
            None => false,
        }
    }

    pub fn sunk_ships(&self) -> Vec<ShipKind> {
        self.ships.keys().copied().filter(|k| self.is_sunk(*k)).collect()
    }

    /// Returns `true` when at least one ship is placed and all placed ships are sunk.
    pub fn all_sunk(&self) -> bool {
        !self.ships.is_empty() && self.ships.keys().all(|k| self.is_sunk(*k))
    }

    /// Most recent shot fired by `actor` on this board.
    pub fn last_shot_by(&self, actor: &Actor) -> Option<(Coordinate, &Shot)> {
        self.shots
            .iter()
            .filter(|(_, shot)| &shot.fired_by == actor)
            .max_by_key(|(_, shot)| shot.fired_at)
            .map(|(coord, shot)| (*coord, shot))
    }

    /// Active events paired with their coordinates.
    pub fn active_events(&self) -> impl Iterator<Item = (Coordinate, &ActiveEvent)> {
        self.tiles
            .iter()
            .filter_map(|(coord, tile)| tile.event().map(|e| (*coord, e)))
    }

    /// Human-readable tile details, with the displaced-tile snapshot omitted.
    pub fn tile_details(&self, coord: Coordinate) -> Result<String, GameError> {
        let tile = self
            .tile(coord)
            .ok_or_else(|| GameError::InvalidCoordinate(coord.to_string()))?;
        let mut lines = vec![
            format!("Details for {coord}:"),
            format!("Name: {}", tile.flavor.name),
            format!("Difficulty: {}", tile.flavor.difficulty),
            format!("Description: {}", tile.flavor.description),
            format!("Count: {}", tile.flavor.count),
        ];
        if let Some(ship) = tile.ship {
            lines.push(format!("Ship: {ship}"));
        }
        match &tile.overlay {
            Overlay::Event(event) => lines.push(format!("Event: {} {}", event.kind, event.emoji)),
            Overlay::Wrecked => lines.push("Wrecked: yes".to_string()),
            Overlay::Clear => {}
        }
        Ok(lines.join("\n"))
    }

    /// Checks the structural invariants: a full grid, ship lists agree with
    /// tile stamps, and a locked board carries every kind.
    pub fn is_consistent(&self) -> bool {
        let full = Coordinate::all().all(|c| self.tiles.contains_key(&c));
        let stamped = self.ships.iter().all(|(kind, coords)| {
            coords.len() == kind.length()
                && coords.iter().all(|c| self.tiles.get(c).is_some_and(|t| t.ship == Some(*kind)))
        });
        let no_strays = self
            .tiles
            .iter()
            .all(|(c, t)| t.ship.map_or(true, |k| self.ships.get(&k).is_some_and(|cs| cs.contains(c))));
        let fleet = !self.locked || self.missing_ships(&ShipKind::ALL).is_empty();
        full && stamped && no_strays && fleet
    }
}
