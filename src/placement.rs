//! Ship placement and removal on an unlocked board.

use rand::Rng;

use crate::{
    board::Board,
    common::GameError,
    coord::Coordinate,
    ship::{Orientation, ShipCatalog, ShipKind},
    tile::Overlay,
};

impl Board {
    /// Place a ship from raw command arguments.
    ///
    /// Checks run in a fixed order, each with its own failure: the board is
    /// unlocked, the kind is known, the kind is not yet placed, the start
    /// coordinate parses, the orientation parses, the run stays on the grid,
    /// no run tile carries a ship, and every run tile passes `can_hold_ship`.
    pub fn place_ship(
        &mut self,
        kind: &str,
        orientation: &str,
        start: &str,
        segments: &ShipCatalog,
    ) -> Result<Vec<Coordinate>, GameError> {
        if self.is_locked() {
            return Err(GameError::BoardLocked);
        }
        let kind: ShipKind = kind.parse()?;
        if self.ships().contains_key(&kind) {
            return Err(GameError::AlreadyPlaced(kind));
        }
        let start = Coordinate::parse(start)?;
        let orientation: Orientation = orientation.parse()?;
        self.place(kind, orientation, start, segments)
    }

    /// Place a typed ship. Every constraint is checked before any tile is
    /// written, so a failure leaves the board untouched.
    pub fn place(
        &mut self,
        kind: ShipKind,
        orientation: Orientation,
        start: Coordinate,
        segments: &ShipCatalog,
    ) -> Result<Vec<Coordinate>, GameError> {
        if self.is_locked() {
            return Err(GameError::BoardLocked);
        }
        if self.ships().contains_key(&kind) {
            return Err(GameError::AlreadyPlaced(kind));
        }
        let run = kind.run(start, orientation)?;
        for coord in &run {
            match self.tile(*coord) {
                None => return Err(GameError::OutOfBounds(kind)),
                Some(tile) if tile.ship.is_some() => return Err(GameError::Overlap(*coord)),
                Some(_) if !self.can_hold_ship(*coord) => return Err(GameError::TileUnavailable(*coord)),
                Some(_) => {}
            }
        }

        for (i, coord) in run.iter().enumerate() {
            if let Some(tile) = self.tile_mut(*coord) {
                tile.previous = Some(tile.snapshot());
                if let Some(flavor) = segments.segment(kind, i) {
                    tile.flavor = flavor.clone();
                }
                tile.ship = Some(kind);
            }
        }
        self.ships_mut().insert(kind, run.clone());
        Ok(run)
    }

    /// Ship segments only go on unshot tiles with a clear overlay.
    pub fn can_hold_ship(&self, coord: Coordinate) -> bool {
        self.shot(coord).is_none()
            && self
                .tile(coord)
                .is_some_and(|t| matches!(t.overlay, Overlay::Clear))
    }

    /// Remove a ship named by a raw command argument.
    pub fn remove_ship(&mut self, kind: &str) -> Result<Vec<Coordinate>, GameError> {
        if self.is_locked() {
            return Err(GameError::BoardLocked);
        }
        let kind: ShipKind = kind.parse()?;
        self.remove(kind)
    }

    /// Take a ship off the board, restoring each tile to what it displaced.
    pub fn remove(&mut self, kind: ShipKind) -> Result<Vec<Coordinate>, GameError> {
        if self.is_locked() {
            return Err(GameError::BoardLocked);
        }
        let coords = self
            .ships_mut()
            .remove(&kind)
            .ok_or(GameError::NotPlaced(kind))?;
        for coord in &coords {
            if let Some(tile) = self.tile_mut(*coord) {
                match tile.previous.take() {
                    Some(snapshot) => tile.restore(snapshot),
                    None => tile.ship = None,
                }
                // an event still pending here must restore the tile as it is now
                let current = tile.snapshot();
                if let Overlay::Event(event) = &mut tile.overlay {
                    event.original = current;
                }
            }
        }
        Ok(coords)
    }

    /// Returns a random non-overlapping start and orientation for `kind`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        kind: ShipKind,
    ) -> Result<(Coordinate, Orientation), GameError> {
        let size = crate::config::BOARD_SIZE as usize;
        for _ in 0..100 {
            let orient = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let max_r = if orient == Orientation::Vertical {
                size - kind.length()
            } else {
                size - 1
            };
            let max_c = if orient == Orientation::Horizontal {
                size - kind.length()
            } else {
                size - 1
            };
            let r = rng.random_range(0..=max_r);
            let c = rng.random_range(0..=max_c);
            let Some(start) = Coordinate::new(r, c) else {
                continue;
            };
            let run = kind.run(start, orient)?;
            if run
                .iter()
                .all(|coord| self.tile(*coord).is_some_and(|t| t.ship.is_none()) && self.can_hold_ship(*coord))
            {
                return Ok((start, orient));
            }
        }
        Err(GameError::OutOfBounds(kind))
    }

    /// Place every kind in `kinds` that is not yet on the board at random.
    pub fn place_remaining<R: Rng>(
        &mut self,
        rng: &mut R,
        kinds: &[ShipKind],
        segments: &ShipCatalog,
    ) -> Result<(), GameError> {
        for kind in self.missing_ships(kinds) {
            let (start, orient) = self.random_placement(rng, kind)?;
            self.place(kind, orient, start, segments)?;
        }
        Ok(())
    }
}
