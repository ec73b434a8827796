//! Common types for the engine: domain errors and loader errors.

use std::{io, path::PathBuf};

use chrono::TimeDelta;
use thiserror::Error;

use crate::{coord::Coordinate, event::EventKind, ship::ShipKind, side::SideId, store::StoreError};

/// Every failure an engine operation can report. None of them leave a board
/// partially mutated.
#[derive(Debug, Error)]
pub enum GameError {
    /// The tile catalog cannot fill a whole board.
    #[error("tile catalog has {found} tiles, need at least {required}")]
    InsufficientCatalog { found: usize, required: usize },
    #[error("board is already locked")]
    AlreadyLocked,
    #[error("board is not locked")]
    NotLocked,
    /// Lock refused; carries the kinds still missing.
    #[error("cannot lock board, missing ships: {}", join_kinds(.0))]
    IncompleteFleet(Vec<ShipKind>),
    #[error("board is locked, ships cannot be changed")]
    BoardLocked,
    #[error("unknown ship type: {0}")]
    UnknownShip(String),
    #[error("{0} is already placed")]
    AlreadyPlaced(ShipKind),
    #[error("invalid orientation {0:?}, use h or v")]
    InvalidOrientation(String),
    #[error("invalid coordinate {0:?}, use a format like A3")]
    InvalidCoordinate(String),
    #[error("{0} would go out of bounds")]
    OutOfBounds(ShipKind),
    #[error("overlaps another ship at {0}")]
    Overlap(Coordinate),
    /// A run tile that could never be hit again.
    #[error("{0} cannot hold a ship segment")]
    TileUnavailable(Coordinate),
    #[error("{0} is not placed")]
    NotPlaced(ShipKind),
    #[error("side {0} has no opponent")]
    NoOpponent(SideId),
    #[error("no board exists for side {0}")]
    NoBoard(SideId),
    #[error("cooldown active, wait {} before the next shot", format_wait(.remaining))]
    OnCooldown { remaining: TimeDelta },
    #[error("coordinate {0} has already been targeted")]
    AlreadyTargeted(Coordinate),
    #[error("coordinate {0} is wreckage and cannot be targeted")]
    AlreadyWrecked(Coordinate),
    #[error("unknown event: {0}")]
    UnknownEvent(EventKind),
    #[error("no valid target for {0} on this board")]
    NoEligibleTile(EventKind),
    #[error("no active {0} event on this board")]
    NoActiveEvent(EventKind),
    #[error("invalid event outcome {0:?}, use complete or fail")]
    InvalidOutcome(String),
    #[error("side {0} has no skip tokens remaining")]
    NoSkipTokens(SideId),
    #[error("skips are only usable right after a miss")]
    SkipRequiresMiss,
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Failures reading catalogs and config files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn join_kinds(kinds: &[ShipKind]) -> String {
    kinds
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a wait as `Xm Ys`, rounding partial seconds up.
pub fn format_wait(remaining: &TimeDelta) -> String {
    let millis = remaining.num_milliseconds().max(0);
    let secs = (millis + 999) / 1000;
    format!("{}m {}s", secs / 60, secs % 60)
}
