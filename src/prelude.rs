//! Commonly used types and utilities for ease of import.

pub use crate::{
    Board, BoardStore, Catalogs, Coordinate, EventKind, EventOutcome, FileStore, GameError, MatchConfig,
    MemoryStore, Orientation, Pairings, Referee, ShipKind, SideId,
};

pub use crate::notify::{Announcer, ChannelNotifier, LogNotifier, Notifier};
