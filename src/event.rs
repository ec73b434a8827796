//! Random events: time-boxed overlays that threaten a single tile.

use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use rand::{seq::IndexedRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    board::Board,
    combat::{Actor, Shot},
    common::{GameError, LoadError},
    coord::Coordinate,
    ratelimit::RateLimiter,
    side::SideId,
    store::BoardStore,
    tile::{Overlay, TileSnapshot},
};

/// Name of an event definition, e.g. `kraken`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKind(String);

impl EventKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reward {
    /// Completing the event credits one skip token.
    Skip,
}

/// One entry of `random_events.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    pub duration_hours: f64,
    pub emoji: String,
    pub details: String,
    #[serde(default)]
    pub reward: Option<Reward>,
}

impl EventDef {
    pub fn duration(&self) -> TimeDelta {
        let millis = (self.duration_hours.max(0.0) * 3_600_000.0).round() as i64;
        TimeDelta::try_milliseconds(millis).unwrap_or(TimeDelta::MAX)
    }

    /// When an event started at `now` runs out, capped at the latest
    /// representable instant.
    pub fn expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn grants_skip(&self) -> bool {
        self.reward == Some(Reward::Skip)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCatalog {
    events: BTreeMap<EventKind, EventDef>,
}

impl EventCatalog {
    pub fn new(events: BTreeMap<EventKind, EventDef>) -> Self {
        Self { events }
    }

    /// Load `random_events.json`: `{ "kraken": {duration_hours, emoji, details, reward?}, .. }`.
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

    pub fn get(&self, kind: &EventKind) -> Result<&EventDef, GameError> {
        self.events
            .get(kind)
            .ok_or_else(|| GameError::UnknownEvent(kind.clone()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &EventKind> {
        self.events.keys()
    }
}

/// An event sitting on a tile, waiting to be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub kind: EventKind,
    pub details: String,
    pub emoji: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Tile state when the event landed.
    pub original: TileSnapshot,
}

impl ActiveEvent {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    Complete,
    Fail,
}

impl FromStr for EventOutcome {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(EventOutcome::Complete),
            "fail" => Ok(EventOutcome::Fail),
            _ => Err(GameError::InvalidOutcome(s.to_string())),
        }
    }
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventOutcome::Complete => "complete",
            EventOutcome::Fail => "fail",
        })
    }
}

/// How an event left its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventResolution {
    /// Completed; the tile is back to its state before the event.
    Restored(Coordinate),
    /// Completed reward event; a non-damaging shot was logged.
    Rewarded(Coordinate),
    /// Failed; the tile is wreckage.
    Wrecked(Coordinate),
}

impl EventResolution {
    pub fn coordinate(&self) -> Coordinate {
        match *self {
            EventResolution::Restored(c) | EventResolution::Rewarded(c) | EventResolution::Wrecked(c) => c,
        }
    }
}

impl Board {
    /// Tiles `def` may land on. Reward events pick open water; the rest
    /// threaten ship segments. Shot, wrecked and already-threatened tiles
    /// are never eligible.
    pub fn event_candidates(&self, def: &EventDef) -> Vec<Coordinate> {
        let wants_ship = !def.grants_skip();
        self.tiles()
            .filter(|(coord, tile)| {
                tile.ship.is_some() == wants_ship
                    && matches!(tile.overlay, Overlay::Clear)
                    && self.shot(**coord).is_none()
            })
            .map(|(coord, _)| *coord)
            .collect()
    }

    /// Drop event `kind` on a uniformly chosen eligible tile.
    pub fn apply_event<R: Rng>(
        &mut self,
        kind: &EventKind,
        def: &EventDef,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Coordinate, GameError> {
        let candidates = self.event_candidates(def);
        let coord = *candidates
            .choose(rng)
            .ok_or_else(|| GameError::NoEligibleTile(kind.clone()))?;
        let tile = self
            .tile_mut(coord)
            .ok_or_else(|| GameError::NoEligibleTile(kind.clone()))?;
        tile.overlay = Overlay::Event(ActiveEvent {
            kind: kind.clone(),
            details: def.details.clone(),
            emoji: def.emoji.clone(),
            started_at: now,
            expires_at: def.expiry(now),
            original: tile.snapshot(),
        });
        Ok(coord)
    }

    /// First tile, in row-major order, carrying an active `kind` event.
    pub fn find_event(&self, kind: &EventKind) -> Option<Coordinate> {
        self.active_events()
            .find(|(_, event)| &event.kind == kind)
            .map(|(coord, _)| coord)
    }

    pub fn resolve_event(
        &mut self,
        kind: &EventKind,
        def: &EventDef,
        outcome: EventOutcome,
        now: DateTime<Utc>,
    ) -> Result<EventResolution, GameError> {
        let coord = self
            .find_event(kind)
            .ok_or_else(|| GameError::NoActiveEvent(kind.clone()))?;
        let unshot = self.shot(coord).is_none();
        let tile = self
            .tile_mut(coord)
            .ok_or_else(|| GameError::NoActiveEvent(kind.clone()))?;
        let Overlay::Event(event) = std::mem::take(&mut tile.overlay) else {
            return Err(GameError::NoActiveEvent(kind.clone()));
        };

        let (resolution, shot) = match outcome {
            EventOutcome::Complete if def.grants_skip() => (
                EventResolution::Rewarded(coord),
                Some(Shot::new(Actor::EventComplete, false, now)),
            ),
            EventOutcome::Complete => {
                tile.restore(event.original);
                (EventResolution::Restored(coord), None)
            }
            EventOutcome::Fail => {
                tile.overlay = Overlay::Wrecked;
                let hit = tile.ship.is_some();
                (EventResolution::Wrecked(coord), Some(Shot::new(Actor::Event, hit, now)))
            }
        };
        if let (Some(shot), true) = (shot, unshot) {
            self.record_shot(coord, shot);
        }
        Ok(resolution)
    }

    /// Active events whose deadline has passed.
    pub fn overdue_events(&self, now: DateTime<Utc>) -> Vec<(Coordinate, &ActiveEvent)> {
        self.active_events()
            .filter(|(_, event)| event.is_overdue(now))
            .collect()
    }
}

/// Start event `kind` on `side`'s board and persist it.
pub fn start_event<S: BoardStore + ?Sized, R: Rng>(
    store: &mut S,
    side: &SideId,
    kind: &EventKind,
    catalog: &EventCatalog,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Coordinate, GameError> {
    let def = catalog.get(kind)?;
    let mut board = store
        .get(side)?
        .ok_or_else(|| GameError::NoBoard(side.clone()))?;
    let coord = board.apply_event(kind, def, now, rng)?;
    store.put(side, &board)?;
    Ok(coord)
}

/// Resolve the active `kind` event on `side`'s board. A completed reward
/// event credits `side` one skip token once the board is saved.
pub fn resolve_event<S: BoardStore + ?Sized>(
    store: &mut S,
    side: &SideId,
    kind: &EventKind,
    outcome: EventOutcome,
    catalog: &EventCatalog,
    limiter: &mut RateLimiter,
    now: DateTime<Utc>,
) -> Result<EventResolution, GameError> {
    let def = catalog.get(kind)?;
    let mut board = store
        .get(side)?
        .ok_or_else(|| GameError::NoBoard(side.clone()))?;
    let resolution = board.resolve_event(kind, def, outcome, now)?;
    store.put(side, &board)?;
    if let EventResolution::Rewarded(_) = resolution {
        limiter.skips_mut().credit(side);
        store.save_limiter(limiter.state())?;
    }
    Ok(resolution)
}
