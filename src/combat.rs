//! Shot resolution against an opposing board.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    board::Board,
    common::GameError,
    coord::Coordinate,
    event::EventKind,
    ratelimit::RateLimiter,
    render,
    ship::ShipKind,
    side::{Pairings, SideId},
    store::BoardStore,
    tile::Overlay,
};

/// Who a shot is attributed to. Events log shots under reserved actors so
/// they never count as a side's own fire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Side(SideId),
    /// A failed event that wrecked the tile.
    Event,
    /// A completed reward event.
    EventComplete,
}

impl Actor {
    pub fn side(&self) -> Option<&SideId> {
        match self {
            Actor::Side(side) => Some(side),
            _ => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Side(side) => write!(f, "{side}"),
            Actor::Event => f.write_str("event"),
            Actor::EventComplete => f.write_str("event-complete"),
        }
    }
}

impl From<SideId> for Actor {
    fn from(side: SideId) -> Self {
        Actor::Side(side)
    }
}

/// One entry of a board's shot log. Never changed once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    pub fired_by: Actor,
    pub hit: bool,
    pub fired_at: DateTime<Utc>,
}

impl Shot {
    pub fn new(fired_by: impl Into<Actor>, hit: bool, fired_at: DateTime<Utc>) -> Self {
        Self {
            fired_by: fired_by.into(),
            hit,
            fired_at,
        }
    }
}

/// What a shot revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireOutcome {
    Hit {
        ship: ShipKind,
        sunk: bool,
        all_sunk: bool,
        /// Task the attacking side must now complete.
        task_name: String,
        task_count: u32,
    },
    Miss {
        tile_name: String,
        difficulty: String,
        description: String,
        task_count: u32,
    },
}

impl FireOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, FireOutcome::Hit { .. })
    }
}

/// Everything a host needs to answer a fire command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireReport {
    pub attacker: SideId,
    pub defender: SideId,
    pub coordinate: Coordinate,
    pub outcome: FireOutcome,
    pub skip_consumed: bool,
    /// Event cleared because the shot landed on its tile.
    pub superseded: Option<EventKind>,
    /// Opponent board with ships hidden.
    pub attacker_view: String,
    /// The same board with ships revealed.
    pub defender_view: String,
}

impl Board {
    /// Apply a shot to this board. Fails without touching the board if the
    /// tile was already shot or is wreckage. Wreckage carries the event's
    /// own shot, so it reports `AlreadyWrecked` unless a side fired there.
    pub fn receive_fire(
        &mut self,
        coord: Coordinate,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<(FireOutcome, Option<EventKind>), GameError> {
        let tile = self
            .tile(coord)
            .ok_or_else(|| GameError::InvalidCoordinate(coord.to_string()))?;
        if let Some(prior) = self.shot(coord) {
            if prior.fired_by.side().is_some() || !tile.is_wrecked() {
                return Err(GameError::AlreadyTargeted(coord));
            }
        }
        if tile.is_wrecked() {
            return Err(GameError::AlreadyWrecked(coord));
        }
        let ship = tile.ship;
        let flavor = tile.flavor.clone();

        self.record_shot(coord, Shot::new(actor, ship.is_some(), now));

        let mut superseded = None;
        if let Some(tile) = self.tile_mut(coord) {
            if let Overlay::Event(event) = std::mem::take(&mut tile.overlay) {
                superseded = Some(event.kind);
            }
        }

        let outcome = match ship {
            Some(kind) => FireOutcome::Hit {
                ship: kind,
                sunk: self.is_sunk(kind),
                all_sunk: self.all_sunk(),
                task_name: flavor.name,
                task_count: flavor.count,
            },
            None => FireOutcome::Miss {
                tile_name: flavor.name,
                difficulty: flavor.difficulty,
                description: flavor.description,
                task_count: flavor.count,
            },
        };
        Ok((outcome, superseded))
    }
}

/// Fire `attacker`'s shot at `target` on the opposing board.
///
/// Validation order: opponent exists, opponent board exists, rate limit
/// (an armed skip overrides the cooldown), coordinate parses, not already
/// targeted, not wreckage. The board is persisted before the limiter, and
/// the limiter is only advanced once the board write succeeded.
pub fn fire<S: BoardStore + ?Sized>(
    store: &mut S,
    pairings: &Pairings,
    limiter: &mut RateLimiter,
    attacker: &SideId,
    target: &str,
    now: DateTime<Utc>,
) -> Result<FireReport, GameError> {
    let defender = pairings
        .opponent(attacker)
        .cloned()
        .ok_or_else(|| GameError::NoOpponent(attacker.clone()))?;
    let mut board = store
        .get(&defender)?
        .ok_or_else(|| GameError::NoBoard(defender.clone()))?;
    let permit = limiter.check(attacker, now)?;
    let coordinate = Coordinate::parse(target)?;

    let (outcome, superseded) = board.receive_fire(coordinate, Actor::Side(attacker.clone()), now)?;
    store.put(&defender, &board)?;

    let skip_consumed = limiter.record(attacker, permit, now);
    store.save_limiter(limiter.state())?;

    Ok(FireReport {
        attacker: attacker.clone(),
        defender,
        coordinate,
        outcome,
        skip_consumed,
        superseded,
        attacker_view: render::attacker_view(&board),
        defender_view: render::defender_view(&board),
    })
}
