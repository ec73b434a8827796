//! The match service: routes each command to the engine, persists the
//! result, logs it, and queues announcements.

use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    board::Board,
    clock::{Clock, SystemClock},
    combat::{self, Actor, FireOutcome, FireReport},
    common::{GameError, LoadError},
    config::REQUIRED_SHIPS,
    coord::Coordinate,
    event::{self, EventCatalog, EventKind, EventOutcome, EventResolution},
    notify::{Announcement, Announcer},
    ratelimit::{CooldownPolicy, RateLimiter},
    render,
    ship::ShipCatalog,
    side::{Pairings, SideId},
    store::BoardStore,
    summary::{self, BoardStatus, MatchSummary, MoveRecord},
    tile::TileCatalog,
};

/// The data files a match is played from.
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub tiles: TileCatalog,
    pub ships: ShipCatalog,
    pub events: EventCatalog,
}

impl Catalogs {
    /// Load `base_tiles.json`, `random_events.json` and, if present,
    /// `ship_tiles.json` from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let ships_path = dir.join("ship_tiles.json");
        let ships = if ships_path.exists() {
            ShipCatalog::load(ships_path)?
        } else {
            ShipCatalog::plain()
        };
        Ok(Self {
            tiles: TileCatalog::load(dir.join("base_tiles.json"))?,
            ships,
            events: EventCatalog::load(dir.join("random_events.json"))?,
        })
    }
}

/// An active event as seen across all boards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueEvent {
    pub side: SideId,
    pub coordinate: Coordinate,
    pub kind: EventKind,
    pub expires_at: DateTime<Utc>,
}

pub struct Referee<S: BoardStore> {
    store: S,
    pairings: Pairings,
    limiter: RateLimiter,
    catalogs: Catalogs,
    clock: Box<dyn Clock>,
    rng: SmallRng,
    announcer: Announcer,
}

impl<S: BoardStore> Referee<S> {
    /// Build a referee, picking up limiter state already in `store`.
    pub fn new(store: S, pairings: Pairings, policy: CooldownPolicy, catalogs: Catalogs) -> Result<Self, GameError> {
        let state = store.load_limiter()?;
        let mut seed_rng = rand::rng();
        Ok(Self {
            store,
            pairings,
            limiter: RateLimiter::with_state(policy, state),
            catalogs,
            clock: Box::new(SystemClock),
            rng: SmallRng::from_rng(&mut seed_rng),
            announcer: Announcer::silent(),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn with_announcer(mut self, announcer: Announcer) -> Self {
        self.announcer = announcer;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pairings(&self) -> &Pairings {
        &self.pairings
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn announcer(&self) -> &Announcer {
        &self.announcer
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn opponent(&self, side: &SideId) -> Result<SideId, GameError> {
        self.pairings
            .opponent(side)
            .cloned()
            .ok_or_else(|| GameError::NoOpponent(side.clone()))
    }

    fn existing_board(&self, side: &SideId) -> Result<Board, GameError> {
        self.store
            .get(side)?
            .ok_or_else(|| GameError::NoBoard(side.clone()))
    }

    /// The side's board, dealt and saved on first access.
    pub fn board(&mut self, side: &SideId) -> Result<Board, GameError> {
        if !self.pairings.contains(side) {
            return Err(GameError::NoOpponent(side.clone()));
        }
        if let Some(board) = self.store.get(side)? {
            return Ok(board);
        }
        let board = Board::generate(&self.catalogs.tiles, &mut self.rng)?;
        self.store.put(side, &board)?;
        info!("generated board for {side}");
        Ok(board)
    }

    pub fn place_ship(
        &mut self,
        side: &SideId,
        kind: &str,
        orientation: &str,
        start: &str,
    ) -> Result<Vec<Coordinate>, GameError> {
        let mut board = self.board(side)?;
        let run = board.place_ship(kind, orientation, start, &self.catalogs.ships)?;
        self.store.put(side, &board)?;
        info!("{side} placed {kind} at {start} ({orientation})");
        Ok(run)
    }

    /// Place every missing ship at random.
    pub fn place_remaining(&mut self, side: &SideId) -> Result<(), GameError> {
        let mut board = self.board(side)?;
        if board.is_locked() {
            return Err(GameError::BoardLocked);
        }
        board.place_remaining(&mut self.rng, &REQUIRED_SHIPS, &self.catalogs.ships)?;
        self.store.put(side, &board)?;
        info!("{side} placed remaining ships at random");
        Ok(())
    }

    pub fn remove_ship(&mut self, side: &SideId, kind: &str) -> Result<Vec<Coordinate>, GameError> {
        let mut board = self.board(side)?;
        let freed = board.remove_ship(kind)?;
        self.store.put(side, &board)?;
        info!("{side} removed {kind}");
        Ok(freed)
    }

    pub fn lock(&mut self, side: &SideId) -> Result<(), GameError> {
        let mut board = self.board(side)?;
        board.lock(&REQUIRED_SHIPS)?;
        self.store.put(side, &board)?;
        info!("{side} locked their board");
        self.announcer.announce(Announcement::BoardLocked { side: side.clone() });
        Ok(())
    }

    pub fn unlock(&mut self, side: &SideId) -> Result<(), GameError> {
        let mut board = self.board(side)?;
        board.unlock()?;
        self.store.put(side, &board)?;
        info!("{side} unlocked their board");
        Ok(())
    }

    pub fn fire(&mut self, side: &SideId, target: &str) -> Result<FireReport, GameError> {
        let now = self.clock.now();
        let report = combat::fire(&mut self.store, &self.pairings, &mut self.limiter, side, target, now)
            .inspect_err(|e| debug!("{side} fire at {target} rejected: {e}"))?;

        let (hit, sunk, all_sunk) = match &report.outcome {
            FireOutcome::Hit {
                ship, sunk, all_sunk, ..
            } => (true, sunk.then_some(*ship), *all_sunk),
            FireOutcome::Miss { .. } => (false, None, false),
        };
        info!(
            "{side} fired at {} {}: {}{}",
            report.defender,
            report.coordinate,
            if hit { "hit" } else { "miss" },
            if report.skip_consumed { " (skip spent)" } else { "" }
        );
        if let Some(kind) = &report.superseded {
            info!("{kind} event on {} {} cleared by direct fire", report.defender, report.coordinate);
        }
        self.announcer.announce(Announcement::ShotFired {
            attacker: side.clone(),
            defender: report.defender.clone(),
            coordinate: report.coordinate,
            hit,
            sunk,
        });
        if all_sunk {
            info!("every ship of {} is sunk", report.defender);
            self.announcer.announce(Announcement::FleetDestroyed {
                side: report.defender.clone(),
            });
        }
        Ok(report)
    }

    /// Start `kind` on one side's board.
    pub fn start_event_for(&mut self, side: &SideId, kind: &str) -> Result<Coordinate, GameError> {
        let kind = EventKind::from(kind);
        let now = self.clock.now();
        let coord = event::start_event(&mut self.store, side, &kind, &self.catalogs.events, now, &mut self.rng)?;
        info!("{kind} event started on {side} at {coord}");
        self.announcer.announce(Announcement::EventStarted {
            side: side.clone(),
            kind,
            coordinate: coord,
        });
        Ok(coord)
    }

    /// Start `kind` on every side's board. An unknown kind fails outright;
    /// per-side failures such as `NoEligibleTile` are collected.
    pub fn start_event(&mut self, kind: &str) -> Result<BTreeMap<SideId, Result<Coordinate, GameError>>, GameError> {
        self.catalogs.events.get(&EventKind::from(kind))?;
        let sides: Vec<SideId> = self.pairings.sides().cloned().collect();
        let mut results = BTreeMap::new();
        for side in sides {
            let result = self.start_event_for(&side, kind);
            if let Err(e) = &result {
                warn!("{kind} event could not start on {side}: {e}");
            }
            results.insert(side, result);
        }
        Ok(results)
    }

    pub fn resolve_event(&mut self, side: &SideId, kind: &str, outcome: &str) -> Result<EventResolution, GameError> {
        let outcome: EventOutcome = outcome.parse()?;
        let kind = EventKind::from(kind);
        let now = self.clock.now();
        let resolution = event::resolve_event(
            &mut self.store,
            side,
            &kind,
            outcome,
            &self.catalogs.events,
            &mut self.limiter,
            now,
        )?;
        info!("{kind} event on {side} resolved: {outcome}");
        if let EventResolution::Rewarded(_) = resolution {
            info!("{side} earned a skip token, balance {}", self.limiter.skips().balance(side));
        }
        self.announcer.announce(Announcement::EventResolved {
            side: side.clone(),
            kind,
            resolution,
        });
        Ok(resolution)
    }

    /// Arm a skip for the side's next shot. Only allowed right after a miss
    /// and with a token in hand. Returns the balance the skip will draw on.
    pub fn use_skip(&mut self, side: &SideId) -> Result<u32, GameError> {
        let opponent = self.opponent(side)?;
        let last_was_miss = self
            .store
            .get(&opponent)?
            .and_then(|board| board.last_shot_by(&Actor::Side(side.clone())).map(|(_, s)| !s.hit))
            .unwrap_or(false);
        if !last_was_miss {
            return Err(GameError::SkipRequiresMiss);
        }
        self.limiter.skips_mut().arm(side)?;
        self.store.save_limiter(self.limiter.state())?;
        let balance = self.limiter.skips().balance(side);
        info!("{side} armed a skip, {balance} token(s) held");
        Ok(balance)
    }

    pub fn skip_balance(&self, side: &SideId) -> u32 {
        self.limiter.skips().balance(side)
    }

    /// Every stored board, keyed by side. Sides without a board are left out.
    pub fn boards(&self) -> Result<BTreeMap<SideId, Board>, GameError> {
        let mut boards = BTreeMap::new();
        for side in self.pairings.sides() {
            if let Some(board) = self.store.get(side)? {
                boards.insert(side.clone(), board);
            }
        }
        Ok(boards)
    }

    pub fn summary(&self) -> Result<MatchSummary, GameError> {
        let summary = summary::summarize(&self.boards()?, &self.pairings);
        self.announcer.announce(Announcement::Summary(summary.to_string()));
        Ok(summary)
    }

    pub fn board_status(&self, side: &SideId) -> Result<BoardStatus, GameError> {
        Ok(BoardStatus::of(&self.existing_board(side)?))
    }

    /// Details of the tile the side most recently fired on, or `None`
    /// before its first shot.
    pub fn current_task(&self, side: &SideId) -> Result<Option<String>, GameError> {
        let opponent = self.opponent(side)?;
        let board = self.existing_board(&opponent)?;
        match board.last_shot_by(&Actor::Side(side.clone())) {
            Some((coord, _)) => board.tile_details(coord).map(Some),
            None => Ok(None),
        }
    }

    pub fn move_history(&self, side: &SideId) -> Result<Vec<MoveRecord>, GameError> {
        Ok(summary::move_history(side, &self.boards()?))
    }

    /// Sides not yet ready for battle: no board, or an unlocked one.
    pub fn unlocked_sides(&self) -> Result<Vec<SideId>, GameError> {
        let mut unlocked = Vec::new();
        for side in self.pairings.sides() {
            match self.store.get(side)? {
                Some(board) if board.is_locked() => {}
                _ => unlocked.push(side.clone()),
            }
        }
        Ok(unlocked)
    }

    pub fn overdue_events(&self) -> Result<Vec<OverdueEvent>, GameError> {
        let now = self.clock.now();
        Ok(self
            .boards()?
            .iter()
            .flat_map(|(side, board)| {
                board
                    .overdue_events(now)
                    .into_iter()
                    .map(|(coordinate, event)| OverdueEvent {
                        side: side.clone(),
                        coordinate,
                        kind: event.kind.clone(),
                        expires_at: event.expires_at,
                    })
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    pub fn setup_preview(&mut self, side: &SideId) -> Result<String, GameError> {
        Ok(render::setup_preview(&self.board(side)?, &REQUIRED_SHIPS))
    }

    /// The opponent's board as this side sees it.
    pub fn enemy_view(&self, side: &SideId) -> Result<String, GameError> {
        let opponent = self.opponent(side)?;
        Ok(render::attacker_view(&self.existing_board(&opponent)?))
    }

    /// This side's own board with ships revealed.
    pub fn own_view(&self, side: &SideId) -> Result<String, GameError> {
        Ok(render::defender_view(&self.existing_board(side)?))
    }
}
