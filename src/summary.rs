//! Read-only match statistics over a set of boards.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    board::Board,
    combat::Actor,
    coord::Coordinate,
    ship::ShipKind,
    side::{Pairings, SideId},
};

/// Shot counts on a single board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStatus {
    pub total: usize,
    pub hits: usize,
    pub misses: usize,
}

impl BoardStatus {
    pub fn of(board: &Board) -> Self {
        let total = board.shots().len();
        let hits = board.shots().values().filter(|s| s.hit).count();
        Self {
            total,
            hits,
            misses: total - hits,
        }
    }
}

/// One side's line in the match summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    pub side: SideId,
    pub display: String,
    pub opponent: Option<SideId>,
    /// Every shot logged on this side's board, events included.
    pub shots_received: usize,
    pub hits_received: usize,
    pub ships_sunk: Vec<ShipKind>,
    pub all_sunk: bool,
    /// Shots this side fired, read from the opponent's log.
    pub shots_made: usize,
    pub hits_made: usize,
    /// Percentage of shots made that hit; 0 with no shots.
    pub accuracy: f64,
    /// Hits on this board dealt by failed events.
    pub event_damage: usize,
    /// Reward events this side completed.
    pub events_cleared: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub sides: Vec<SideSummary>,
}

impl MatchSummary {
    pub fn side(&self, side: &SideId) -> Option<&SideSummary> {
        self.sides.iter().find(|s| &s.side == side)
    }

    /// Per-side shooting report: shots, hits, misses and accuracy.
    pub fn progress_report(&self) -> String {
        let mut lines = vec!["📈 **Team Progress Report**".to_string()];
        for s in &self.sides {
            match &s.opponent {
                Some(opponent) => lines.push(format!(
                    "**{}** (shots on `{}`)\n> 🔫 Shots: `{}` | 🎯 Hits: `{}` | 💨 Misses: `{}`\n> 🎯 Accuracy: `{:.1}%`",
                    s.display,
                    opponent,
                    s.shots_made,
                    s.hits_made,
                    s.shots_made - s.hits_made,
                    s.accuracy
                )),
                None => lines.push(format!("**{}**\n> 🚫 No opponent defined.", s.display)),
            }
        }
        lines.join("\n\n")
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 **Match Summary**")?;
        for s in &self.sides {
            let sunk = if s.ships_sunk.is_empty() {
                "none".to_string()
            } else {
                s.ships_sunk
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            writeln!(f)?;
            writeln!(f, "**{}**", s.display)?;
            writeln!(
                f,
                "> Shots received: {} | Hits received: {} | Ships sunk: {}",
                s.shots_received, s.hits_received, sunk
            )?;
            writeln!(
                f,
                "> Shots made: {} | Hits made: {} | Accuracy: {:.1}%",
                s.shots_made, s.hits_made, s.accuracy
            )?;
            if s.event_damage > 0 || s.events_cleared > 0 {
                writeln!(
                    f,
                    "> Event damage: {} | Events cleared: {}",
                    s.event_damage, s.events_cleared
                )?;
            }
            if s.all_sunk {
                writeln!(f, "> ☠️ Fleet destroyed")?;
            }
        }
        Ok(())
    }
}

/// Build the summary. Sides come from `pairings`; a side without a board
/// reports zero shots received.
pub fn summarize(boards: &BTreeMap<SideId, Board>, pairings: &Pairings) -> MatchSummary {
    let sides = pairings
        .sides()
        .map(|side| {
            let own = boards.get(side);
            let opponent = pairings.opponent(side).cloned();
            let attacker = Actor::Side(side.clone());
            let (shots_made, hits_made) = opponent
                .as_ref()
                .and_then(|o| boards.get(o))
                .map(|board| {
                    board
                        .shots()
                        .values()
                        .filter(|shot| shot.fired_by == attacker)
                        .fold((0, 0), |(n, h), shot| (n + 1, h + usize::from(shot.hit)))
                })
                .unwrap_or((0, 0));
            let status = own.map(BoardStatus::of).unwrap_or_default();
            let (event_damage, events_cleared) = own
                .map(|board| {
                    board.shots().values().fold((0, 0), |(d, c), shot| match shot.fired_by {
                        Actor::Event if shot.hit => (d + 1, c),
                        Actor::EventComplete => (d, c + 1),
                        _ => (d, c),
                    })
                })
                .unwrap_or((0, 0));
            let accuracy = if shots_made == 0 {
                0.0
            } else {
                hits_made as f64 / shots_made as f64 * 100.0
            };
            SideSummary {
                side: side.clone(),
                display: pairings.display(side).to_string(),
                opponent,
                shots_received: status.total,
                hits_received: status.hits,
                ships_sunk: own.map(Board::sunk_ships).unwrap_or_default(),
                all_sunk: own.is_some_and(Board::all_sunk),
                shots_made,
                hits_made,
                accuracy,
                event_damage,
                events_cleared,
            }
        })
        .collect();
    MatchSummary { sides }
}

/// A shot `side` fired, with the board it landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub target: SideId,
    pub coordinate: Coordinate,
    pub hit: bool,
    pub fired_at: DateTime<Utc>,
}

/// All shots fired by `side` across `boards`, oldest first.
pub fn move_history(side: &SideId, boards: &BTreeMap<SideId, Board>) -> Vec<MoveRecord> {
    let attacker = Actor::Side(side.clone());
    let attacker = &attacker;
    let mut moves: Vec<MoveRecord> = boards
        .iter()
        .flat_map(move |(target, board)| {
            board
                .shots()
                .iter()
                .filter(move |(_, shot)| &shot.fired_by == attacker)
                .map(move |(coord, shot)| MoveRecord {
                    target: target.clone(),
                    coordinate: *coord,
                    hit: shot.hit,
                    fired_at: shot.fired_at,
                })
        })
        .collect();
    moves.sort_by_key(|m| m.fired_at);
    moves
}
