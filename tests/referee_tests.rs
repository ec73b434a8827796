mod common;

use broadside::{
    BoardStore, CooldownPolicy, EventResolution, FileStore, Format, GameError, ManualClock, Referee, SideId,
};
use chrono::TimeDelta;
use common::{catalogs, pairings, referee, start};

fn east() -> SideId {
    SideId::new("east")
}

fn west() -> SideId {
    SideId::new("west")
}

fn ready(referee: &mut Referee<broadside::MemoryStore>) {
    for side in [east(), west()] {
        referee.place_remaining(&side).unwrap();
        referee.lock(&side).unwrap();
    }
}

#[test]
fn test_board_is_generated_once() {
    let clock = ManualClock::new(start());
    let mut referee = referee(&clock);
    assert!(referee.store().get(&east()).unwrap().is_none());
    let first = referee.board(&east()).unwrap();
    let second = referee.board(&east()).unwrap();
    assert_eq!(first, second);
    assert!(matches!(
        referee.board(&SideId::new("north")),
        Err(GameError::NoOpponent(_))
    ));
}

#[test]
fn test_placement_commands_persist() {
    let clock = ManualClock::new(start());
    let mut referee = referee(&clock);
    referee.place_ship(&east(), "carrier", "h", "A1").unwrap();
    let preview = referee.setup_preview(&east()).unwrap();
    assert!(preview.contains("Remaining ships to place"));
    assert!(!preview.contains("carrier,"));
    referee.remove_ship(&east(), "carrier").unwrap();
    assert!(referee.store().get(&east()).unwrap().unwrap().ships().is_empty());
    assert!(matches!(referee.lock(&east()), Err(GameError::IncompleteFleet(_))));
}

#[test]
fn test_readiness() {
    let clock = ManualClock::new(start());
    let mut referee = referee(&clock);
    assert_eq!(referee.unlocked_sides().unwrap(), vec![east(), west()]);
    ready(&mut referee);
    assert!(referee.unlocked_sides().unwrap().is_empty());
    referee.unlock(&west()).unwrap();
    assert_eq!(referee.unlocked_sides().unwrap(), vec![west()]);
}

#[test]
fn test_cooldown_follows_clock() {
    let clock = ManualClock::new(start());
    let mut referee = referee(&clock);
    ready(&mut referee);
    referee.fire(&east(), "A1").unwrap();
    clock.advance(TimeDelta::minutes(9));
    assert!(matches!(referee.fire(&east(), "A2"), Err(GameError::OnCooldown { .. })));
    clock.advance(TimeDelta::minutes(1));
    referee.fire(&east(), "A2").unwrap();
}

#[test]
fn test_use_skip_rules() {
    let clock = ManualClock::new(start());
    let mut referee = referee(&clock);
    ready(&mut referee);
    assert!(matches!(referee.use_skip(&east()), Err(GameError::SkipRequiresMiss)));

    let west_board = referee.store().get(&west()).unwrap().unwrap();
    let (miss, hit) = {
        let water = west_board
            .tiles()
            .find(|(_, t)| t.ship.is_none())
            .map(|(c, _)| *c)
            .unwrap();
        let ship = west_board
            .tiles()
            .find(|(_, t)| t.ship.is_some())
            .map(|(c, _)| *c)
            .unwrap();
        (water, ship)
    };

    referee.fire(&east(), &miss.to_string()).unwrap();
    assert!(matches!(referee.use_skip(&east()), Err(GameError::NoSkipTokens(_))));

    // earn a token by clearing a reward event on east's own board
    referee.start_event_for(&east(), "treasure").unwrap();
    let resolution = referee.resolve_event(&east(), "treasure", "complete").unwrap();
    assert!(matches!(resolution, EventResolution::Rewarded(_)));
    assert_eq!(referee.skip_balance(&east()), 1);

    assert_eq!(referee.use_skip(&east()).unwrap(), 1);
    clock.advance(TimeDelta::minutes(1));
    let report = referee.fire(&east(), &hit.to_string()).unwrap();
    assert!(report.skip_consumed);
    assert_eq!(referee.skip_balance(&east()), 0);
    // last shot was a hit now
    assert!(matches!(referee.use_skip(&east()), Err(GameError::SkipRequiresMiss)));
}

#[test]
fn test_start_event_everywhere() {
    let clock = ManualClock::new(start());
    let mut referee = referee(&clock);
    referee.board(&east()).unwrap();
    referee.board(&west()).unwrap();
    referee.place_remaining(&west()).unwrap();

    // east has no ships, so a threat event cannot land there
    let results = referee.start_event("kraken").unwrap();
    assert!(matches!(results[&east()], Err(GameError::NoEligibleTile(_))));
    assert!(results[&west()].is_ok());
    assert!(matches!(referee.start_event("tsunami"), Err(GameError::UnknownEvent(_))));

    assert!(referee.overdue_events().unwrap().is_empty());
    clock.advance(TimeDelta::hours(12));
    let overdue = referee.overdue_events().unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].side, west());

    assert!(matches!(
        referee.resolve_event(&west(), "kraken", "later"),
        Err(GameError::InvalidOutcome(_))
    ));
    let resolution = referee.resolve_event(&west(), "kraken", "fail").unwrap();
    assert!(matches!(resolution, EventResolution::Wrecked(_)));
    assert_eq!(referee.board_status(&west()).unwrap().hits, 1);
}

#[test]
fn test_reports() {
    let clock = ManualClock::new(start());
    let mut referee = referee(&clock);
    ready(&mut referee);
    assert_eq!(referee.current_task(&east()).unwrap(), None);
    referee.fire(&east(), "A1").unwrap();
    clock.advance(TimeDelta::minutes(10));
    referee.fire(&east(), "B2").unwrap();
    referee.fire(&west(), "C3").unwrap();

    let task = referee.current_task(&east()).unwrap().unwrap();
    assert!(task.starts_with("Details for B2:"));
    let history = referee.move_history(&east()).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].coordinate.to_string(), "B2");

    let summary = referee.summary().unwrap();
    assert_eq!(summary.side(&east()).unwrap().shots_made, 2);
    assert_eq!(referee.board_status(&west()).unwrap().total, 2);
    assert!(referee.enemy_view(&east()).unwrap().starts_with("```"));
    assert!(referee.own_view(&east()).unwrap().contains("🟪"));
}

#[test]
fn test_limiter_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(start());
    let build = |clock: &ManualClock| {
        Referee::new(
            FileStore::new(dir.path(), Format::Json),
            pairings(),
            CooldownPolicy::default(),
            catalogs(),
        )
        .unwrap()
        .with_clock(clock.clone())
        .with_seed(3)
    };

    let mut first = build(&clock);
    for side in [east(), west()] {
        first.place_remaining(&side).unwrap();
        first.lock(&side).unwrap();
    }
    first.fire(&east(), "A1").unwrap();
    drop(first);

    let mut second = build(&clock);
    clock.advance(TimeDelta::minutes(5));
    assert!(matches!(second.fire(&east(), "A2"), Err(GameError::OnCooldown { .. })));
    assert!(matches!(second.fire(&east(), "A1"), Err(GameError::OnCooldown { .. })));
    clock.advance(TimeDelta::minutes(5));
    assert!(matches!(second.fire(&east(), "A1"), Err(GameError::AlreadyTargeted(_))));
}
