mod common;

use broadside::{
    fire, BoardStore, CooldownPolicy, FireOutcome, GameError, MemoryStore, Pairings, RateLimiter, ShipKind, SideId,
};
use chrono::TimeDelta;
use common::{coord, events, fleet_board, pairings, start};
use rand::{rngs::SmallRng, SeedableRng};

fn setup() -> (MemoryStore, Pairings, RateLimiter) {
    let mut store = MemoryStore::new();
    store.put(&SideId::new("west"), &fleet_board(1)).unwrap();
    store.put(&SideId::new("east"), &fleet_board(2)).unwrap();
    (store, pairings(), RateLimiter::new(CooldownPolicy::default()))
}

fn east() -> SideId {
    SideId::new("east")
}

fn west() -> SideId {
    SideId::new("west")
}

#[test]
fn test_hit_report() {
    let (mut store, pairings, mut limiter) = setup();
    let report = fire(&mut store, &pairings, &mut limiter, &east(), "a1", start()).unwrap();
    assert_eq!(report.defender, west());
    assert_eq!(report.coordinate, coord("A1"));
    match report.outcome {
        FireOutcome::Hit {
            ship, sunk, all_sunk, ..
        } => {
            assert_eq!(ship, ShipKind::Carrier);
            assert!(!sunk);
            assert!(!all_sunk);
        }
        other => panic!("expected a hit, got {other:?}"),
    }
    assert!(!report.skip_consumed);
    assert!(report.attacker_view.contains("💥"));
    assert!(!report.attacker_view.contains("🟪"));
    assert!(report.defender_view.contains("🟪"));

    let board = store.get(&west()).unwrap().unwrap();
    let shot = board.shot(coord("A1")).unwrap();
    assert!(shot.hit);
    assert_eq!(shot.fired_by, broadside::Actor::Side(east()));
    assert_eq!(shot.fired_at, start());
}

#[test]
fn test_miss_report_carries_tile_task() {
    let (mut store, pairings, mut limiter) = setup();
    let expected = store.get(&west()).unwrap().unwrap().tile(coord("J10")).unwrap().flavor.clone();
    let report = fire(&mut store, &pairings, &mut limiter, &east(), "J10", start()).unwrap();
    assert_eq!(
        report.outcome,
        FireOutcome::Miss {
            tile_name: expected.name,
            difficulty: expected.difficulty,
            description: expected.description,
            task_count: expected.count,
        }
    );
    assert!(report.attacker_view.contains("⚫"));
}

#[test]
fn test_retarget_leaves_state_unchanged() {
    let (mut store, pairings, mut limiter) = setup();
    fire(&mut store, &pairings, &mut limiter, &east(), "C2", start()).unwrap();
    let board = store.get(&west()).unwrap();
    let limiter_before = limiter.state().clone();
    let later = start() + TimeDelta::minutes(30);
    let err = fire(&mut store, &pairings, &mut limiter, &east(), "c2", later).unwrap_err();
    assert!(matches!(err, GameError::AlreadyTargeted(at) if at == coord("C2")));
    assert_eq!(store.get(&west()).unwrap(), board);
    assert_eq!(limiter.state(), &limiter_before);
}

#[test]
fn test_missing_opponent_and_board() {
    let (mut store, pairings, mut limiter) = setup();
    let err = fire(&mut store, &pairings, &mut limiter, &SideId::new("north"), "A1", start()).unwrap_err();
    assert!(matches!(err, GameError::NoOpponent(_)));

    let mut empty = MemoryStore::new();
    let err = fire(&mut empty, &pairings, &mut limiter, &east(), "A1", start()).unwrap_err();
    assert!(matches!(err, GameError::NoBoard(side) if side == west()));
}

#[test]
fn test_cooldown_window() {
    let (mut store, pairings, mut limiter) = setup();
    fire(&mut store, &pairings, &mut limiter, &east(), "A1", start()).unwrap();

    let err = fire(&mut store, &pairings, &mut limiter, &east(), "A2", start() + TimeDelta::minutes(4)).unwrap_err();
    match err {
        GameError::OnCooldown { remaining } => assert_eq!(remaining, TimeDelta::minutes(6)),
        other => panic!("expected cooldown, got {other:?}"),
    }
    // the rate check runs before the coordinate is looked at
    let err = fire(&mut store, &pairings, &mut limiter, &east(), "Z0", start() + TimeDelta::minutes(9)).unwrap_err();
    assert!(matches!(err, GameError::OnCooldown { .. }));

    // the other side has its own clock
    fire(&mut store, &pairings, &mut limiter, &west(), "A1", start() + TimeDelta::minutes(1)).unwrap();

    fire(&mut store, &pairings, &mut limiter, &east(), "A2", start() + TimeDelta::minutes(10)).unwrap();
}

#[test]
fn test_invalid_coordinate() {
    let (mut store, pairings, mut limiter) = setup();
    let err = fire(&mut store, &pairings, &mut limiter, &east(), "K11", start()).unwrap_err();
    assert!(matches!(err, GameError::InvalidCoordinate(_)));
    // a rejected shot does not start the cooldown
    fire(&mut store, &pairings, &mut limiter, &east(), "A1", start()).unwrap();
}

#[test]
fn test_bypass_disables_cooldown() {
    let (mut store, pairings, _) = setup();
    let mut limiter = RateLimiter::new(CooldownPolicy::from_minutes(10, true));
    for target in ["A1", "A2", "A3"] {
        fire(&mut store, &pairings, &mut limiter, &east(), target, start()).unwrap();
    }
}

#[test]
fn test_store_failure_surfaces() {
    let (mut store, pairings, mut limiter) = setup();
    store.set_fail_writes(true);
    let err = fire(&mut store, &pairings, &mut limiter, &east(), "A1", start()).unwrap_err();
    assert!(matches!(err, GameError::Persistence(_)));
    store.set_fail_writes(false);
    assert!(store.get(&west()).unwrap().unwrap().shots().is_empty());
    fire(&mut store, &pairings, &mut limiter, &east(), "A1", start()).unwrap();
}

#[test]
fn test_direct_fire_supersedes_event() {
    let (mut store, pairings, mut limiter) = setup();
    let mut rng = SmallRng::seed_from_u64(3);
    let catalog = events();
    let kraken = broadside::EventKind::from("kraken");
    let at = broadside::start_event(&mut store, &west(), &kraken, &catalog, start(), &mut rng).unwrap();

    let report = fire(&mut store, &pairings, &mut limiter, &east(), &at.to_string(), start()).unwrap();
    assert_eq!(report.superseded, Some(kraken.clone()));
    assert!(report.outcome.is_hit());
    let board = store.get(&west()).unwrap().unwrap();
    assert!(board.tile(at).unwrap().event().is_none());
    assert_eq!(board.find_event(&kraken), None);
}

#[test]
fn test_east_sinks_west_fleet() {
    let (mut store, pairings, mut limiter) = setup();
    let mut now = start();
    let mut shoot = |target: &str| {
        let report = fire(&mut store, &pairings, &mut limiter, &east(), target, now).unwrap();
        now += TimeDelta::minutes(10);
        report.outcome
    };

    for target in ["A1", "A2", "A3", "A4"] {
        assert!(matches!(shoot(target), FireOutcome::Hit { sunk: false, .. }));
    }
    assert!(matches!(
        shoot("A5"),
        FireOutcome::Hit {
            ship: ShipKind::Carrier,
            sunk: true,
            all_sunk: false,
            ..
        }
    ));

    let rest = ["B1", "B2", "B3", "B4", "C1", "C2", "C3", "D1", "D2", "D3", "E1"];
    for target in rest {
        assert!(matches!(shoot(target), FireOutcome::Hit { all_sunk: false, .. }));
    }
    assert!(matches!(
        shoot("E2"),
        FireOutcome::Hit {
            ship: ShipKind::Destroyer,
            sunk: true,
            all_sunk: true,
            ..
        }
    ));
}
