mod common;

use std::collections::BTreeMap;

use broadside::{move_history, summarize, Actor, Board, BoardStatus, EventKind, EventOutcome, ShipKind, SideId};
use chrono::TimeDelta;
use common::{coord, events, fleet_board, pairings, start};
use rand::{rngs::SmallRng, SeedableRng};

fn east() -> SideId {
    SideId::new("east")
}

fn west() -> SideId {
    SideId::new("west")
}

fn played_boards() -> BTreeMap<SideId, Board> {
    let mut west_board = fleet_board(1);
    let mut east_board = fleet_board(2);
    let by_east = Actor::Side(east());
    let by_west = Actor::Side(west());
    let mut now = start();
    // east: 3 hits (destroyer sunk) and 1 miss
    for target in ["E1", "E2", "A1", "J10"] {
        west_board.receive_fire(coord(target), by_east.clone(), now).unwrap();
        now += TimeDelta::minutes(10);
    }
    // west: 1 hit and 1 miss
    for target in ["B1", "H5"] {
        east_board.receive_fire(coord(target), by_west.clone(), now).unwrap();
        now += TimeDelta::minutes(10);
    }
    BTreeMap::from([(west(), west_board), (east(), east_board)])
}

#[test]
fn test_summary_counts() {
    let boards = played_boards();
    let summary = summarize(&boards, &pairings());
    let e = summary.side(&east()).unwrap();
    assert_eq!(e.display, "East Fleet");
    assert_eq!(e.opponent, Some(west()));
    assert_eq!((e.shots_made, e.hits_made), (4, 3));
    assert!((e.accuracy - 75.0).abs() < 1e-9);
    assert_eq!((e.shots_received, e.hits_received), (2, 1));
    assert!(e.ships_sunk.is_empty());

    let w = summary.side(&west()).unwrap();
    assert_eq!((w.shots_made, w.hits_made), (2, 1));
    assert!((w.accuracy - 50.0).abs() < 1e-9);
    assert_eq!(w.ships_sunk, vec![ShipKind::Destroyer]);
    assert!(!w.all_sunk);
}

#[test]
fn test_summary_without_shots() {
    let boards = BTreeMap::from([(west(), fleet_board(1))]);
    let summary = summarize(&boards, &pairings());
    for side in &summary.sides {
        assert_eq!(side.shots_made, 0);
        assert_eq!(side.accuracy, 0.0);
    }
    assert_eq!(summary.side(&east()).unwrap().shots_received, 0);
}

#[test]
fn test_summary_does_not_mutate() {
    let boards = played_boards();
    let copy = boards.clone();
    let _ = summarize(&boards, &pairings());
    assert_eq!(boards, copy);
}

#[test]
fn test_event_shots_are_not_side_fire() {
    let mut boards = played_boards();
    let catalog = events();
    let kraken = EventKind::from("kraken");
    let def = catalog.get(&kraken).unwrap();
    let mut rng = SmallRng::seed_from_u64(4);
    let west_board = boards.get_mut(&west()).unwrap();
    west_board.apply_event(&kraken, def, start(), &mut rng).unwrap();
    west_board.resolve_event(&kraken, def, EventOutcome::Fail, start()).unwrap();

    let summary = summarize(&boards, &pairings());
    let w = summary.side(&west()).unwrap();
    assert_eq!(w.event_damage, 1);
    assert_eq!(w.shots_received, 5);
    assert_eq!(summary.side(&east()).unwrap().shots_made, 4);
}

#[test]
fn test_board_status() {
    let boards = played_boards();
    assert_eq!(
        BoardStatus::of(&boards[&west()]),
        BoardStatus {
            total: 4,
            hits: 3,
            misses: 1
        }
    );
}

#[test]
fn test_move_history_is_chronological() {
    let boards = played_boards();
    let moves = move_history(&east(), &boards);
    let labels: Vec<String> = moves.iter().map(|m| m.coordinate.to_string()).collect();
    assert_eq!(labels, vec!["E1", "E2", "A1", "J10"]);
    assert!(moves.iter().all(|m| m.target == west()));
    assert!(moves.windows(2).all(|w| w[0].fired_at <= w[1].fired_at));
}

#[test]
fn test_rendered_reports() {
    let summary = summarize(&played_boards(), &pairings());
    let text = summary.to_string();
    assert!(text.contains("East Fleet"));
    assert!(text.contains("destroyer"));
    let progress = summary.progress_report();
    assert!(progress.contains("Accuracy: `75.0%`"));
    assert!(progress.contains("Accuracy: `50.0%`"));
}
