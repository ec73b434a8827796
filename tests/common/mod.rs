#![allow(dead_code)]

use std::collections::BTreeMap;

use broadside::{
    Board, Catalogs, CooldownPolicy, Coordinate, EventCatalog, EventDef, EventKind, FlavorTile, ManualClock,
    MatchConfig, MemoryStore, Orientation, Pairings, Referee, Reward, ShipCatalog, ShipKind, TileCatalog,
};
use chrono::{DateTime, TimeZone, Utc};
use rand::{rngs::SmallRng, SeedableRng};

pub fn catalog(n: usize) -> TileCatalog {
    TileCatalog::new(
        (0..n)
            .map(|i| FlavorTile::new(format!("tile {i}"), "easy", format!("task {i}"), 1 + i as u32 % 5))
            .collect(),
    )
}

pub fn events() -> EventCatalog {
    let mut defs = BTreeMap::new();
    defs.insert(
        EventKind::from("kraken"),
        EventDef {
            duration_hours: 12.0,
            emoji: "🐙".to_string(),
            details: "hold the line".to_string(),
            reward: None,
        },
    );
    defs.insert(
        EventKind::from("treasure"),
        EventDef {
            duration_hours: 24.0,
            emoji: "💰".to_string(),
            details: "recover the chest".to_string(),
            reward: Some(Reward::Skip),
        },
    );
    EventCatalog::new(defs)
}

pub fn coord(label: &str) -> Coordinate {
    Coordinate::parse(label).unwrap()
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn fresh_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    Board::generate(&catalog(100), &mut rng).unwrap()
}

/// Ships in rows A to E, each starting in column 1.
pub fn fleet_board(seed: u64) -> Board {
    let mut board = fresh_board(seed);
    for (row, kind) in ["A1", "B1", "C1", "D1", "E1"].iter().zip(ShipKind::ALL) {
        board
            .place(kind, Orientation::Horizontal, coord(row), &ShipCatalog::plain())
            .unwrap();
    }
    board
}

pub fn pairings() -> Pairings {
    Pairings::from_config(&MatchConfig::pair(("east", "East Fleet"), ("west", "West Fleet"))).unwrap()
}

pub fn catalogs() -> Catalogs {
    Catalogs {
        tiles: catalog(100),
        ships: ShipCatalog::plain(),
        events: events(),
    }
}

pub fn referee(clock: &ManualClock) -> Referee<MemoryStore> {
    Referee::new(MemoryStore::new(), pairings(), CooldownPolicy::default(), catalogs())
        .unwrap()
        .with_clock(clock.clone())
        .with_seed(7)
}
