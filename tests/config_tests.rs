use std::fs;

use broadside::{CooldownPolicy, MatchConfig, PairingError, Pairings, SideConfig, SideId};
use chrono::TimeDelta;

fn side(id: &str, opponent: &str) -> SideConfig {
    SideConfig {
        id: SideId::new(id),
        display: format!("{id} crew"),
        opponent: SideId::new(opponent),
    }
}

fn config(sides: Vec<SideConfig>) -> MatchConfig {
    MatchConfig {
        sides,
        ..MatchConfig::pair(("a", "A"), ("b", "B"))
    }
}

#[test]
fn test_pairings_are_symmetric() {
    let pairings = Pairings::from_config(&config(vec![side("a", "b"), side("b", "a"), side("c", "d"), side("d", "c")]))
        .unwrap();
    assert_eq!(pairings.opponent(&SideId::new("c")), Some(&SideId::new("d")));
    assert_eq!(pairings.display(&SideId::new("a")), "a crew");
    assert_eq!(pairings.display(&SideId::new("zed")), "zed");
    assert!(!pairings.contains(&SideId::new("zed")));
    assert_eq!(pairings.sides().count(), 4);
}

#[test]
fn test_pairing_errors() {
    assert_eq!(
        Pairings::from_config(&config(vec![side("a", "a")])),
        Err(PairingError::SelfPaired(SideId::new("a")))
    );
    assert_eq!(
        Pairings::from_config(&config(vec![side("a", "b"), side("a", "b")])),
        Err(PairingError::Duplicate(SideId::new("a")))
    );
    assert!(matches!(
        Pairings::from_config(&config(vec![side("a", "b")])),
        Err(PairingError::UnknownOpponent { .. })
    ));
    assert!(matches!(
        Pairings::from_config(&config(vec![side("a", "b"), side("b", "c"), side("c", "b")])),
        Err(PairingError::Asymmetric { .. })
    ));
}

#[test]
fn test_load_applies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match.json");
    fs::write(
        &path,
        r#"{ "sides": [
            { "id": "east", "display": "East", "opponent": "west" },
            { "id": "west", "display": "West", "opponent": "east" }
        ] }"#,
    )
    .unwrap();
    let loaded = MatchConfig::load(&path).unwrap();
    assert_eq!(loaded.cooldown_minutes, 10);
    assert_eq!(loaded.data_dir, std::path::PathBuf::from("data"));

    let policy = CooldownPolicy::from_minutes(loaded.cooldown_minutes, false);
    assert_eq!(policy.cooldown, TimeDelta::minutes(10));
    assert!(MatchConfig::load(dir.path().join("missing.json")).is_err());
}

#[test]
fn test_env_bypass() {
    let mut config = MatchConfig::pair(("a", "A"), ("b", "B"));
    std::env::set_var("BROADSIDE_BYPASS_COOLDOWN", "true");
    config.apply_env();
    std::env::remove_var("BROADSIDE_BYPASS_COOLDOWN");
    assert!(config.bypass_cooldown);
    assert!(CooldownPolicy::from_config(&config).bypass);
}
