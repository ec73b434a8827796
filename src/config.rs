use std::{env, fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{common::LoadError, ship::ShipKind, side::SideId};

pub const BOARD_SIZE: u8 = 10;
pub const ROW_LABELS: [char; BOARD_SIZE as usize] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J'];
pub const NUM_SHIPS: usize = 5;
pub const REQUIRED_SHIPS: [ShipKind; NUM_SHIPS] = ShipKind::ALL;

/// Number of flavor tiles a catalog needs to fill one board.
pub const MIN_CATALOG_TILES: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;

/// Default minutes a side has to wait between shots.
pub const COOLDOWN_MINUTES: u64 = 10;

/// Total number of ship segments used in the standard configuration.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// One participating side as declared in the match file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideConfig {
    pub id: SideId,
    pub display: String,
    pub opponent: SideId,
}

/// Runtime match configuration, usually read from `match.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub sides: Vec<SideConfig>,
    #[serde(default = "default_cooldown")]
    pub cooldown_minutes: u64,
    #[serde(default)]
    pub bypass_cooldown: bool,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_cooldown() -> u64 {
    COOLDOWN_MINUTES
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl MatchConfig {
    /// Two sides paired against each other with the default cooldown.
    pub fn pair(a: (&str, &str), b: (&str, &str)) -> Self {
        Self {
            sides: vec![
                SideConfig {
                    id: SideId::new(a.0),
                    display: a.1.to_string(),
                    opponent: SideId::new(b.0),
                },
                SideConfig {
                    id: SideId::new(b.0),
                    display: b.1.to_string(),
                    opponent: SideId::new(a.0),
                },
            ],
            cooldown_minutes: COOLDOWN_MINUTES,
            bypass_cooldown: false,
            data_dir: default_data_dir(),
        }
    }

    /// Read the match file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: MatchConfig = serde_json::from_str(&raw).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env();
        Ok(config)
    }

    /// `BROADSIDE_BYPASS_COOLDOWN=1|true` disables the rate limiter.
    pub fn apply_env(&mut self) {
        if let Ok(value) = env::var("BROADSIDE_BYPASS_COOLDOWN") {
            self.bypass_cooldown = matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }
}
