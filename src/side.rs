//! Side identity and the pairwise opponent map.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MatchConfig;

/// Opaque key for one competing side (a team).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SideId(String);

impl SideId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SideId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Problems found while building [`Pairings`] from a match file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairingError {
    #[error("side {0} is declared more than once")]
    Duplicate(SideId),
    #[error("side {0} is paired with itself")]
    SelfPaired(SideId),
    #[error("side {side} names undeclared opponent {opponent}")]
    UnknownOpponent { side: SideId, opponent: SideId },
    #[error("side {side} targets {opponent}, but {opponent} targets {back}")]
    Asymmetric {
        side: SideId,
        opponent: SideId,
        back: SideId,
    },
}

/// Symmetric side-to-opponent map with display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairings {
    opponents: BTreeMap<SideId, SideId>,
    display: BTreeMap<SideId, String>,
}

impl Pairings {
    pub fn from_config(config: &MatchConfig) -> Result<Self, PairingError> {
        let mut opponents = BTreeMap::new();
        let mut display = BTreeMap::new();
        for side in &config.sides {
            if side.id == side.opponent {
                return Err(PairingError::SelfPaired(side.id.clone()));
            }
            if opponents.insert(side.id.clone(), side.opponent.clone()).is_some() {
                return Err(PairingError::Duplicate(side.id.clone()));
            }
            display.insert(side.id.clone(), side.display.clone());
        }
        for (side, opponent) in &opponents {
            match opponents.get(opponent) {
                None => {
                    return Err(PairingError::UnknownOpponent {
                        side: side.clone(),
                        opponent: opponent.clone(),
                    })
                }
                Some(back) if back != side => {
                    return Err(PairingError::Asymmetric {
                        side: side.clone(),
                        opponent: opponent.clone(),
                        back: back.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(Self { opponents, display })
    }

    pub fn opponent(&self, side: &SideId) -> Option<&SideId> {
        self.opponents.get(side)
    }

    /// Display name, falling back to the raw id.
    pub fn display<'a>(&'a self, side: &'a SideId) -> &'a str {
        self.display.get(side).map(String::as_str).unwrap_or(side.as_str())
    }

    pub fn contains(&self, side: &SideId) -> bool {
        self.opponents.contains_key(side)
    }

    pub fn sides(&self) -> impl Iterator<Item = &SideId> {
        self.opponents.keys()
    }
}
