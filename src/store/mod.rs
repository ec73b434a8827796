//! Key-value persistence for boards and limiter state, keyed by side.

use std::io;

use thiserror::Error;

use crate::{board::Board, ratelimit::LimiterState, side::SideId};

pub mod file;
pub mod in_memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("json encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode encoding error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Where boards and the rate limiter live between commands.
pub trait BoardStore: Send {
    /// `Ok(None)` when the side has no board yet.
    fn get(&self, side: &SideId) -> Result<Option<Board>, StoreError>;
    fn put(&mut self, side: &SideId, board: &Board) -> Result<(), StoreError>;
    /// Returns empty state when nothing has been saved.
    fn load_limiter(&self) -> Result<LimiterState, StoreError>;
    fn save_limiter(&mut self, state: &LimiterState) -> Result<(), StoreError>;
}
