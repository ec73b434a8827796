use std::collections::BTreeMap;

use crate::{
    board::Board,
    ratelimit::LimiterState,
    side::SideId,
    store::{BoardStore, StoreError},
};

/// Process-local store. Writes can be made to fail to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    boards: BTreeMap<SideId, Board>,
    limiter: Option<LimiterState>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl BoardStore for MemoryStore {
    fn get(&self, side: &SideId) -> Result<Option<Board>, StoreError> {
        Ok(self.boards.get(side).cloned())
    }

    fn put(&mut self, side: &SideId, board: &Board) -> Result<(), StoreError> {
        self.check_writable()?;
        self.boards.insert(side.clone(), board.clone());
        Ok(())
    }

    fn load_limiter(&self) -> Result<LimiterState, StoreError> {
        Ok(self.limiter.clone().unwrap_or_default())
    }

    fn save_limiter(&mut self, state: &LimiterState) -> Result<(), StoreError> {
        self.check_writable()?;
        self.limiter = Some(state.clone());
        Ok(())
    }
}
