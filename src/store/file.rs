use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    board::Board,
    ratelimit::LimiterState,
    side::SideId,
    store::{BoardStore, StoreError},
};

/// On-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Bincode,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Bincode => "bin",
        }
    }

    fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(match self {
            Format::Json => serde_json::to_vec_pretty(value)?,
            Format::Bincode => bincode::serialize(value)?,
        })
    }

    fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, StoreError> {
        Ok(match self {
            Format::Json => serde_json::from_slice(bytes)?,
            Format::Bincode => bincode::deserialize(bytes)?,
        })
    }
}

/// One file per board (`board_<side>.<ext>`) plus `limiter.<ext>` in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    format: Format,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn board_path(&self, side: &SideId) -> PathBuf {
        self.dir
            .join(format!("board_{}.{}", side, self.format.extension()))
    }

    pub fn limiter_path(&self) -> PathBuf {
        self.dir.join(format!("limiter.{}", self.format.extension()))
    }

    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        self.format.decode(&bytes).map(Some)
    }

    // Write beside the target, then rename over it.
    fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = self.format.encode(value)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl BoardStore for FileStore {
    fn get(&self, side: &SideId) -> Result<Option<Board>, StoreError> {
        self.read(&self.board_path(side))
    }

    fn put(&mut self, side: &SideId, board: &Board) -> Result<(), StoreError> {
        self.write(&self.board_path(side), board)
    }

    fn load_limiter(&self) -> Result<LimiterState, StoreError> {
        Ok(self.read(&self.limiter_path())?.unwrap_or_default())
    }

    fn save_limiter(&mut self, state: &LimiterState) -> Result<(), StoreError> {
        self.write(&self.limiter_path(), state)
    }
}
