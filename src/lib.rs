mod board;
pub mod clock;
pub mod combat;
mod common;
mod config;
mod coord;
pub mod event;
mod logging;
pub mod notify;
mod placement;
pub mod prelude;
mod ratelimit;
pub mod referee;
pub mod render;
mod ship;
mod side;
pub mod store;
pub mod summary;
mod tile;

pub use board::*;
pub use clock::{Clock, ManualClock, SystemClock};
pub use combat::{fire, Actor, FireOutcome, FireReport, Shot};
pub use common::*;
pub use config::*;
pub use coord::*;
pub use event::{
    resolve_event, start_event, ActiveEvent, EventCatalog, EventDef, EventKind, EventOutcome, EventResolution, Reward,
};
pub use logging::init_logging;
pub use notify::{Announcement, Announcer, ChannelNotifier, LogNotifier, Notifier};
pub use ratelimit::*;
pub use referee::{Catalogs, OverdueEvent, Referee};
pub use ship::*;
pub use side::*;
pub use store::{file::FileStore, file::Format, in_memory::MemoryStore, BoardStore, StoreError};
pub use summary::{move_history, summarize, BoardStatus, MatchSummary, MoveRecord, SideSummary};
pub use tile::*;
