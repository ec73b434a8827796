//! Outbound announcements. Delivery is fire-and-forget: the engine never
//! waits on a notifier and a failed delivery is only logged.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use crate::{
    coord::Coordinate,
    event::{EventKind, EventResolution},
    ship::ShipKind,
    side::SideId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Announcement {
    ShotFired {
        attacker: SideId,
        defender: SideId,
        coordinate: Coordinate,
        hit: bool,
        sunk: Option<ShipKind>,
    },
    FleetDestroyed {
        side: SideId,
    },
    BoardLocked {
        side: SideId,
    },
    EventStarted {
        side: SideId,
        kind: EventKind,
        coordinate: Coordinate,
    },
    EventResolved {
        side: SideId,
        kind: EventKind,
        resolution: EventResolution,
    },
    Summary(String),
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Announcement::ShotFired {
                attacker,
                defender,
                coordinate,
                hit,
                sunk,
            } => {
                let verdict = if *hit { "HIT" } else { "MISS" };
                write!(f, "{attacker} fired at {defender} {coordinate}: {verdict}")?;
                if let Some(kind) = sunk {
                    write!(f, ", {kind} sunk")?;
                }
                Ok(())
            }
            Announcement::FleetDestroyed { side } => write!(f, "every ship of {side} has been sunk"),
            Announcement::BoardLocked { side } => write!(f, "{side} locked their board"),
            Announcement::EventStarted {
                side,
                kind,
                coordinate,
            } => write!(f, "{kind} struck {side} at {coordinate}"),
            Announcement::EventResolved {
                side,
                kind,
                resolution,
            } => {
                let how = match resolution {
                    EventResolution::Restored(_) => "completed",
                    EventResolution::Rewarded(_) => "completed for a skip token",
                    EventResolution::Wrecked(_) => "failed, tile wrecked",
                };
                write!(f, "{kind} on {side} at {}: {how}", resolution.coordinate())
            }
            Announcement::Summary(text) => f.write_str(text),
        }
    }
}

/// A sink for announcements, e.g. a spectator channel.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn announce(&self, announcement: Announcement) -> anyhow::Result<()>;
}

/// Writes announcements to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn announce(&self, announcement: Announcement) -> anyhow::Result<()> {
        info!("announce: {announcement}");
        Ok(())
    }
}

/// Forwards announcements into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: UnboundedSender<Announcement>,
}

impl ChannelNotifier {
    pub fn channel() -> (Self, UnboundedReceiver<Announcement>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl Notifier for ChannelNotifier {
    async fn announce(&self, announcement: Announcement) -> anyhow::Result<()> {
        self.tx
            .send(announcement)
            .map_err(|_| anyhow::anyhow!("announcement channel closed"))
    }
}

/// Spawns each announcement on the current tokio runtime.
#[derive(Clone, Default)]
pub struct Announcer {
    notifier: Option<Arc<dyn Notifier>>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl fmt::Debug for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcer")
            .field("enabled", &self.notifier.is_some())
            .finish()
    }
}

impl Announcer {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier: Some(notifier),
            pending: Arc::default(),
        }
    }

    /// Drops every announcement.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn announce(&self, announcement: Announcement) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let Ok(handle) = Handle::try_current() else {
            debug!("no async runtime, dropping announcement: {announcement}");
            return;
        };
        let task = handle.spawn(async move {
            if let Err(e) = notifier.announce(announcement).await {
                warn!("announcement failed: {e:#}");
            }
        });
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|t| !t.is_finished());
        pending.push(task);
    }

    /// Wait for announcements spawned so far. Hosts call this before exiting.
    pub async fn flush(&self) {
        let tasks: Vec<_> = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            pending.drain(..).collect()
        };
        for task in tasks {
            if let Err(e) = task.await {
                warn!("announcement task failed: {e}");
            }
        }
    }
}
