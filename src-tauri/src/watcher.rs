use std::fmt;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tauri::async_runtime::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::clipboard::{ClipboardRead, ClipboardSource};
use crate::error::ClipboardError;

pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Watching,
}

/// Digest of the last clipboard image seen.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Snapshot([u8; 32]);

impl Snapshot {
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({})", hex::encode(&self.0[..8]))
    }
}

#[derive(Debug)]
pub enum TickEvent {
    /// Not watching; the clipboard was not touched.
    Idle,
    Locked,
    NoImage,
    Unchanged,
    NewImage(Vec<u8>),
    Failed(ClipboardError),
}

#[derive(Debug)]
pub struct ClipboardWatcher {
    state: WatchState,
    snapshot: Option<Snapshot>,
}

impl Default for ClipboardWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardWatcher {
    pub fn new() -> Self {
        Self {
            state: WatchState::Idle,
            snapshot: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn is_watching(&self) -> bool {
        self.state == WatchState::Watching
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot
    }

    /// Returns true if the state changed.
    pub fn set_watching(&mut self, watching: bool) -> bool {
        let next = if watching { WatchState::Watching } else { WatchState::Idle };
        if self.state == next {
            return false;
        }
        log::info!("Clipboard watcher {:?} -> {:?}", self.state, next);
        self.state = next;
        true
    }

    /// One timer tick. The snapshot only moves when a different image shows up.
    pub fn poll(&mut self, source: &mut dyn ClipboardSource) -> TickEvent {
        if self.state == WatchState::Idle {
            return TickEvent::Idle;
        }

        match source.read_dib() {
            Ok(ClipboardRead::Locked) => {
                log::debug!("Clipboard busy, skipping tick");
                TickEvent::Locked
            }
            Ok(ClipboardRead::NoImage) => TickEvent::NoImage,
            Ok(ClipboardRead::Image(data)) => {
                let snapshot = Snapshot::of(&data);
                if self.snapshot == Some(snapshot) {
                    log::debug!("Same image detected ({:?}), skipping", snapshot);
                    return TickEvent::Unchanged;
                }
                log::info!("New clipboard image detected ({:?}, {} bytes)", snapshot, data.len());
                self.snapshot = Some(snapshot);
                TickEvent::NewImage(data)
            }
            Err(e) => {
                log::warn!("Clipboard read failed: {}", e);
                TickEvent::Failed(e)
            }
        }
    }
}

/// Repeating task on the async runtime. Ticks run one after another on a
/// single task, never concurrently.
#[derive(Default)]
pub struct PollTimer {
    task: Option<JoinHandle<()>>,
}

impl PollTimer {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Starts ticking one `period` from now. No-op if already running.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.task.is_some() {
            return;
        }

        self.task = Some(tauri::async_runtime::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                on_tick();
            }
        }));
        log::debug!("Poll timer started ({:?})", period);
    }

    /// Starts when `running` is true, stops otherwise.
    pub fn follow<F>(&mut self, running: bool, period: Duration, on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        if running {
            self.start(period, on_tick);
        } else {
            self.stop();
        }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("Poll timer stopped");
        }
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
