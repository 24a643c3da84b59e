//! Change-detection polling of the board snapshot.
//!
//! A poll loop fetches the board, sleeps a fixed delay after each fetch
//! completes, and hands a snapshot to the caller only when its `lastUpdatedAt`
//! marker differs from the last one delivered. Failed fetches are logged and
//! retried on the next tick without advancing the marker.

use std::sync::Arc;
use std::time::Duration;

use bingo_proto::BoardSnapshot;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::BoardSource;

pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 3.0;
pub const MIN_POLL_INTERVAL_SECS: f64 = 1.0;

/// Picks the first finite, positive value among the explicit argument and the
/// stored preference, falling back to the default, then clamps to the minimum.
pub fn resolve_poll_interval(explicit: Option<f64>, preference: Option<&str>) -> Duration {
    let usable = |value: f64| value.is_finite() && value > 0.0;
    let seconds = explicit
        .filter(|value| usable(*value))
        .or_else(|| {
            preference
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|value| usable(*value))
        })
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
    Duration::from_secs_f64(seconds.max(MIN_POLL_INTERVAL_SECS))
}

/// Tracks the last delivered version marker. The empty string means nothing
/// has been delivered yet and never matches a real marker.
#[derive(Debug, Default, Clone)]
pub struct MarkerGate {
    last_seen: String,
}

impl MarkerGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true, and records the marker, when `snapshot` should be delivered.
    pub fn admit(&mut self, snapshot: &BoardSnapshot) -> bool {
        match snapshot.marker() {
            Some(marker) if marker != self.last_seen => {
                self.last_seen = marker.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn last_seen(&self) -> Option<&str> {
        (!self.last_seen.is_empty()).then_some(self.last_seen.as_str())
    }
}

/// Cancel handle for a running poll loop.
///
/// Clones share the same loop. Cancelling stops further ticks; a fetch already
/// in flight finishes but its result is dropped. Dropping every clone also
/// stops the loop.
#[derive(Debug, Clone)]
pub struct PollHandle {
    game_id: Arc<str>,
    cancel: Arc<watch::Sender<bool>>,
}

impl PollHandle {
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn cancel(&self) {
        if !self.cancel.send_replace(true) {
            debug!(target: "bingo::poll", game_id = %self.game_id, "poll loop cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

/// Spawns a poll loop on the current tokio runtime. The first fetch happens
/// immediately.
pub fn start_polling<F>(
    source: Arc<dyn BoardSource>,
    game_id: impl Into<String>,
    interval: Duration,
    mut on_update: F,
) -> PollHandle
where
    F: FnMut(BoardSnapshot) + Send + 'static,
{
    let game_id: Arc<str> = Arc::from(game_id.into());
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    let handle = PollHandle {
        game_id: game_id.clone(),
        cancel: Arc::new(cancel_tx),
    };

    tokio::spawn(async move {
        let mut gate = MarkerGate::new();
        debug!(
            target: "bingo::poll",
            game_id = %game_id,
            interval_ms = interval.as_millis() as u64,
            "poll loop started"
        );
        loop {
            let fetched = source.fetch_board(&game_id).await;
            if stopped(&cancel_rx) {
                break;
            }
            match fetched {
                Ok(snapshot) => {
                    if deliver(&mut gate, snapshot, &cancel_rx, &mut on_update) {
                        debug!(
                            target: "bingo::poll",
                            game_id = %game_id,
                            marker = gate.last_seen().unwrap_or_default(),
                            "board changed"
                        );
                    }
                }
                Err(err) => {
                    warn!(target: "bingo::poll", game_id = %game_id, error = %err, "poll error");
                }
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancelled(&mut cancel_rx) => break,
            }
        }
        debug!(target: "bingo::poll", game_id = %game_id, "poll loop stopped");
    });

    handle
}

/// Hands a snapshot with a new marker to the callback unless the loop has
/// been cancelled by then. A cancel can land after the post-fetch check on a
/// multi-threaded runtime, so it is checked again here.
fn deliver<F>(
    gate: &mut MarkerGate,
    snapshot: BoardSnapshot,
    cancel_rx: &watch::Receiver<bool>,
    on_update: &mut F,
) -> bool
where
    F: FnMut(BoardSnapshot),
{
    if !gate.admit(&snapshot) || stopped(cancel_rx) {
        return false;
    }
    on_update(snapshot);
    true
}

fn stopped(cancel_rx: &watch::Receiver<bool>) -> bool {
    *cancel_rx.borrow() || cancel_rx.has_changed().is_err()
}

/// Resolves once cancel is requested or every handle is gone.
async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        let requested = *cancel_rx.borrow_and_update();
        if requested || cancel_rx.changed().await.is_err() {
            return;
        }
    }
}

/// Owns at most one poll loop for a single view.
///
/// Starting again for the game already being polled returns the existing
/// handle; starting for a different game cancels the previous loop first.
pub struct BoardPoller {
    source: Arc<dyn BoardSource>,
    active: Mutex<Option<PollHandle>>,
}

impl BoardPoller {
    pub fn new(source: Arc<dyn BoardSource>) -> Self {
        Self {
            source,
            active: Mutex::new(None),
        }
    }

    pub fn start<F>(&self, game_id: &str, interval: Duration, on_update: F) -> PollHandle
    where
        F: FnMut(BoardSnapshot) + Send + 'static,
    {
        let mut active = self.active.lock();
        if let Some(existing) = active.as_ref() {
            if existing.game_id() == game_id && !existing.is_cancelled() {
                return existing.clone();
            }
            existing.cancel();
        }
        let handle = start_polling(self.source.clone(), game_id, interval, on_update);
        *active = Some(handle.clone());
        handle
    }

    pub fn active(&self) -> Option<PollHandle> {
        self.active
            .lock()
            .as_ref()
            .filter(|handle| !handle.is_cancelled())
            .cloned()
    }

    pub fn stop(&self) {
        if let Some(handle) = self.active.lock().take() {
            handle.cancel();
        }
    }
}

impl Drop for BoardPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
