//! Cancellable round timer
//!
//! Every scheduled expiry carries a [`TimerToken`]. The controller only
//! honours a timeout whose token matches the one it is currently waiting
//! for, so a cancel that loses the race against an already-queued expiry
//! is still harmless.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::session::{GameInput, SessionMessage};

/// Identity of one scheduled round expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

impl std::fmt::Display for TimerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Something that can deliver `token` back to the controller after a delay
pub trait RoundTimer {
    /// Arrange for `on_round_timeout(token)` after `after`
    fn schedule(&mut self, token: TimerToken, after: Duration);

    /// Best-effort cancellation; a late delivery is filtered by token
    fn cancel(&mut self, token: TimerToken);
}

// =============================================================================
// MANUAL TIMER - tests and deterministic replays
// =============================================================================

/// Records schedules and cancellations; fires nothing by itself
#[derive(Debug, Default, Clone)]
pub struct ManualTimer {
    scheduled: Vec<(TimerToken, Duration)>,
    cancelled: Vec<TimerToken>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every schedule call, oldest first
    pub fn scheduled(&self) -> &[(TimerToken, Duration)] {
        &self.scheduled
    }

    /// Every cancel call, oldest first
    pub fn cancelled(&self) -> &[TimerToken] {
        &self.cancelled
    }

    /// Most recently scheduled token
    pub fn last_token(&self) -> Option<TimerToken> {
        self.scheduled.last().map(|(token, _)| *token)
    }

    /// Scheduled tokens that were never cancelled
    pub fn live(&self) -> Vec<TimerToken> {
        let cancelled: HashSet<TimerToken> = self.cancelled.iter().copied().collect();
        self.scheduled
            .iter()
            .map(|(token, _)| *token)
            .filter(|token| !cancelled.contains(token))
            .collect()
    }
}

impl RoundTimer for ManualTimer {
    fn schedule(&mut self, token: TimerToken, after: Duration) {
        self.scheduled.push((token, after));
    }

    fn cancel(&mut self, token: TimerToken) {
        self.cancelled.push(token);
    }
}

// =============================================================================
// TOKIO TIMER - real time, posts into the session queue
// =============================================================================

/// Sleeps on a tokio task, then queues `GameInput::Timeout(token)`.
///
/// Must be used from inside a tokio runtime.
#[derive(Debug)]
pub struct TokioRoundTimer {
    tx: mpsc::UnboundedSender<SessionMessage>,
    pending: Option<(TimerToken, JoinHandle<()>)>,
}

impl TokioRoundTimer {
    pub fn new(tx: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self { tx, pending: None }
    }

    pub fn pending_token(&self) -> Option<TimerToken> {
        self.pending.as_ref().map(|(token, _)| *token)
    }
}

impl RoundTimer for TokioRoundTimer {
    fn schedule(&mut self, token: TimerToken, after: Duration) {
        if let Some((old, handle)) = self.pending.take() {
            tracing::debug!(%old, "replacing pending round timer");
            handle.abort();
        }

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver gone means the session has shut down
            let _ = tx.send(SessionMessage::new(GameInput::Timeout(token)));
        });
        self.pending = Some((token, handle));
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.pending_token() == Some(token) {
            if let Some((_, handle)) = self.pending.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for TokioRoundTimer {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.pending.take() {
            handle.abort();
        }
    }
}
