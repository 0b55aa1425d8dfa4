//! Score and Round definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::types::EmojiCode;

/// Running score: rounds won out of rounds started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Rounds won (target matched before the deadline)
    pub correct: u32,
    /// Rounds started, including the current one
    pub total: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Score: {} / {}", self.correct, self.total)
    }
}

/// One active target awaiting a match or timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    /// Emoji the player must produce
    pub target: EmojiCode,
    /// 1-based round number (equals score.total when started)
    pub number: u32,
    /// When the round began
    pub started_at: Instant,
    /// When the round expires if unmatched
    pub deadline: Instant,
}

impl Round {
    pub fn new(target: EmojiCode, number: u32, duration: Duration) -> Self {
        let now = Instant::now();
        Self {
            target,
            number,
            started_at: now,
            deadline: now + duration,
        }
    }

    /// Milliseconds until the deadline, saturating at zero
    pub fn remaining_ms(&self) -> u64 {
        self.deadline
            .saturating_duration_since(Instant::now())
            .as_millis() as u64
    }
}
