//! Output structures for terminal display and the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EmojiCode, ReasonCode, Score};

/// Result of one controller operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Why the controller did what it did
    pub reason: ReasonCode,
    /// Target after the operation
    pub target: Option<EmojiCode>,
    /// Score after the operation
    pub score: Score,
    /// Time left in the active round (milliseconds)
    pub remaining_ms: u64,
    /// Did a new round start?
    pub round_advanced: bool,
}

impl RoundOutput {
    pub fn new(
        reason: ReasonCode,
        target: Option<EmojiCode>,
        score: Score,
        remaining_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            reason,
            target,
            score,
            remaining_ms,
            round_advanced: reason.advances_round(),
        }
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "target={} | score={}/{} | left={:.1}s | reason={}",
            self.target.map(|t| t.value()).unwrap_or(0),
            self.score.correct,
            self.score.total,
            self.remaining_ms as f64 / 1000.0,
            self.reason.code()
        )
    }
}

/// Point-in-time view of a game, published after every input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStatus {
    pub target: Option<EmojiCode>,
    pub target_glyph: Option<String>,
    pub score: Score,
    /// Current round number (0 before the first round)
    pub round: u32,
    pub remaining_ms: u64,
    pub detector_running: bool,
    pub last_reason: Option<ReasonCode>,
}
