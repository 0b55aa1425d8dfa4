//! Reason codes for every controller decision

use serde::{Deserialize, Serialize};

/// Why the controller did (or did not) change the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // G00x: Round advancement
    // =========================================================================
    /// Score cleared and first round started
    G001_GAME_RESET,
    /// New round started directly
    G002_ROUND_STARTED,
    /// Observed emoji matched the target; point awarded, next round started
    G003_MATCH_SCORED,

    // =========================================================================
    // G00x: Observations that change nothing
    // =========================================================================
    /// Observed emoji differs from the target
    G004_MISS,
    /// Frame carried no face or no decodable emoji
    G005_NO_SIGNAL,
    /// No round is active yet
    G006_NO_ACTIVE_ROUND,

    // =========================================================================
    // G00x: Timer
    // =========================================================================
    /// Round deadline passed; next round started without a point
    G007_ROUND_EXPIRED,
    /// Timeout from a superseded timer; ignored
    G008_STALE_TIMEOUT,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::G001_GAME_RESET => "G001_GAME_RESET",
            Self::G002_ROUND_STARTED => "G002_ROUND_STARTED",
            Self::G003_MATCH_SCORED => "G003_MATCH_SCORED",
            Self::G004_MISS => "G004_MISS",
            Self::G005_NO_SIGNAL => "G005_NO_SIGNAL",
            Self::G006_NO_ACTIVE_ROUND => "G006_NO_ACTIVE_ROUND",
            Self::G007_ROUND_EXPIRED => "G007_ROUND_EXPIRED",
            Self::G008_STALE_TIMEOUT => "G008_STALE_TIMEOUT",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::G001_GAME_RESET => "Game reset",
            Self::G002_ROUND_STARTED => "New round started",
            Self::G003_MATCH_SCORED => "Match! Point scored",
            Self::G004_MISS => "Not the target",
            Self::G005_NO_SIGNAL => "No emoji detected",
            Self::G006_NO_ACTIVE_ROUND => "No active round",
            Self::G007_ROUND_EXPIRED => "Time's up",
            Self::G008_STALE_TIMEOUT => "Stale timeout ignored",
        }
    }

    /// Did this decision start a new round?
    pub fn advances_round(&self) -> bool {
        matches!(
            self,
            Self::G001_GAME_RESET
                | Self::G002_ROUND_STARTED
                | Self::G003_MATCH_SCORED
                | Self::G007_ROUND_EXPIRED
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advancing_codes() {
        assert!(ReasonCode::G003_MATCH_SCORED.advances_round());
        assert!(ReasonCode::G007_ROUND_EXPIRED.advances_round());
        assert!(!ReasonCode::G004_MISS.advances_round());
        assert!(!ReasonCode::G008_STALE_TIMEOUT.advances_round());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ReasonCode::G007_ROUND_EXPIRED.to_string(),
            "G007_ROUND_EXPIRED: Time's up"
        );
    }
}
