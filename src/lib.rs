//! Mimic: a "mimic the emoji" game engine
//!
//! A face detector reports the dominant emoji of the player's face; the game
//! shows a target emoji and scores a point whenever the face matches it
//! before the round expires.
//!
//! Flow: detector events → DetectionAdapter → GameController → display

pub mod config;
pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// ROUND TIMING
// =============================================================================

/// How long a round stays open before it expires unmatched (milliseconds)
pub const ROUND_DURATION_MS: u64 = 6000;

// =============================================================================
// EMOJI CATALOG - every emoji the detector can classify
// =============================================================================

/// Code points of the target catalog, in detector order
pub const EMOJI_CATALOG: [u32; 13] = [
    128528, // 😐 neutral
    9786,   // ☺ relaxed
    128515, // 😃 smiley
    128524, // 😌 relieved
    128527, // 😏 smirk
    128521, // 😉 wink
    128535, // 😗 kissing
    128539, // 😛 stuck out tongue
    128540, // 😜 stuck out tongue, winking eye
    128542, // 😞 disappointed
    128545, // 😡 rage
    128563, // 😳 flushed
    128561, // 😱 scream
];

/// Short names for the catalog, index-aligned with [`EMOJI_CATALOG`]
pub const EMOJI_NAMES: [&str; 13] = [
    "neutral",
    "relaxed",
    "smiley",
    "relieved",
    "smirk",
    "wink",
    "kissing",
    "stuck_out_tongue",
    "stuck_out_tongue_winking_eye",
    "disappointed",
    "rage",
    "flushed",
    "scream",
];

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
