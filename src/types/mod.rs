//! Core types for the mimic game

mod emoji;
mod round;
mod detection;
mod reason;
mod output;
mod update;

pub use emoji::EmojiCode;
pub use round::{Score, Round};
pub use detection::{FeaturePoint, EmojiScores, Face, FrameResult, DetectorEvent, UserCommand, LogChannel};
pub use reason::ReasonCode;
pub use output::{RoundOutput, GameStatus};
pub use update::{OverlayDot, OverlayLabel, FaceOverlay, GameUpdate};
