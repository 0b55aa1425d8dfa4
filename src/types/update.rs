//! Display updates pushed to live clients

use serde::{Deserialize, Serialize};

use crate::types::{EmojiCode, LogChannel, UserCommand};

/// A filled landmark dot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
}

/// Text drawn at a landmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: String,
}

/// Everything needed to draw one face over the video canvas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceOverlay {
    pub dots: Vec<OverlayDot>,
    pub label: Option<OverlayLabel>,
}

/// Fire-and-forget display messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameUpdate {
    Target { code: EmojiCode, glyph: Option<String> },
    Score { correct: u32, total: u32 },
    Log { channel: LogChannel, message: String },
    ClearLog { channel: LogChannel },
    ShowCanvas,
    DrawFace(FaceOverlay),
    /// Ask the client-side detector to start, stop or reset
    DetectorCommand { command: UserCommand },
}
