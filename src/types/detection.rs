//! Detector-facing data: faces, frame results, notifications, user commands

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One facial landmark in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub x: f64,
    pub y: f64,
}

/// Emoji classification for one face
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiScores {
    /// Highest-confidence emoji glyph, e.g. "😃"
    #[serde(default)]
    pub dominant_emoji: Option<String>,
}

/// A face found in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Face {
    #[serde(default)]
    pub feature_points: Vec<FeaturePoint>,
    #[serde(default)]
    pub appearance: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,
    #[serde(default)]
    pub expressions: BTreeMap<String, f64>,
    #[serde(default)]
    pub emojis: EmojiScores,
}

impl Face {
    /// Face with only a dominant emoji, no landmarks
    pub fn with_emoji(glyph: impl Into<String>) -> Self {
        Self {
            emojis: EmojiScores {
                dominant_emoji: Some(glyph.into()),
            },
            ..Self::default()
        }
    }

    pub fn dominant_emoji(&self) -> Option<&str> {
        self.emojis.dominant_emoji.as_deref()
    }
}

/// Detector output for a single processed frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    #[serde(default)]
    pub faces: Vec<Face>,
    /// Seconds since the detector started
    #[serde(default)]
    pub timestamp: f64,
}

impl FrameResult {
    pub fn new(faces: Vec<Face>, timestamp: f64) -> Self {
        Self { faces, timestamp }
    }

    /// Only the first face takes part in the game
    pub fn primary_face(&self) -> Option<&Face> {
        self.faces.first()
    }
}

/// Notifications pushed by the external detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DetectorEvent {
    /// Webcam permission granted
    WebcamConnected,
    /// Webcam permission denied
    WebcamDenied,
    /// Detector ready; switch from raw video to the drawable canvas
    Initialized,
    /// Detector stopped
    Stopped,
    /// One processed frame
    FrameResult(FrameResult),
}

/// Start / Stop / Reset buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserCommand {
    Start,
    Stop,
    Reset,
}

impl std::str::FromStr for UserCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "reset" => Ok(Self::Reset),
            other => Err(format!("unknown command: {}", other)),
        }
    }
}

impl std::fmt::Display for UserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UserCommand::Start => "Start",
            UserCommand::Stop => "Stop",
            UserCommand::Reset => "Reset",
        };
        write!(f, "{}", name)
    }
}

/// Text log areas on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogChannel {
    /// Lifecycle and button messages
    Logs,
    /// Per-frame detection results
    Results,
}
