//! Display collaborator
//!
//! Every call is fire-and-forget; the game never reads anything back.

use colored::Colorize;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::{EmojiCode, FaceOverlay, GameUpdate, LogChannel, RoundOutput, Score};

/// Where target, score, logs and face overlays end up
pub trait GameDisplay: Send {
    fn render_target(&mut self, code: EmojiCode);
    fn render_score(&mut self, score: Score);
    fn append_log(&mut self, channel: LogChannel, message: &str);
    fn clear_log(&mut self, channel: LogChannel);
    /// Swap the raw video feed for the drawable canvas
    fn show_canvas(&mut self);
    fn draw_face(&mut self, overlay: &FaceOverlay);
}

/// Push target and score when an operation started a new round
pub fn render_round(display: &mut dyn GameDisplay, output: &RoundOutput) {
    if !output.round_advanced {
        return;
    }
    if let Some(target) = output.target {
        display.render_target(target);
    }
    display.render_score(output.score);
}

fn target_update(code: EmojiCode) -> GameUpdate {
    GameUpdate::Target {
        code,
        glyph: code.glyph(),
    }
}

fn score_update(score: Score) -> GameUpdate {
    GameUpdate::Score {
        correct: score.correct,
        total: score.total,
    }
}

// =============================================================================
// TERMINAL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalMode {
    Color,
    Plain,
    /// One GameUpdate JSON object per line
    Json,
}

/// Prints to stdout
#[derive(Debug)]
pub struct TerminalDisplay {
    mode: TerminalMode,
    /// Also print per-frame results and overlays
    verbose: bool,
}

impl TerminalDisplay {
    pub fn new(mode: TerminalMode, verbose: bool) -> Self {
        Self { mode, verbose }
    }

    fn emit(&self, update: &GameUpdate, text: String) {
        match self.mode {
            TerminalMode::Json => match serde_json::to_string(update) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!("failed to encode display update: {}", e),
            },
            _ => println!("{}", text),
        }
    }

    fn colored(&self, text: String, paint: fn(&str) -> colored::ColoredString) -> String {
        match self.mode {
            TerminalMode::Color => paint(&text).to_string(),
            _ => text,
        }
    }
}

impl GameDisplay for TerminalDisplay {
    fn render_target(&mut self, code: EmojiCode) {
        let name = code.name().unwrap_or("?");
        let text = self.colored(format!("🎯 Target: {} ({})", code, name), |s| s.bold());
        self.emit(&target_update(code), text);
    }

    fn render_score(&mut self, score: Score) {
        let text = self.colored(score.to_string(), |s| s.cyan());
        self.emit(&score_update(score), text);
    }

    fn append_log(&mut self, channel: LogChannel, message: &str) {
        if channel == LogChannel::Results && !self.verbose {
            return;
        }
        let update = GameUpdate::Log {
            channel,
            message: message.to_string(),
        };
        let text = self.colored(format!("  [{:?}] {}", channel, message), |s| s.dimmed());
        self.emit(&update, text);
    }

    fn clear_log(&mut self, _channel: LogChannel) {}

    fn show_canvas(&mut self) {
        tracing::debug!("canvas enabled");
    }

    fn draw_face(&mut self, overlay: &FaceOverlay) {
        if !self.verbose {
            return;
        }
        let label = overlay
            .label
            .as_ref()
            .map(|l| format!(" {} at ({:.0}, {:.0})", l.text, l.x, l.y))
            .unwrap_or_default();
        let text = self.colored(
            format!("  [Face] {} landmarks{}", overlay.dots.len(), label),
            |s| s.dimmed(),
        );
        self.emit(&GameUpdate::DrawFace(overlay.clone()), text);
    }
}

// =============================================================================
// BROADCAST - live WebSocket clients
// =============================================================================

/// Publishes every call as a [`GameUpdate`]
#[derive(Debug, Clone)]
pub struct BroadcastDisplay {
    tx: broadcast::Sender<GameUpdate>,
}

impl BroadcastDisplay {
    pub fn new(tx: broadcast::Sender<GameUpdate>) -> Self {
        Self { tx }
    }

    fn publish(&self, update: GameUpdate) {
        // No subscribers is fine
        let _ = self.tx.send(update);
    }
}

impl GameDisplay for BroadcastDisplay {
    fn render_target(&mut self, code: EmojiCode) {
        self.publish(target_update(code));
    }

    fn render_score(&mut self, score: Score) {
        self.publish(score_update(score));
    }

    fn append_log(&mut self, channel: LogChannel, message: &str) {
        self.publish(GameUpdate::Log {
            channel,
            message: message.to_string(),
        });
    }

    fn clear_log(&mut self, channel: LogChannel) {
        self.publish(GameUpdate::ClearLog { channel });
    }

    fn show_canvas(&mut self) {
        self.publish(GameUpdate::ShowCanvas);
    }

    fn draw_face(&mut self, overlay: &FaceOverlay) {
        self.publish(GameUpdate::DrawFace(overlay.clone()));
    }
}

// =============================================================================
// RECORDING - tests
// =============================================================================

/// Keeps every call; clones share the same record
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    updates: Arc<Mutex<Vec<GameUpdate>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<GameUpdate> {
        self.updates.lock().clone()
    }

    /// Messages appended to `channel`, in order
    pub fn logs(&self, channel: LogChannel) -> Vec<String> {
        self.updates
            .lock()
            .iter()
            .filter_map(|u| match u {
                GameUpdate::Log { channel: c, message } if *c == channel => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every target rendered, in order
    pub fn targets(&self) -> Vec<EmojiCode> {
        self.updates
            .lock()
            .iter()
            .filter_map(|u| match u {
                GameUpdate::Target { code, .. } => Some(*code),
                _ => None,
            })
            .collect()
    }

    /// Most recent score rendered
    pub fn last_score(&self) -> Option<Score> {
        self.updates.lock().iter().rev().find_map(|u| match u {
            GameUpdate::Score { correct, total } => Some(Score {
                correct: *correct,
                total: *total,
            }),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.updates.lock().clear();
    }

    fn push(&self, update: GameUpdate) {
        self.updates.lock().push(update);
    }
}

impl GameDisplay for RecordingDisplay {
    fn render_target(&mut self, code: EmojiCode) {
        self.push(target_update(code));
    }

    fn render_score(&mut self, score: Score) {
        self.push(score_update(score));
    }

    fn append_log(&mut self, channel: LogChannel, message: &str) {
        self.push(GameUpdate::Log {
            channel,
            message: message.to_string(),
        });
    }

    fn clear_log(&mut self, channel: LogChannel) {
        self.push(GameUpdate::ClearLog { channel });
    }

    fn show_canvas(&mut self) {
        self.push(GameUpdate::ShowCanvas);
    }

    fn draw_face(&mut self, overlay: &FaceOverlay) {
        self.push(GameUpdate::DrawFace(overlay.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReasonCode;

    #[test]
    fn test_render_round_only_on_advance() {
        let mut display = RecordingDisplay::new();

        let miss = RoundOutput::new(ReasonCode::G004_MISS, Some(EmojiCode(128515)), Score::new(), 0);
        render_round(&mut display, &miss);
        assert!(display.updates().is_empty());

        let score = Score { correct: 1, total: 2 };
        let hit = RoundOutput::new(ReasonCode::G003_MATCH_SCORED, Some(EmojiCode(128521)), score, 6000);
        render_round(&mut display, &hit);
        assert_eq!(display.targets(), vec![EmojiCode(128521)]);
        assert_eq!(display.last_score(), Some(score));
    }

    #[test]
    fn test_broadcast_display_publishes() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut display = BroadcastDisplay::new(tx);
        display.append_log(LogChannel::Logs, "Webcam access allowed");
        display.show_canvas();

        assert_eq!(
            rx.try_recv().unwrap(),
            GameUpdate::Log {
                channel: LogChannel::Logs,
                message: "Webcam access allowed".to_string()
            }
        );
        assert_eq!(rx.try_recv().unwrap(), GameUpdate::ShowCanvas);
    }

    #[test]
    fn test_broadcast_without_subscribers_does_not_fail() {
        let (tx, rx) = broadcast::channel(16);
        drop(rx);
        let mut display = BroadcastDisplay::new(tx);
        display.render_score(Score::new());
    }
}
