//! Detection Event Adapter
//!
//! Translates detector notifications and Start/Stop/Reset buttons into
//! controller calls, log lines and draw requests.

use std::collections::BTreeMap;

use crate::core::controller::GameController;
use crate::core::detector::Detector;
use crate::core::display::{render_round, GameDisplay};
use crate::core::overlay::face_overlay;
use crate::core::timer::RoundTimer;
use crate::types::{DetectorEvent, EmojiCode, Face, FrameResult, LogChannel, RoundOutput, UserCommand};

/// Bridges the detector to the controller; owns the detector handle and display
pub struct DetectionAdapter<D: Detector> {
    detector: D,
    display: Box<dyn GameDisplay>,
}

impl<D: Detector> DetectionAdapter<D> {
    pub fn new(detector: D, display: Box<dyn GameDisplay>) -> Self {
        Self { detector, display }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Show target and score if `output` started a new round
    pub fn render(&mut self, output: &RoundOutput) {
        render_round(self.display.as_mut(), output);
    }

    /// Handle one detector notification
    pub fn handle_event<T: RoundTimer>(
        &mut self,
        event: DetectorEvent,
        controller: &mut GameController<T>,
    ) -> Option<RoundOutput> {
        match event {
            DetectorEvent::WebcamConnected => {
                self.log("Webcam access allowed");
                None
            }
            DetectorEvent::WebcamDenied => {
                tracing::warn!("webcam access denied; press Start once access is granted");
                // The detector never came up, so the next Start must go through
                self.detector.mark_stopped();
                self.log("Webcam access denied");
                None
            }
            DetectorEvent::Initialized => {
                self.log("The detector reports initialized");
                self.display.show_canvas();
                None
            }
            DetectorEvent::Stopped => {
                self.detector.mark_stopped();
                self.log("The detector reports stopped");
                self.display.clear_log(LogChannel::Results);
                None
            }
            DetectorEvent::FrameResult(frame) => self.on_frame(&frame, controller),
        }
    }

    /// Handle a Start / Stop / Reset button
    pub fn handle_command<T: RoundTimer>(
        &mut self,
        command: UserCommand,
        controller: &mut GameController<T>,
    ) -> Option<RoundOutput> {
        tracing::info!(%command, running = self.detector.is_running(), "button pressed");
        match command {
            UserCommand::Start => {
                if !self.detector.is_running() {
                    self.display.clear_log(LogChannel::Logs);
                    self.detector.start();
                }
                self.log("Start button pressed");
                None
            }
            UserCommand::Stop => {
                self.log("Stop button pressed");
                if self.detector.is_running() {
                    self.detector.stop();
                }
                None
            }
            UserCommand::Reset => {
                self.log("Reset button pressed");
                if self.detector.is_running() {
                    self.detector.reset();
                }
                self.display.clear_log(LogChannel::Results);
                self.display.clear_log(LogChannel::Logs);

                let output = controller.reset_game();
                self.render(&output);
                Some(output)
            }
        }
    }

    fn on_frame<T: RoundTimer>(
        &mut self,
        frame: &FrameResult,
        controller: &mut GameController<T>,
    ) -> Option<RoundOutput> {
        self.display.clear_log(LogChannel::Results);
        self.result(&format!("Timestamp: {:.2}", frame.timestamp));
        self.result(&format!("Number of faces found: {}", frame.faces.len()));

        let face = frame.primary_face()?;
        self.report_face(face);
        self.display.draw_face(&face_overlay(face));

        let code = decode_dominant(face);
        let output = controller.on_observed_emoji(code);
        tracing::debug!(?code, reason = output.reason.code(), "frame observed");
        self.render(&output);
        Some(output)
    }

    fn report_face(&mut self, face: &Face) {
        let appearance = serde_json::to_string(&face.appearance).unwrap_or_default();
        self.result(&format!("Appearance: {}", appearance));
        self.result(&format!("Emotions: {}", rounded_json(&face.emotions)));
        self.result(&format!("Expressions: {}", rounded_json(&face.expressions)));
        self.result(&format!("Emoji: {}", face.dominant_emoji().unwrap_or("none")));
    }

    fn log(&mut self, message: &str) {
        self.display.append_log(LogChannel::Logs, message);
    }

    fn result(&mut self, message: &str) {
        self.display.append_log(LogChannel::Results, message);
    }
}

/// Dominant emoji as a code point; undecodable glyphs count as no signal
fn decode_dominant(face: &Face) -> Option<EmojiCode> {
    let glyph = face.dominant_emoji()?;
    match EmojiCode::from_glyph(glyph) {
        Ok(code) => Some(code),
        Err(e) => {
            tracing::warn!(glyph, "ignoring dominant emoji: {}", e);
            None
        }
    }
}

/// Scores rounded to whole numbers, as JSON
fn rounded_json(scores: &BTreeMap<String, f64>) -> String {
    let rounded: BTreeMap<&str, i64> = scores
        .iter()
        .map(|(k, v)| (k.as_str(), v.round() as i64))
        .collect();
    serde_json::to_string(&rounded).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detector::RemoteDetector;
    use crate::core::display::RecordingDisplay;
    use crate::core::timer::ManualTimer;
    use crate::types::{GameUpdate, ReasonCode, Score};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn setup() -> (
        DetectionAdapter<RemoteDetector>,
        GameController<ManualTimer>,
        RecordingDisplay,
    ) {
        let display = RecordingDisplay::new();
        let adapter = DetectionAdapter::new(RemoteDetector::local(), Box::new(display.clone()));
        let mut controller = GameController::with_rng(
            ManualTimer::new(),
            Duration::from_millis(6000),
            StdRng::seed_from_u64(8),
        );
        controller.reset_game();
        (adapter, controller, display)
    }

    fn frame_with(glyph: &str) -> DetectorEvent {
        DetectorEvent::FrameResult(FrameResult::new(vec![Face::with_emoji(glyph)], 0.5))
    }

    #[test]
    fn test_matching_frame_scores() {
        let (mut adapter, mut controller, display) = setup();
        let glyph = controller.target().unwrap().glyph().unwrap();

        let output = adapter.handle_event(frame_with(&glyph), &mut controller).unwrap();
        assert_eq!(output.reason, ReasonCode::G003_MATCH_SCORED);
        assert_eq!(display.last_score(), Some(Score { correct: 1, total: 2 }));
        assert_eq!(display.targets().len(), 1);
    }

    #[test]
    fn test_empty_frame_skips_controller() {
        let (mut adapter, mut controller, display) = setup();
        let before = controller.state().clone();

        let event = DetectorEvent::FrameResult(FrameResult::new(vec![], 2.0));
        assert!(adapter.handle_event(event, &mut controller).is_none());
        assert_eq!(controller.state(), &before);
        assert_eq!(
            display.logs(LogChannel::Results),
            vec!["Timestamp: 2.00".to_string(), "Number of faces found: 0".to_string()]
        );
    }

    #[test]
    fn test_only_first_face_counts() {
        let (mut adapter, mut controller, _display) = setup();
        let target = controller.target().unwrap();
        let wrong = EmojiCode::catalog().find(|c| *c != target).unwrap();
        let faces = vec![
            Face::with_emoji(wrong.glyph().unwrap()),
            Face::with_emoji(target.glyph().unwrap()),
        ];

        let event = DetectorEvent::FrameResult(FrameResult::new(faces, 1.0));
        let output = adapter.handle_event(event, &mut controller).unwrap();
        assert_eq!(output.reason, ReasonCode::G004_MISS);
    }

    #[test]
    fn test_undecodable_glyph_is_no_signal() {
        let (mut adapter, mut controller, _display) = setup();
        let output = adapter.handle_event(frame_with("??"), &mut controller).unwrap();
        assert_eq!(output.reason, ReasonCode::G005_NO_SIGNAL);
    }

    #[test]
    fn test_frame_logs_and_draws_face() {
        let (mut adapter, mut controller, display) = setup();
        let mut face = Face::with_emoji("😱");
        face.emotions.insert("fear".to_string(), 87.6);
        face.expressions.insert("mouthOpen".to_string(), 99.2);
        display.clear();

        let event = DetectorEvent::FrameResult(FrameResult::new(vec![face], 12.3456));
        adapter.handle_event(event, &mut controller);

        let results = display.logs(LogChannel::Results);
        assert_eq!(results[0], "Timestamp: 12.35");
        assert_eq!(results[1], "Number of faces found: 1");
        assert_eq!(results[3], r#"Emotions: {"fear":88}"#);
        assert_eq!(results[4], r#"Expressions: {"mouthOpen":99}"#);
        assert_eq!(results[5], "Emoji: 😱");
        assert_eq!(display.updates()[0], GameUpdate::ClearLog { channel: LogChannel::Results });
        assert!(display.updates().iter().any(|u| matches!(u, GameUpdate::DrawFace(_))));
    }

    #[test]
    fn test_start_and_stop_guarded_by_running_flag() {
        let (mut adapter, mut controller, display) = setup();

        adapter.handle_command(UserCommand::Stop, &mut controller);
        assert!(!adapter.detector().is_running());

        adapter.handle_command(UserCommand::Start, &mut controller);
        assert!(adapter.detector().is_running());
        adapter.handle_command(UserCommand::Start, &mut controller);
        assert!(adapter.detector().is_running());

        adapter.handle_command(UserCommand::Stop, &mut controller);
        assert!(!adapter.detector().is_running());
        assert_eq!(
            display.logs(LogChannel::Logs),
            vec![
                "Stop button pressed",
                "Start button pressed",
                "Start button pressed",
                "Stop button pressed",
            ]
        );
    }

    #[test]
    fn test_reset_command_resets_game() {
        let (mut adapter, mut controller, display) = setup();
        let target = controller.target().unwrap();
        controller.on_observed_emoji(Some(target));

        let output = adapter.handle_command(UserCommand::Reset, &mut controller).unwrap();
        assert_eq!(output.reason, ReasonCode::G001_GAME_RESET);
        assert_eq!(controller.score(), Score { correct: 0, total: 1 });
        assert_eq!(display.last_score(), Some(Score { correct: 0, total: 1 }));
    }

    #[test]
    fn test_start_after_webcam_denied_reaches_detector() {
        let (commands, mut rx) = tokio::sync::broadcast::channel(16);
        let mut adapter = DetectionAdapter::new(
            RemoteDetector::new(commands),
            Box::new(RecordingDisplay::new()),
        );
        let (_, mut controller, _) = setup();

        adapter.handle_command(UserCommand::Start, &mut controller);
        adapter.handle_event(DetectorEvent::WebcamDenied, &mut controller);
        assert!(!adapter.detector().is_running());

        adapter.handle_command(UserCommand::Start, &mut controller);
        assert!(adapter.detector().is_running());

        let mut sent = Vec::new();
        while let Ok(update) = rx.try_recv() {
            if let GameUpdate::DetectorCommand { command } = update {
                sent.push(command);
            }
        }
        assert_eq!(sent, vec![UserCommand::Start, UserCommand::Start]);
    }

    #[test]
    fn test_lifecycle_notifications() {
        let (mut adapter, mut controller, display) = setup();
        adapter.handle_command(UserCommand::Start, &mut controller);

        adapter.handle_event(DetectorEvent::WebcamConnected, &mut controller);
        adapter.handle_event(DetectorEvent::Initialized, &mut controller);
        adapter.handle_event(DetectorEvent::Stopped, &mut controller);
        adapter.handle_event(DetectorEvent::WebcamDenied, &mut controller);

        assert!(!adapter.detector().is_running());
        assert!(display.updates().contains(&GameUpdate::ShowCanvas));
        let logs = display.logs(LogChannel::Logs);
        assert!(logs.contains(&"Webcam access allowed".to_string()));
        assert!(logs.contains(&"The detector reports initialized".to_string()));
        assert!(logs.contains(&"The detector reports stopped".to_string()));
        assert!(logs.contains(&"Webcam access denied".to_string()));
        assert_eq!(controller.score(), Score { correct: 0, total: 1 });
    }
}
