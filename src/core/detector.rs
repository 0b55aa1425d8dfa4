//! Detector lifecycle collaborator
//!
//! The face detector itself is external. The game only needs to start,
//! stop and reset it, guarded by its running flag.

use tokio::sync::broadcast;

use crate::types::{GameUpdate, UserCommand};

/// Lifecycle control of the external face detector
pub trait Detector: Send {
    fn is_running(&self) -> bool;
    fn start(&mut self);
    fn stop(&mut self);
    fn reset(&mut self);
    /// The detector reported that it stopped on its own
    fn mark_stopped(&mut self);
}

/// Detector running in a remote client (browser); commands are published
/// as [`GameUpdate::DetectorCommand`] for the client to carry out.
#[derive(Debug)]
pub struct RemoteDetector {
    running: bool,
    commands: Option<broadcast::Sender<GameUpdate>>,
}

impl RemoteDetector {
    pub fn new(commands: broadcast::Sender<GameUpdate>) -> Self {
        Self {
            running: false,
            commands: Some(commands),
        }
    }

    /// Tracks the running flag only; used by the terminal front end
    pub fn local() -> Self {
        Self {
            running: false,
            commands: None,
        }
    }

    fn send(&self, command: UserCommand) {
        tracing::debug!(%command, "detector command");
        if let Some(tx) = &self.commands {
            let _ = tx.send(GameUpdate::DetectorCommand { command });
        }
    }
}

impl Detector for RemoteDetector {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) {
        self.running = true;
        self.send(UserCommand::Start);
    }

    fn stop(&mut self) {
        self.running = false;
        self.send(UserCommand::Stop);
    }

    fn reset(&mut self) {
        self.send(UserCommand::Reset);
    }

    fn mark_stopped(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_detector_publishes_commands() {
        let (tx, mut rx) = broadcast::channel(8);
        let mut detector = RemoteDetector::new(tx);

        detector.start();
        assert!(detector.is_running());
        assert_eq!(
            rx.try_recv().unwrap(),
            GameUpdate::DetectorCommand { command: UserCommand::Start }
        );

        detector.stop();
        assert!(!detector.is_running());
        assert_eq!(
            rx.try_recv().unwrap(),
            GameUpdate::DetectorCommand { command: UserCommand::Stop }
        );
    }

    #[test]
    fn test_local_detector_tracks_flag() {
        let mut detector = RemoteDetector::local();
        detector.start();
        assert!(detector.is_running());
        detector.mark_stopped();
        assert!(!detector.is_running());
    }
}
