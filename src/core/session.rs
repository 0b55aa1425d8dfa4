//! Game session: single-threaded dispatcher
//!
//! Detector events, button commands and timer expiries all arrive on one
//! queue and are applied one at a time. Nothing orders a frame result
//! against a timeout; the controller's timer tokens make either order safe.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::GameConfig;
use crate::core::adapter::DetectionAdapter;
use crate::core::controller::GameController;
use crate::core::detector::Detector;
use crate::core::display::GameDisplay;
use crate::core::timer::{RoundTimer, TimerToken, TokioRoundTimer};
use crate::error::SessionError;
use crate::types::{DetectorEvent, GameStatus, RoundOutput, UserCommand};

/// Everything that can drive the game
#[derive(Debug, Clone, PartialEq)]
pub enum GameInput {
    Detector(DetectorEvent),
    Command(UserCommand),
    Timeout(TimerToken),
    Shutdown,
}

/// Queue item: an input plus an optional reply with the resulting status
#[derive(Debug)]
pub struct SessionMessage {
    pub input: GameInput,
    pub ack: Option<oneshot::Sender<GameStatus>>,
}

impl SessionMessage {
    pub fn new(input: GameInput) -> Self {
        Self { input, ack: None }
    }

    pub fn with_ack(input: GameInput) -> (Self, oneshot::Receiver<GameStatus>) {
        let (tx, rx) = oneshot::channel();
        (Self { input, ack: Some(tx) }, rx)
    }
}

/// Controller + adapter, fed one input at a time
pub struct GameSession<T: RoundTimer, D: Detector> {
    controller: GameController<T>,
    adapter: DetectionAdapter<D>,
}

impl<T: RoundTimer, D: Detector> GameSession<T, D> {
    pub fn new(controller: GameController<T>, detector: D, display: Box<dyn GameDisplay>) -> Self {
        Self {
            controller,
            adapter: DetectionAdapter::new(detector, display),
        }
    }

    /// Reset the game and show the first target
    pub fn launch(&mut self) -> RoundOutput {
        let output = self.controller.reset_game();
        self.adapter.render(&output);
        output
    }

    /// Apply one input; `None` when it never reached the controller
    pub fn dispatch(&mut self, input: GameInput) -> Option<RoundOutput> {
        match input {
            GameInput::Detector(event) => self.adapter.handle_event(event, &mut self.controller),
            GameInput::Command(command) => {
                self.adapter.handle_command(command, &mut self.controller)
            }
            GameInput::Timeout(token) => {
                let output = self.controller.on_round_timeout(token);
                self.adapter.render(&output);
                Some(output)
            }
            GameInput::Shutdown => None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.controller
            .status(self.adapter.detector().is_running())
    }

    pub fn controller(&self) -> &GameController<T> {
        &self.controller
    }

    pub fn detector(&self) -> &D {
        self.adapter.detector()
    }

    /// Drain the queue until Shutdown or every sender is gone.
    ///
    /// `status_tx` should already hold the launch status.
    pub async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<SessionMessage>,
        status_tx: watch::Sender<GameStatus>,
    ) {
        while let Some(message) = rx.recv().await {
            let shutdown = message.input == GameInput::Shutdown;
            if let Some(output) = self.dispatch(message.input) {
                tracing::debug!("{}", output.to_parseable_string());
            }

            let status = self.status();
            status_tx.send_replace(status.clone());
            if let Some(ack) = message.ack {
                let _ = ack.send(status);
            }
            if shutdown {
                break;
            }
        }
        tracing::info!(score = %self.controller.score(), "session ended");
    }
}

/// Client side of a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionMessage>,
    status: watch::Receiver<GameStatus>,
}

impl SessionHandle {
    /// Queue an input without waiting
    pub fn send(&self, input: GameInput) -> Result<(), SessionError> {
        self.tx
            .send(SessionMessage::new(input))
            .map_err(|_| SessionError::Closed)
    }

    /// Queue an input and wait for the status after it was applied
    pub async fn request(&self, input: GameInput) -> Result<GameStatus, SessionError> {
        let (message, ack) = SessionMessage::with_ack(input);
        self.tx.send(message).map_err(|_| SessionError::Closed)?;
        ack.await.map_err(|_| SessionError::Closed)
    }

    /// Latest published status
    pub fn status(&self) -> GameStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<GameStatus> {
        self.status.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Start a session on a tokio task with a real-time round timer.
///
/// The game is reset before this returns, so the first target is
/// already set.
pub fn spawn_session<D>(
    config: &GameConfig,
    detector: D,
    display: Box<dyn GameDisplay>,
) -> (SessionHandle, JoinHandle<()>)
where
    D: Detector + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let timer = TokioRoundTimer::new(tx.clone());
    let controller = GameController::from_config(timer, config);

    let mut session = GameSession::new(controller, detector, display);
    session.launch();

    let (status_tx, status_rx) = watch::channel(session.status());
    let task = tokio::spawn(session.run(rx, status_tx));

    (SessionHandle { tx, status: status_rx }, task)
}
