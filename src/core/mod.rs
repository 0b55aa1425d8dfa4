//! Core modules for the mimic game

pub mod timer;
pub mod controller;
pub mod overlay;
pub mod display;
pub mod detector;
pub mod adapter;
pub mod session;
pub mod api;

pub use timer::{RoundTimer, TimerToken, ManualTimer, TokioRoundTimer};
pub use controller::{GameController, GameState};
pub use overlay::face_overlay;
pub use display::{GameDisplay, TerminalDisplay, TerminalMode, BroadcastDisplay, RecordingDisplay, render_round};
pub use detector::{Detector, RemoteDetector};
pub use adapter::DetectionAdapter;
pub use session::{GameInput, GameSession, SessionHandle, SessionMessage, spawn_session};
pub use api::{create_router, run_server};
