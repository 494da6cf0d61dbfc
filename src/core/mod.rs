//! Core modules for Liveguard

pub mod trust;
pub mod debounce;
pub mod media;
pub mod session;
pub mod api;
pub mod command;

pub use trust::TrustScoreEngine;
pub use debounce::Debouncer;
pub use media::{MediaCapture, SimulatedCapture, StreamHandle};
pub use session::{VerificationSession, SessionConfig, GESTURE_PROMPTS};
pub use command::{parse_command, Command, CommandError};
pub use api::{create_router, create_router_with_state, run_server, spawn_ticker, AppState};
