//! Core types for Liveguard

mod state;
mod signals;
mod score;
mod output;
mod reason;
mod event;
mod error;

pub use state::{VerificationStep, StepStatus};
pub use signals::{VerificationOutcomes, BehavioralFlags, BehavioralFlag, KnowledgeResult};
pub use score::{TrustScore, Verdict, Severity};
pub use output::{SessionOutput, StatusMessage, StepStatuses, NEUTRAL_VERDICT_MESSAGE};
pub use reason::ReasonCode;
pub use event::VerificationEvent;
pub use error::{SessionError, MediaError};
