//! Session and media errors

use thiserror::Error;
use crate::types::VerificationStep;

/// Capture provider failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("access denied: {0}")]
    Denied(String),

    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("failed to access camera/mic: {0}")]
    MediaAccess(#[from] MediaError),

    #[error("event `{event}` is not valid in step {step}")]
    InvalidEvent {
        event: &'static str,
        step: VerificationStep,
    },

    #[error("verification already started (step {0})")]
    AlreadyStarted(VerificationStep),
}
