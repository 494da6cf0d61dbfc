//! Reason codes for session events and step changes

use serde::{Deserialize, Serialize};

/// Reason codes attached to every session output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Session lifecycle
    // =========================================================================
    /// Session idle, nothing recorded
    R001_SESSION_IDLE,
    /// Media acquired, verification started
    R001_SESSION_STARTED,
    /// Media could not be acquired, session stays idle
    R001_MEDIA_UNAVAILABLE,
    /// Session returned to idle
    R001_SESSION_RESET,

    // =========================================================================
    // R002: Recorded outcomes
    // =========================================================================
    /// Gesture answered inside the human reaction window
    R002_GESTURE_PASSED,
    /// Gesture answered too fast or too slow
    R002_GESTURE_TIMING_FAILED,
    /// Operator marked the gesture as failed
    R002_GESTURE_FORCED_FAILURE,
    R002_LATENCY_MATCHED,
    R002_LATENCY_MISMATCHED,
    R002_AUDIO_HUMAN,
    R002_AUDIO_SYNTHETIC,
    R002_KNOWLEDGE_RECORDED,

    // =========================================================================
    // R003: Behavioral flags
    // =========================================================================
    /// A flag changed, advance is pending
    R003_FLAGS_UPDATED,
    /// Quiet period elapsed, moving to the knowledge step
    R003_DEBOUNCE_ELAPSED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_SESSION_IDLE => "R001_SESSION_IDLE",
            Self::R001_SESSION_STARTED => "R001_SESSION_STARTED",
            Self::R001_MEDIA_UNAVAILABLE => "R001_MEDIA_UNAVAILABLE",
            Self::R001_SESSION_RESET => "R001_SESSION_RESET",
            Self::R002_GESTURE_PASSED => "R002_GESTURE_PASSED",
            Self::R002_GESTURE_TIMING_FAILED => "R002_GESTURE_TIMING_FAILED",
            Self::R002_GESTURE_FORCED_FAILURE => "R002_GESTURE_FORCED_FAILURE",
            Self::R002_LATENCY_MATCHED => "R002_LATENCY_MATCHED",
            Self::R002_LATENCY_MISMATCHED => "R002_LATENCY_MISMATCHED",
            Self::R002_AUDIO_HUMAN => "R002_AUDIO_HUMAN",
            Self::R002_AUDIO_SYNTHETIC => "R002_AUDIO_SYNTHETIC",
            Self::R002_KNOWLEDGE_RECORDED => "R002_KNOWLEDGE_RECORDED",
            Self::R003_FLAGS_UPDATED => "R003_FLAGS_UPDATED",
            Self::R003_DEBOUNCE_ELAPSED => "R003_DEBOUNCE_ELAPSED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_SESSION_IDLE => "Waiting for verification to start",
            Self::R001_SESSION_STARTED => "Camera and microphone active",
            Self::R001_MEDIA_UNAVAILABLE => "Camera or microphone unavailable",
            Self::R001_SESSION_RESET => "Session reset",
            Self::R002_GESTURE_PASSED => "Gesture inside reaction window",
            Self::R002_GESTURE_TIMING_FAILED => "Gesture outside reaction window",
            Self::R002_GESTURE_FORCED_FAILURE => "Gesture failed by operator",
            Self::R002_LATENCY_MATCHED => "Sound timing matched",
            Self::R002_LATENCY_MISMATCHED => "Sound timing mismatched",
            Self::R002_AUDIO_HUMAN => "Likely human voice",
            Self::R002_AUDIO_SYNTHETIC => "Possibly synthetic voice",
            Self::R002_KNOWLEDGE_RECORDED => "Knowledge result recorded",
            Self::R003_FLAGS_UPDATED => "Behavioral flags updated",
            Self::R003_DEBOUNCE_ELAPSED => "Behavioral step closed",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
