//! Verification step and per-step status definitions

use serde::{Deserialize, Serialize};

/// Steps of a verification session, in the order they are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStep {
    /// No session running
    Idle,
    /// Caller mimics a prompted gesture on camera
    Gesture,
    /// Sound spike timing is correlated with the gesture
    Latency,
    /// Voice is classified as human or synthetic
    AudioFft,
    /// Operator marks behavioral red flags
    Behavioral,
    /// Caller answers a personal-knowledge question
    Knowledge,
    /// All steps recorded
    Complete,
}

impl VerificationStep {
    /// The five scored steps, in order
    pub const CHECKS: [VerificationStep; 5] = [
        VerificationStep::Gesture,
        VerificationStep::Latency,
        VerificationStep::AudioFft,
        VerificationStep::Behavioral,
        VerificationStep::Knowledge,
    ];

    /// Next step in the fixed order. `Complete` stays `Complete`.
    pub fn next(&self) -> VerificationStep {
        match self {
            Self::Idle => Self::Gesture,
            Self::Gesture => Self::Latency,
            Self::Latency => Self::AudioFft,
            Self::AudioFft => Self::Behavioral,
            Self::Behavioral => Self::Knowledge,
            Self::Knowledge => Self::Complete,
            Self::Complete => Self::Complete,
        }
    }

    /// Operator instruction shown on entering the step
    pub fn instruction(&self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Gesture => Some("Please perform the requested gesture on camera."),
            Self::Latency => Some("Now, ask the caller to speak and detect the sound spike."),
            Self::AudioFft => Some("Analyzing caller's voice for signs of AI or synthesis."),
            Self::Behavioral => Some("Observe the caller's behavior and mark relevant points."),
            Self::Knowledge => Some("Challenge the caller with a personal question."),
            Self::Complete => Some("Verification flow completed. Reviewing Trust Score."),
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Self::Idle => "\x1b[90m",     // Gray
            Self::Complete => "\x1b[36m", // Cyan
            _ => "\x1b[33m",              // Yellow
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for step
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Idle => "⏳",
            Self::Gesture => "✋",
            Self::Latency => "⏱",
            Self::AudioFft => "🎙",
            Self::Behavioral => "👀",
            Self::Knowledge => "❓",
            Self::Complete => "🏁",
        }
    }
}

impl std::fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "IDLE",
            Self::Gesture => "GESTURE",
            Self::Latency => "LATENCY",
            Self::AudioFft => "AUDIO_FFT",
            Self::Behavioral => "BEHAVIORAL",
            Self::Knowledge => "KNOWLEDGE",
            Self::Complete => "COMPLETE",
        };
        write!(f, "{}", name)
    }
}

/// Status of a single check as shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.pad(name)
    }
}
