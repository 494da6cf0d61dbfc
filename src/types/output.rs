//! Output structures for hosts (terminal, JSON, WebSocket)

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::{ReasonCode, Severity, StepStatus, TrustScore, Verdict, VerificationOutcomes, VerificationStep};

/// Shown in place of a verdict before a session has started
pub const NEUTRAL_VERDICT_MESSAGE: &str = "Proceed through the steps to calculate the Trust Score.";

/// Overall status line for the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self { text: text.into(), severity }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Info)
    }
}

/// Status of each scored step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatuses {
    pub gesture: StepStatus,
    pub latency: StepStatus,
    pub audio_fft: StepStatus,
    pub behavioral: StepStatus,
    pub knowledge: StepStatus,
}

impl StepStatuses {
    /// Status for `step`; `Idle` and `Complete` have none
    pub fn get(&self, step: VerificationStep) -> Option<StepStatus> {
        match step {
            VerificationStep::Gesture => Some(self.gesture),
            VerificationStep::Latency => Some(self.latency),
            VerificationStep::AudioFft => Some(self.audio_fft),
            VerificationStep::Behavioral => Some(self.behavioral),
            VerificationStep::Knowledge => Some(self.knowledge),
            VerificationStep::Idle | VerificationStep::Complete => None,
        }
    }

    /// Set status for `step`; ignored for `Idle` and `Complete`
    pub fn set(&mut self, step: VerificationStep, status: StepStatus) {
        let slot = match step {
            VerificationStep::Gesture => &mut self.gesture,
            VerificationStep::Latency => &mut self.latency,
            VerificationStep::AudioFft => &mut self.audio_fft,
            VerificationStep::Behavioral => &mut self.behavioral,
            VerificationStep::Knowledge => &mut self.knowledge,
            VerificationStep::Idle | VerificationStep::Complete => return,
        };
        *slot = status;
    }

    pub fn all_pending(&self) -> bool {
        VerificationStep::CHECKS
            .iter()
            .all(|s| self.get(*s) == Some(StepStatus::Pending))
    }
}

/// Snapshot of a session after each event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Current step
    pub step: VerificationStep,
    /// Per-step status
    pub statuses: StepStatuses,
    /// Trust percentage (0-100)
    pub percentage: u32,
    /// Verdict for `percentage`
    pub verdict: Verdict,
    /// Verdict text (neutral prompt while idle)
    pub verdict_message: String,
    pub verdict_severity: Severity,
    /// Overall status line
    pub status: StatusMessage,
    /// Reason for this output
    pub reason: ReasonCode,
    /// What the operator should do in the current step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    /// Challenge shown while the gesture step is active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gesture_prompt: Option<String>,
    /// Behavioral step will close once the quiet period elapses
    pub advance_pending: bool,
    /// Capture stream held
    pub media_active: bool,
    /// Raw outcomes
    pub outcomes: VerificationOutcomes,
}

impl SessionOutput {
    /// Create new output
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        step: VerificationStep,
        statuses: StepStatuses,
        trust: &TrustScore,
        status: StatusMessage,
        reason: ReasonCode,
        gesture_prompt: Option<String>,
        advance_pending: bool,
        media_active: bool,
        outcomes: VerificationOutcomes,
    ) -> Self {
        let instruction = step.instruction().map(str::to_string);
        let (verdict_message, verdict_severity) = if step == VerificationStep::Idle {
            (NEUTRAL_VERDICT_MESSAGE.to_string(), Severity::Info)
        } else {
            (trust.verdict.message().to_string(), trust.verdict.severity())
        };

        Self {
            timestamp: Utc::now(),
            step,
            statuses,
            percentage: trust.percentage,
            verdict: trust.verdict,
            verdict_message,
            verdict_severity,
            status,
            reason,
            instruction,
            gesture_prompt,
            advance_pending,
            media_active,
            outcomes,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.step.color_code();
        let reset = VerificationStep::color_reset();
        let verdict_color = self.verdict_severity.color_code();

        format!(
            "{}{} step={}{} | {}score={}% {}{} | {}",
            color,
            self.step.emoji(),
            self.step,
            reset,
            verdict_color,
            self.percentage,
            self.verdict,
            reset,
            self.reason.code(),
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "step={} | score={}% | verdict={} | reason={}",
            self.step,
            self.percentage,
            self.verdict,
            self.reason.code()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_output_shows_neutral_prompt() {
        let output = SessionOutput::new(
            VerificationStep::Idle,
            StepStatuses::default(),
            &TrustScore::zero(),
            StatusMessage::info("Ready"),
            ReasonCode::R001_SESSION_IDLE,
            None,
            false,
            false,
            VerificationOutcomes::new(),
        );
        assert_eq!(output.verdict_message, NEUTRAL_VERDICT_MESSAGE);
        assert_eq!(output.verdict_severity, Severity::Info);
        assert_eq!(
            output.to_parseable_string(),
            "step=IDLE | score=0% | verdict=HIGH_RISK | reason=R001_SESSION_IDLE"
        );
    }

    #[test]
    fn test_statuses_ignore_non_check_steps() {
        let mut statuses = StepStatuses::default();
        statuses.set(VerificationStep::Complete, StepStatus::Failed);
        assert!(statuses.all_pending());
        statuses.set(VerificationStep::Latency, StepStatus::InProgress);
        assert_eq!(statuses.get(VerificationStep::Latency), Some(StepStatus::InProgress));
        assert!(!statuses.all_pending());
    }
}
