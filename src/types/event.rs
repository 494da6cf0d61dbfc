//! Inbound events forwarded by a host

use serde::{Deserialize, Serialize};
use crate::types::{BehavioralFlag, KnowledgeResult, VerificationStep};

/// Operator actions, one per UI control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerificationEvent {
    Start,
    Reset,
    GesturePass { duration_ms: u64 },
    GestureFail,
    LatencyDetect { matched: bool },
    AudioHuman,
    AudioSynthetic,
    BehavioralFlagChanged { flag: BehavioralFlag, value: bool },
    KnowledgeResult { result: KnowledgeResult },
}

impl VerificationEvent {
    /// Step in which this event is accepted. `None` for lifecycle events.
    pub fn expected_step(&self) -> Option<VerificationStep> {
        match self {
            Self::Start | Self::Reset => None,
            Self::GesturePass { .. } | Self::GestureFail => Some(VerificationStep::Gesture),
            Self::LatencyDetect { .. } => Some(VerificationStep::Latency),
            Self::AudioHuman | Self::AudioSynthetic => Some(VerificationStep::AudioFft),
            Self::BehavioralFlagChanged { .. } => Some(VerificationStep::Behavioral),
            Self::KnowledgeResult { .. } => Some(VerificationStep::Knowledge),
        }
    }

    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Reset => "reset",
            Self::GesturePass { .. } => "gesture_pass",
            Self::GestureFail => "gesture_fail",
            Self::LatencyDetect { .. } => "latency_detect",
            Self::AudioHuman => "audio_human",
            Self::AudioSynthetic => "audio_synthetic",
            Self::BehavioralFlagChanged { .. } => "behavioral_flag_changed",
            Self::KnowledgeResult { .. } => "knowledge_result",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event: VerificationEvent =
            serde_json::from_str(r#"{"type":"behavioral_flag_changed","flag":"money_otp","value":true}"#)
                .unwrap();
        assert_eq!(
            event,
            VerificationEvent::BehavioralFlagChanged { flag: BehavioralFlag::MoneyOtp, value: true }
        );

        let event: VerificationEvent =
            serde_json::from_str(r#"{"type":"knowledge_result","result":"wrong"}"#).unwrap();
        assert_eq!(event.expected_step(), Some(VerificationStep::Knowledge));
    }
}
