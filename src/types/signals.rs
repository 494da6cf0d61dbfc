//! Per-step outcomes recorded during a verification session

use serde::{Deserialize, Serialize};
use crate::{PENALTY_URGENCY, PENALTY_AVOIDING, PENALTY_MONEY_OTP};

/// Behavioral red flags the operator can mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehavioralFlag {
    /// Caller pushes for urgency (weight: 3)
    Urgency,
    /// Caller avoids direct questions (weight: 4)
    Avoiding,
    /// Caller asks for money or an OTP (weight: 5)
    MoneyOtp,
}

impl BehavioralFlag {
    pub const ALL: [BehavioralFlag; 3] = [Self::Urgency, Self::Avoiding, Self::MoneyOtp];

    /// Raw penalty points
    pub fn penalty(&self) -> u32 {
        match self {
            Self::Urgency => PENALTY_URGENCY,
            Self::Avoiding => PENALTY_AVOIDING,
            Self::MoneyOtp => PENALTY_MONEY_OTP,
        }
    }

    /// Parse operator shorthand (`urgency`, `avoiding`, `money-otp`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "urgency" => Some(Self::Urgency),
            "avoiding" => Some(Self::Avoiding),
            "money-otp" | "moneyotp" | "otp" => Some(Self::MoneyOtp),
            _ => None,
        }
    }
}

impl std::fmt::Display for BehavioralFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Urgency => "urgency",
            Self::Avoiding => "avoiding",
            Self::MoneyOtp => "money-otp",
        };
        write!(f, "{}", name)
    }
}

/// Independent red-flag indicators, all false until marked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehavioralFlags {
    pub urgency: bool,
    pub avoiding: bool,
    pub money_otp: bool,
}

impl BehavioralFlags {
    pub fn get(&self, flag: BehavioralFlag) -> bool {
        match flag {
            BehavioralFlag::Urgency => self.urgency,
            BehavioralFlag::Avoiding => self.avoiding,
            BehavioralFlag::MoneyOtp => self.money_otp,
        }
    }

    pub fn set(&mut self, flag: BehavioralFlag, value: bool) {
        match flag {
            BehavioralFlag::Urgency => self.urgency = value,
            BehavioralFlag::Avoiding => self.avoiding = value,
            BehavioralFlag::MoneyOtp => self.money_otp = value,
        }
    }

    /// Sum of raw penalty points for raised flags (0..=12)
    pub fn raw_penalty(&self) -> u32 {
        BehavioralFlag::ALL
            .iter()
            .filter(|f| self.get(**f))
            .map(|f| f.penalty())
            .sum()
    }
}

/// Outcome of the personal-knowledge challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeResult {
    Correct,
    Wrong,
    Avoided,
}

impl KnowledgeResult {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "correct" => Some(Self::Correct),
            "wrong" => Some(Self::Wrong),
            "avoided" => Some(Self::Avoided),
            _ => None,
        }
    }
}

impl std::fmt::Display for KnowledgeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Correct => "correct",
            Self::Wrong => "wrong",
            Self::Avoided => "avoided",
        };
        write!(f, "{}", name)
    }
}

/// Everything recorded in one session.
///
/// `None` means the step has not reported yet, which is distinct from an
/// observed `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcomes {
    pub gesture_passed: Option<bool>,
    pub latency_matched: Option<bool>,
    pub audio_human: Option<bool>,
    pub behavioral_flags: BehavioralFlags,
    pub knowledge_result: Option<KnowledgeResult>,
}

impl VerificationOutcomes {
    /// Create empty outcomes
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
