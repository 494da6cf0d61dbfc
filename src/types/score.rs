//! Trust score and verdict types

use serde::{Deserialize, Serialize};
use crate::{VERDICT_TRUSTED_MIN, VERDICT_UNCLEAR_MIN};

/// Message severity, shared by verdicts and status lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Self::Info => "\x1b[90m",    // Gray
            Self::Success => "\x1b[32m", // Green
            Self::Warning => "\x1b[33m", // Yellow
            Self::Error => "\x1b[31m",   // Red
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Categorical verdict derived from the trust percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// percentage >= 80
    Trusted,
    /// 50 <= percentage < 80
    Unclear,
    /// percentage < 50
    HighRisk,
}

impl Verdict {
    /// Map a percentage onto a verdict
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= VERDICT_TRUSTED_MIN {
            Self::Trusted
        } else if percentage >= VERDICT_UNCLEAR_MIN {
            Self::Unclear
        } else {
            Self::HighRisk
        }
    }

    /// Operator-facing message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Trusted => "Trusted Human: High confidence in caller's identity.",
            Self::Unclear => "Human Verified, Identity Unclear: Proceed with caution.",
            Self::HighRisk => {
                "Human Detected but High Fraud Behavior / Possibly Synthetic: Severe warning."
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Trusted => Severity::Success,
            Self::Unclear => Severity::Warning,
            Self::HighRisk => Severity::Error,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Trusted => "🟢",
            Self::Unclear => "🟡",
            Self::HighRisk => "🔴",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Trusted => "TRUSTED",
            Self::Unclear => "UNCLEAR",
            Self::HighRisk => "HIGH_RISK",
        };
        write!(f, "{}", name)
    }
}

/// Result of one trust score computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Accumulated points after penalties, floored at 0
    pub score: f64,
    /// Sum of weights of the steps that have reported, at least 1
    pub max_possible: f64,
    /// round(100 * score / max_possible), 0..=100
    pub percentage: u32,
    /// Verdict for `percentage`
    pub verdict: Verdict,
}

impl TrustScore {
    /// Score of a session where nothing has reported yet
    pub fn zero() -> Self {
        Self {
            score: 0.0,
            max_possible: 1.0,
            percentage: 0,
            verdict: Verdict::from_percentage(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(Verdict::from_percentage(100), Verdict::Trusted);
        assert_eq!(Verdict::from_percentage(80), Verdict::Trusted);
        assert_eq!(Verdict::from_percentage(79), Verdict::Unclear);
        assert_eq!(Verdict::from_percentage(50), Verdict::Unclear);
        assert_eq!(Verdict::from_percentage(49), Verdict::HighRisk);
        assert_eq!(Verdict::from_percentage(0), Verdict::HighRisk);
    }

    #[test]
    fn test_verdict_severity() {
        assert_eq!(Verdict::Trusted.severity(), Severity::Success);
        assert_eq!(Verdict::Unclear.severity(), Severity::Warning);
        assert_eq!(Verdict::HighRisk.severity(), Severity::Error);
    }
}
