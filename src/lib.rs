//! Liveguard: caller liveness verification
//!
//! Walks an operator through five scripted checks (gesture, latency, voice,
//! behavior, knowledge) and folds the outcomes into a bounded trust score.
//!
//! Event → VerificationSession → TrustScoreEngine → SessionOutput

pub mod core;
pub mod types;

// =============================================================================
// STEP WEIGHTS
// =============================================================================

/// Weight of the gesture challenge
pub const WEIGHT_GESTURE: f64 = 30.0;

/// Weight of the audio-latency correlation
pub const WEIGHT_LATENCY: f64 = 20.0;

/// Weight of the voice-authenticity check
pub const WEIGHT_AUDIO: f64 = 30.0;

/// Penalty pool for behavioral red flags (deduction only)
pub const WEIGHT_BEHAVIORAL: f64 = 10.0;

/// Weight of the knowledge challenge
pub const WEIGHT_KNOWLEDGE: f64 = 10.0;

// =============================================================================
// BEHAVIORAL PENALTIES - raw points, normalized onto WEIGHT_BEHAVIORAL
// =============================================================================

pub const PENALTY_URGENCY: u32 = 3;
pub const PENALTY_AVOIDING: u32 = 4;
pub const PENALTY_MONEY_OTP: u32 = 5;

/// Sum of all raw penalties
pub const PENALTY_MAX_RAW: u32 = 12;

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Fastest plausible human reaction to a gesture prompt (milliseconds)
pub const GESTURE_MIN_MS: u64 = 300;

/// Slowest accepted reaction to a gesture prompt (milliseconds)
pub const GESTURE_MAX_MS: u64 = 1200;

/// Quiet period after the last behavioral flag edit before advancing
pub const BEHAVIORAL_DEBOUNCE_MS: u64 = 1000;

/// Percentage at or above which the caller is trusted
pub const VERDICT_TRUSTED_MIN: u32 = 80;

/// Percentage at or above which the caller is human but unclear
pub const VERDICT_UNCLEAR_MIN: u32 = 50;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
