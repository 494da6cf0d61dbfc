//! Trust Score Engine: folds step outcomes into a bounded percentage
//!
//! - gesture / latency / audio: weight counts toward max when reported,
//!   toward score when true (no partial credit)
//! - behavioral: deduction only, 12 raw points normalized onto 10
//! - knowledge: correct +10, wrong -5, avoided 0
//!
//! Score is floored at 0 and max at 1, so the percentage stays in 0..=100.

use crate::{
    WEIGHT_GESTURE, WEIGHT_LATENCY, WEIGHT_AUDIO, WEIGHT_BEHAVIORAL,
    WEIGHT_KNOWLEDGE, PENALTY_MAX_RAW,
};
use crate::types::{KnowledgeResult, TrustScore, Verdict, VerificationOutcomes};

/// Stateless trust score calculator
#[derive(Debug, Default, Clone, Copy)]
pub struct TrustScoreEngine;

impl TrustScoreEngine {
    /// Create new engine
    pub fn new() -> Self {
        Self
    }

    /// Compute score, percentage and verdict for `outcomes`
    pub fn calculate(&self, outcomes: &VerificationOutcomes) -> TrustScore {
        let mut score: f64 = 0.0;
        let mut max_possible: f64 = 0.0;

        for (reported, weight) in [
            (outcomes.gesture_passed, WEIGHT_GESTURE),
            (outcomes.latency_matched, WEIGHT_LATENCY),
            (outcomes.audio_human, WEIGHT_AUDIO),
        ] {
            if let Some(passed) = reported {
                max_possible += weight;
                if passed {
                    score += weight;
                }
            }
        }

        score -= self.behavioral_penalty(outcomes);

        if let Some(result) = outcomes.knowledge_result {
            max_possible += WEIGHT_KNOWLEDGE;
            match result {
                KnowledgeResult::Correct => score += WEIGHT_KNOWLEDGE,
                KnowledgeResult::Wrong => score -= WEIGHT_KNOWLEDGE / 2.0,
                KnowledgeResult::Avoided => {}
            }
        }

        let score = score.max(0.0);
        let max_possible = max_possible.max(1.0);
        let percentage = (100.0 * score / max_possible).round().clamp(0.0, 100.0) as u32;

        TrustScore {
            score,
            max_possible,
            percentage,
            verdict: Verdict::from_percentage(percentage),
        }
    }

    /// Points deducted for raised behavioral flags (0..=10)
    pub fn behavioral_penalty(&self, outcomes: &VerificationOutcomes) -> f64 {
        let raw = outcomes.behavioral_flags.raw_penalty() as f64;
        raw * WEIGHT_BEHAVIORAL / PENALTY_MAX_RAW as f64
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BehavioralFlag, BehavioralFlags};

    fn outcomes() -> VerificationOutcomes {
        VerificationOutcomes::new()
    }

    #[test]
    fn test_nothing_reported_is_zero() {
        let engine = TrustScoreEngine::new();
        let trust = engine.calculate(&outcomes());
        assert_eq!(trust.score, 0.0);
        assert_eq!(trust.max_possible, 1.0);
        assert_eq!(trust.percentage, 0);
        assert_eq!(trust.verdict, Verdict::HighRisk);
    }

    #[test]
    fn test_false_counts_only_toward_max() {
        let engine = TrustScoreEngine::new();
        let mut o = outcomes();
        o.latency_matched = Some(false);
        let trust = engine.calculate(&o);
        assert_eq!(trust.score, 0.0);
        assert_eq!(trust.max_possible, 20.0);

        o.latency_matched = Some(true);
        let trust = engine.calculate(&o);
        assert_eq!(trust.score, 20.0);
        assert_eq!(trust.max_possible, 20.0);
        assert_eq!(trust.percentage, 100);
    }

    #[test]
    fn test_full_penalty_is_ten_points() {
        let engine = TrustScoreEngine::new();
        let mut o = outcomes();
        o.behavioral_flags = BehavioralFlags { urgency: true, avoiding: true, money_otp: true };
        assert_eq!(engine.behavioral_penalty(&o), 10.0);
    }

    #[test]
    fn test_penalty_never_raises_score() {
        let engine = TrustScoreEngine::new();
        let mut base = outcomes();
        base.gesture_passed = Some(true);
        base.audio_human = Some(true);
        let clean = engine.calculate(&base).score;

        for mask in 0u8..8 {
            let mut o = base.clone();
            for (i, flag) in BehavioralFlag::ALL.iter().enumerate() {
                o.behavioral_flags.set(*flag, mask & (1 << i) != 0);
            }
            let trust = engine.calculate(&o);
            assert!(trust.score <= clean);
            assert!(clean - trust.score <= 10.0 + f64::EPSILON);
            assert_eq!(trust.max_possible, 60.0);
        }
    }

    #[test]
    fn test_penalty_alone_floors_at_zero() {
        let engine = TrustScoreEngine::new();
        let mut o = outcomes();
        o.behavioral_flags.money_otp = true;
        let trust = engine.calculate(&o);
        assert_eq!(trust.score, 0.0);
        assert_eq!(trust.percentage, 0);
    }

    #[test]
    fn test_knowledge_results() {
        let engine = TrustScoreEngine::new();
        let mut o = outcomes();
        o.gesture_passed = Some(true);

        o.knowledge_result = Some(KnowledgeResult::Correct);
        assert_eq!(engine.calculate(&o).score, 40.0);

        o.knowledge_result = Some(KnowledgeResult::Wrong);
        assert_eq!(engine.calculate(&o).score, 25.0);

        o.knowledge_result = Some(KnowledgeResult::Avoided);
        let trust = engine.calculate(&o);
        assert_eq!(trust.score, 30.0);
        assert_eq!(trust.max_possible, 40.0);
        assert_eq!(trust.percentage, 75);
    }

    #[test]
    fn test_calculate_is_idempotent() {
        let engine = TrustScoreEngine::new();
        let mut o = outcomes();
        o.gesture_passed = Some(false);
        o.behavioral_flags.urgency = true;
        assert_eq!(engine.calculate(&o), engine.calculate(&o));
    }
}
