//! Operator command parser for the interactive CLI
//!
//! One command per line, case insensitive:
//! `start`, `reset`, `gesture <ms>|done`, `gesture-fail`,
//! `latency match|mismatch`, `audio human|synthetic`,
//! `flag <urgency|avoiding|money-otp> on|off`,
//! `knowledge correct|wrong|avoided`, `status`, `help`, `quit`

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::types::{BehavioralFlag, KnowledgeResult, VerificationEvent};

lazy_static! {
    static ref RE_LIFECYCLE: Regex = Regex::new(r"(?i)^(start|reset|status|help|quit|exit)$").unwrap();
    static ref RE_GESTURE: Regex = Regex::new(r"(?i)^gesture\s+(\d+|done)$").unwrap();
    static ref RE_GESTURE_FAIL: Regex = Regex::new(r"(?i)^gesture[-_ ]fail$").unwrap();
    static ref RE_LATENCY: Regex = Regex::new(r"(?i)^latency\s+(match|mismatch)$").unwrap();
    static ref RE_AUDIO: Regex = Regex::new(r"(?i)^audio\s+(human|synthetic)$").unwrap();
    static ref RE_FLAG: Regex = Regex::new(r"(?i)^flag\s+([a-z_-]+)\s+(on|off)$").unwrap();
    static ref RE_KNOWLEDGE: Regex = Regex::new(r"(?i)^knowledge\s+(correct|wrong|avoided)$").unwrap();
}

/// Parsed operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Forward an event to the session
    Event(VerificationEvent),
    /// Gesture performed now, time it from the prompt
    CompleteGesture,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("unknown behavioral flag: {0}")]
    UnknownFlag(String),

    #[error("gesture duration out of range: {0}")]
    BadDuration(String),
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();

    if let Some(caps) = RE_LIFECYCLE.captures(line) {
        return Ok(match caps[1].to_ascii_lowercase().as_str() {
            "start" => Command::Event(VerificationEvent::Start),
            "reset" => Command::Event(VerificationEvent::Reset),
            "status" => Command::Status,
            "help" => Command::Help,
            _ => Command::Quit,
        });
    }

    if let Some(caps) = RE_GESTURE.captures(line) {
        let arg = &caps[1];
        if arg.eq_ignore_ascii_case("done") {
            return Ok(Command::CompleteGesture);
        }
        let duration_ms = arg
            .parse::<u64>()
            .map_err(|_| CommandError::BadDuration(arg.to_string()))?;
        return Ok(Command::Event(VerificationEvent::GesturePass { duration_ms }));
    }

    if RE_GESTURE_FAIL.is_match(line) {
        return Ok(Command::Event(VerificationEvent::GestureFail));
    }

    if let Some(caps) = RE_LATENCY.captures(line) {
        let matched = caps[1].eq_ignore_ascii_case("match");
        return Ok(Command::Event(VerificationEvent::LatencyDetect { matched }));
    }

    if let Some(caps) = RE_AUDIO.captures(line) {
        return Ok(Command::Event(if caps[1].eq_ignore_ascii_case("human") {
            VerificationEvent::AudioHuman
        } else {
            VerificationEvent::AudioSynthetic
        }));
    }

    if let Some(caps) = RE_FLAG.captures(line) {
        let flag = BehavioralFlag::parse(&caps[1])
            .ok_or_else(|| CommandError::UnknownFlag(caps[1].to_string()))?;
        let value = caps[2].eq_ignore_ascii_case("on");
        return Ok(Command::Event(VerificationEvent::BehavioralFlagChanged { flag, value }));
    }

    if let Some(caps) = RE_KNOWLEDGE.captures(line) {
        // regex only admits the three results
        if let Some(result) = KnowledgeResult::parse(&caps[1]) {
            return Ok(Command::Event(VerificationEvent::KnowledgeResult { result }));
        }
    }

    Err(CommandError::Unknown(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_commands() {
        assert_eq!(parse_command("start"), Ok(Command::Event(VerificationEvent::Start)));
        assert_eq!(parse_command("  RESET "), Ok(Command::Event(VerificationEvent::Reset)));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_gesture_commands() {
        assert_eq!(
            parse_command("gesture 500"),
            Ok(Command::Event(VerificationEvent::GesturePass { duration_ms: 500 }))
        );
        assert_eq!(parse_command("gesture done"), Ok(Command::CompleteGesture));
        assert_eq!(parse_command("gesture-fail"), Ok(Command::Event(VerificationEvent::GestureFail)));
        assert!(matches!(
            parse_command("gesture 99999999999999999999999"),
            Err(CommandError::BadDuration(_))
        ));
    }

    #[test]
    fn test_flag_commands() {
        assert_eq!(
            parse_command("flag money-otp on"),
            Ok(Command::Event(VerificationEvent::BehavioralFlagChanged {
                flag: BehavioralFlag::MoneyOtp,
                value: true,
            }))
        );
        assert_eq!(
            parse_command("flag shouting on"),
            Err(CommandError::UnknownFlag("shouting".to_string()))
        );
    }

    #[test]
    fn test_result_commands() {
        assert_eq!(
            parse_command("latency mismatch"),
            Ok(Command::Event(VerificationEvent::LatencyDetect { matched: false }))
        );
        assert_eq!(parse_command("audio synthetic"), Ok(Command::Event(VerificationEvent::AudioSynthetic)));
        assert_eq!(
            parse_command("knowledge avoided"),
            Ok(Command::Event(VerificationEvent::KnowledgeResult { result: KnowledgeResult::Avoided }))
        );
        assert!(matches!(parse_command("dance"), Err(CommandError::Unknown(_))));
    }
}
