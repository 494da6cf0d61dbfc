//! Verification Session: step state machine over one caller check
//!
//! Step order:
//! IDLE → GESTURE → LATENCY → AUDIO_FFT → BEHAVIORAL → KNOWLEDGE → COMPLETE
//!
//! - Every recording advances exactly one step, pass or fail.
//! - Behavioral flag edits never advance directly; the step closes once
//!   the debounce window passes without another edit.
//! - Events for any other step are rejected and leave state untouched.
//! - The trust score is recomputed synchronously after every write.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::{BEHAVIORAL_DEBOUNCE_MS, GESTURE_MAX_MS, GESTURE_MIN_MS};
use crate::core::debounce::Debouncer;
use crate::core::media::{MediaCapture, SimulatedCapture, StreamHandle};
use crate::core::trust::TrustScoreEngine;
use crate::types::{
    BehavioralFlag, KnowledgeResult, ReasonCode, SessionError, SessionOutput, Severity,
    StatusMessage, StepStatus, StepStatuses, TrustScore, VerificationEvent,
    VerificationOutcomes, VerificationStep,
};

/// Challenges shown during the gesture step
pub const GESTURE_PROMPTS: [&str; 3] = ["Show 2 fingers", "Turn your head left", "Blink twice"];

/// Per-session tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Quiet period after the last behavioral edit
    pub debounce: Duration,
    /// Fastest accepted gesture response (ms, inclusive)
    pub gesture_min_ms: u64,
    /// Slowest accepted gesture response (ms, inclusive)
    pub gesture_max_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(BEHAVIORAL_DEBOUNCE_MS),
            gesture_min_ms: GESTURE_MIN_MS,
            gesture_max_ms: GESTURE_MAX_MS,
        }
    }
}

impl SessionConfig {
    /// Is `duration_ms` inside the human reaction window?
    pub fn gesture_in_window(&self, duration_ms: u64) -> bool {
        (self.gesture_min_ms..=self.gesture_max_ms).contains(&duration_ms)
    }
}

/// One verification session
#[derive(Debug)]
pub struct VerificationSession {
    config: SessionConfig,
    engine: TrustScoreEngine,
    /// Current step
    step: VerificationStep,
    outcomes: VerificationOutcomes,
    statuses: StepStatuses,
    /// Score after the last write
    trust: TrustScore,
    status: StatusMessage,
    reason: ReasonCode,
    debouncer: Debouncer,
    capture: Box<dyn MediaCapture>,
    stream: Option<StreamHandle>,
    gesture_index: usize,
    /// When the gesture prompt was shown
    gesture_started: Option<Instant>,
    /// Number of accepted events
    event_count: u64,
}

impl Default for VerificationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationSession {
    /// Create an idle session with default config and simulated capture
    pub fn new() -> Self {
        Self::with_capture(SessionConfig::default(), Box::new(SimulatedCapture::granted()))
    }

    /// Create an idle session with `config` and simulated capture
    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_capture(config, Box::new(SimulatedCapture::granted()))
    }

    /// Create an idle session backed by `capture`
    pub fn with_capture(config: SessionConfig, capture: Box<dyn MediaCapture>) -> Self {
        let debouncer = Debouncer::new(config.debounce);
        Self {
            config,
            engine: TrustScoreEngine::new(),
            step: VerificationStep::Idle,
            outcomes: VerificationOutcomes::new(),
            statuses: StepStatuses::default(),
            trust: TrustScore::zero(),
            status: StatusMessage::info("Ready to start a new verification."),
            reason: ReasonCode::R001_SESSION_IDLE,
            debouncer,
            capture,
            stream: None,
            gesture_index: 0,
            gesture_started: None,
            event_count: 0,
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Acquire media and enter the gesture step
    pub fn start(&mut self) -> Result<SessionOutput, SessionError> {
        self.start_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) -> Result<SessionOutput, SessionError> {
        if self.step != VerificationStep::Idle {
            warn!(step = %self.step, "start rejected, session already running");
            return Err(SessionError::AlreadyStarted(self.step));
        }

        match self.capture.acquire() {
            Ok(handle) => {
                self.stream = Some(handle);
                info!(stream = handle.0, "verification started");
                self.event_count += 1;
                self.status = StatusMessage::new(
                    "Camera and microphone successfully activated.",
                    Severity::Success,
                );
                self.advance(now);
                self.reason = ReasonCode::R001_SESSION_STARTED;
                Ok(self.output())
            }
            Err(err) => {
                warn!(error = %err, "media access failed, staying idle");
                self.status = StatusMessage::new(
                    format!("Failed to access camera/mic: {}", err),
                    Severity::Error,
                );
                self.reason = ReasonCode::R001_MEDIA_UNAVAILABLE;
                Err(SessionError::MediaAccess(err))
            }
        }
    }

    /// Return to idle, cancel any pending advance and release media
    pub fn reset(&mut self) -> SessionOutput {
        self.debouncer.cancel();
        if let Some(handle) = self.stream.take() {
            self.capture.release(handle);
        }
        self.step = VerificationStep::Idle;
        self.outcomes = VerificationOutcomes::new();
        self.statuses = StepStatuses::default();
        self.gesture_index = 0;
        self.gesture_started = None;
        self.event_count = 0;
        self.recompute();
        self.status = StatusMessage::info("Ready to start a new verification.");
        self.reason = ReasonCode::R001_SESSION_RESET;
        info!("verification reset");
        self.output()
    }

    // =========================================================================
    // RECORDING
    // =========================================================================

    /// Classify a gesture by response time; passes inside the reaction window
    pub fn record_gesture_result(&mut self, duration_ms: u64) -> Result<SessionOutput, SessionError> {
        self.record_gesture_result_at(duration_ms, Instant::now())
    }

    pub fn record_gesture_result_at(
        &mut self,
        duration_ms: u64,
        now: Instant,
    ) -> Result<SessionOutput, SessionError> {
        self.guard(VerificationEvent::GesturePass { duration_ms })?;

        let passed = self.config.gesture_in_window(duration_ms);
        debug!(duration_ms, passed, "gesture timed");
        self.outcomes.gesture_passed = Some(passed);

        if passed {
            self.finish_step(
                now,
                StepStatus::Completed,
                StatusMessage::new(
                    "Gesture challenge passed! Proceeding to Latency Check.",
                    Severity::Success,
                ),
                ReasonCode::R002_GESTURE_PASSED,
            )
        } else {
            self.finish_step(
                now,
                StepStatus::Failed,
                StatusMessage::new(
                    format!(
                        "Gesture challenge failed (response time: {}ms). Too slow or too fast.",
                        duration_ms
                    ),
                    Severity::Warning,
                ),
                ReasonCode::R002_GESTURE_TIMING_FAILED,
            )
        }
    }

    /// Time the gesture from when its prompt was shown
    pub fn complete_gesture(&mut self) -> Result<SessionOutput, SessionError> {
        self.complete_gesture_at(Instant::now())
    }

    pub fn complete_gesture_at(&mut self, now: Instant) -> Result<SessionOutput, SessionError> {
        let elapsed = self
            .gesture_started
            .map(|s| now.saturating_duration_since(s).as_millis() as u64)
            .unwrap_or(0);
        self.record_gesture_result_at(elapsed, now)
    }

    /// Operator-forced gesture failure, no timing involved
    pub fn record_gesture_failure(&mut self) -> Result<SessionOutput, SessionError> {
        self.record_gesture_failure_at(Instant::now())
    }

    pub fn record_gesture_failure_at(&mut self, now: Instant) -> Result<SessionOutput, SessionError> {
        self.guard(VerificationEvent::GestureFail)?;
        self.outcomes.gesture_passed = Some(false);
        self.finish_step(
            now,
            StepStatus::Failed,
            StatusMessage::new("Gesture challenge failed as simulated. Proceeding.", Severity::Warning),
            ReasonCode::R002_GESTURE_FORCED_FAILURE,
        )
    }

    pub fn record_latency_result(&mut self, matched: bool) -> Result<SessionOutput, SessionError> {
        self.record_latency_result_at(matched, Instant::now())
    }

    pub fn record_latency_result_at(
        &mut self,
        matched: bool,
        now: Instant,
    ) -> Result<SessionOutput, SessionError> {
        self.guard(VerificationEvent::LatencyDetect { matched })?;
        self.outcomes.latency_matched = Some(matched);

        if matched {
            self.finish_step(
                now,
                StepStatus::Completed,
                StatusMessage::new("Latency check matched! Good sign.", Severity::Success),
                ReasonCode::R002_LATENCY_MATCHED,
            )
        } else {
            self.finish_step(
                now,
                StepStatus::Failed,
                StatusMessage::new(
                    "Latency check mismatched. Potential AI or replay detected.",
                    Severity::Warning,
                ),
                ReasonCode::R002_LATENCY_MISMATCHED,
            )
        }
    }

    pub fn record_audio_result(&mut self, is_human: bool) -> Result<SessionOutput, SessionError> {
        self.record_audio_result_at(is_human, Instant::now())
    }

    pub fn record_audio_result_at(
        &mut self,
        is_human: bool,
        now: Instant,
    ) -> Result<SessionOutput, SessionError> {
        let event = if is_human {
            VerificationEvent::AudioHuman
        } else {
            VerificationEvent::AudioSynthetic
        };
        self.guard(event)?;
        self.outcomes.audio_human = Some(is_human);

        if is_human {
            self.finish_step(
                now,
                StepStatus::Completed,
                StatusMessage::new("Audio analysis indicates a likely human voice.", Severity::Success),
                ReasonCode::R002_AUDIO_HUMAN,
            )
        } else {
            self.finish_step(
                now,
                StepStatus::Failed,
                StatusMessage::new(
                    "Audio analysis suggests a possibly synthetic voice. High alert!",
                    Severity::Error,
                ),
                ReasonCode::R002_AUDIO_SYNTHETIC,
            )
        }
    }

    /// Set one behavioral flag. Rescores now, advances after the quiet period.
    pub fn set_behavioral_flag(
        &mut self,
        flag: BehavioralFlag,
        value: bool,
    ) -> Result<SessionOutput, SessionError> {
        self.set_behavioral_flag_at(flag, value, Instant::now())
    }

    pub fn set_behavioral_flag_at(
        &mut self,
        flag: BehavioralFlag,
        value: bool,
        now: Instant,
    ) -> Result<SessionOutput, SessionError> {
        self.guard(VerificationEvent::BehavioralFlagChanged { flag, value })?;
        self.event_count += 1;

        self.outcomes.behavioral_flags.set(flag, value);
        self.statuses.set(VerificationStep::Behavioral, StepStatus::Completed);
        self.recompute();
        self.debouncer.arm(now);
        debug!(
            %flag,
            value,
            window_ms = self.debouncer.window().as_millis() as u64,
            "behavioral flag set, advance re-armed"
        );

        self.status = StatusMessage::info("Behavioral flags updated.");
        self.reason = ReasonCode::R003_FLAGS_UPDATED;
        Ok(self.output())
    }

    pub fn record_knowledge_result(
        &mut self,
        result: KnowledgeResult,
    ) -> Result<SessionOutput, SessionError> {
        self.record_knowledge_result_at(result, Instant::now())
    }

    pub fn record_knowledge_result_at(
        &mut self,
        result: KnowledgeResult,
        now: Instant,
    ) -> Result<SessionOutput, SessionError> {
        self.guard(VerificationEvent::KnowledgeResult { result })?;
        self.outcomes.knowledge_result = Some(result);
        self.finish_step(
            now,
            StepStatus::Completed,
            StatusMessage::info(format!("Knowledge challenge result: {}.", result)),
            ReasonCode::R002_KNOWLEDGE_RECORDED,
        )
    }

    // =========================================================================
    // TIMER + DISPATCH
    // =========================================================================

    /// Close the behavioral step if its quiet period has passed
    pub fn tick(&mut self) -> Option<SessionOutput> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Option<SessionOutput> {
        if self.step != VerificationStep::Behavioral || !self.debouncer.poll(now) {
            return None;
        }
        debug!("behavioral quiet period elapsed");
        self.advance(now);
        self.reason = ReasonCode::R003_DEBOUNCE_ELAPSED;
        Some(self.output())
    }

    /// Dispatch a host event
    pub fn apply(&mut self, event: VerificationEvent) -> Result<SessionOutput, SessionError> {
        self.apply_at(event, Instant::now())
    }

    pub fn apply_at(
        &mut self,
        event: VerificationEvent,
        now: Instant,
    ) -> Result<SessionOutput, SessionError> {
        match event {
            VerificationEvent::Start => self.start_at(now),
            VerificationEvent::Reset => Ok(self.reset()),
            VerificationEvent::GesturePass { duration_ms } => {
                self.record_gesture_result_at(duration_ms, now)
            }
            VerificationEvent::GestureFail => self.record_gesture_failure_at(now),
            VerificationEvent::LatencyDetect { matched } => self.record_latency_result_at(matched, now),
            VerificationEvent::AudioHuman => self.record_audio_result_at(true, now),
            VerificationEvent::AudioSynthetic => self.record_audio_result_at(false, now),
            VerificationEvent::BehavioralFlagChanged { flag, value } => {
                self.set_behavioral_flag_at(flag, value, now)
            }
            VerificationEvent::KnowledgeResult { result } => {
                self.record_knowledge_result_at(result, now)
            }
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Get current step
    pub fn step(&self) -> VerificationStep {
        self.step
    }

    pub fn outcomes(&self) -> &VerificationOutcomes {
        &self.outcomes
    }

    /// Score after the last write
    pub fn trust(&self) -> TrustScore {
        self.trust
    }

    pub fn statuses(&self) -> StepStatuses {
        self.statuses
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    /// Is a debounced behavioral advance waiting?
    pub fn advance_pending(&self) -> bool {
        self.debouncer.is_armed()
    }

    /// When the pending behavioral advance fires
    pub fn advance_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn media_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Streams the capture collaborator still holds open
    pub fn open_streams(&self) -> usize {
        self.capture.active_streams()
    }

    /// Current gesture challenge, while the gesture step is active
    pub fn gesture_prompt(&self) -> Option<&'static str> {
        (self.step == VerificationStep::Gesture)
            .then(|| GESTURE_PROMPTS[self.gesture_index % GESTURE_PROMPTS.len()])
    }

    /// Get accepted event count since the last reset
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn is_complete(&self) -> bool {
        self.step == VerificationStep::Complete
    }

    /// Get current output without updating
    pub fn output(&self) -> SessionOutput {
        SessionOutput::new(
            self.step,
            self.statuses,
            &self.trust,
            self.status.clone(),
            self.reason,
            self.gesture_prompt().map(str::to_string),
            self.advance_pending(),
            self.media_active(),
            self.outcomes.clone(),
        )
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Reject events that belong to another step
    fn guard(&self, event: VerificationEvent) -> Result<(), SessionError> {
        if event.expected_step() == Some(self.step) {
            Ok(())
        } else {
            warn!(event = event.name(), step = %self.step, "event rejected for current step");
            Err(SessionError::InvalidEvent { event: event.name(), step: self.step })
        }
    }

    /// Mark the current step, set the status line, then advance
    fn finish_step(
        &mut self,
        now: Instant,
        step_status: StepStatus,
        message: StatusMessage,
        reason: ReasonCode,
    ) -> Result<SessionOutput, SessionError> {
        self.event_count += 1;
        self.statuses.set(self.step, step_status);
        self.status = message;
        self.advance(now);
        self.reason = reason;
        Ok(self.output())
    }

    /// Move to the next step regardless of the recorded outcome
    fn advance(&mut self, now: Instant) {
        let from = self.step;
        self.step = from.next();
        self.statuses.set(self.step, StepStatus::InProgress);
        self.recompute();

        match self.step {
            VerificationStep::Gesture => self.gesture_started = Some(now),
            VerificationStep::Complete => info!(
                percentage = self.trust.percentage,
                verdict = %self.trust.verdict,
                "verification complete"
            ),
            _ => {}
        }

        debug!(%from, to = %self.step, "step advanced");
    }

    fn recompute(&mut self) {
        self.trust = self.engine.calculate(&self.outcomes);
        debug!(
            score = self.trust.score,
            max_possible = self.trust.max_possible,
            percentage = self.trust.percentage,
            "trust score recomputed"
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================
