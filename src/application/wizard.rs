//! The intake wizard state machine.
//!
//! A wizard starts in [`Phase::Resolving`], settles into one of the blocked
//! phases or [`Phase::InProgress`] after a single existence check, and ends
//! in a terminal phase after submission. Transitions only move forward;
//! once a terminal phase is reached every further input is ignored.
//!
//! The wizard never performs I/O itself. Operations that need the backend
//! hand back a [`Command`]; the caller executes it and feeds the outcome
//! back through [`Wizard::apply_check`] or [`Wizard::apply_submit`].

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::api::ApiError;
use crate::domain::{
    resolve_token, text_len, Answers, AnswerKey, CheckResponse, Step, SubmitRequest,
    REASON_MAX_CHARS, REASON_MIN_CHARS,
};

/// Pause between picking an option and moving to the next step.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(250);

/// Top-level wizard state; decides which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the existence check.
    Resolving,
    /// The link carried no token.
    BlockedNoToken,
    /// A check or submission failed.
    BlockedError,
    /// The token already had a submission when the wizard loaded.
    AlreadySubmitted,
    /// Answering questions.
    InProgress,
    /// This session's submission was accepted.
    JustSubmitted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::BlockedNoToken
                | Phase::BlockedError
                | Phase::AlreadySubmitted
                | Phase::JustSubmitted
        )
    }
}

/// Why the wizard ended up in [`Phase::BlockedError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardFault {
    /// Transport or decoding failure on either call.
    Unreachable(String),
    /// The submit call found an existing record for the token.
    Duplicate,
    /// The server refused the submission.
    Rejected { status: u16, message: String },
}

impl From<ApiError> for WizardFault {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(msg) | ApiError::Decode(msg) => WizardFault::Unreachable(msg),
            ApiError::Duplicate => WizardFault::Duplicate,
            ApiError::Rejected { status, message } => WizardFault::Rejected { status, message },
        }
    }
}

/// Backend work requested by the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check { token: String },
    Submit(SubmitRequest),
}

/// A forward transition waiting for its delay to pass.
///
/// Only fires while the wizard is still on `from`; replacing or cancelling
/// it is how stale advances are avoided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub due: Instant,
    pub from: Step,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    token: Option<String>,
    phase: Phase,
    step: Step,
    draft: Answers,
    is_submitting: bool,
    pending_advance: Option<ScheduledAdvance>,
    advance_delay: Duration,
    fault: Option<WizardFault>,
    submitted_at: Option<DateTime<Utc>>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(DEFAULT_ADVANCE_DELAY)
    }
}

impl Wizard {
    pub fn new(advance_delay: Duration) -> Self {
        Self {
            token: None,
            phase: Phase::Resolving,
            step: Step::Income,
            draft: Answers::default(),
            is_submitting: false,
            pending_advance: None,
            advance_delay,
            fault: None,
            submitted_at: None,
        }
    }

    /// Resolves the token from `link` and asks for the existence check.
    ///
    /// Without a token the wizard goes straight to [`Phase::BlockedNoToken`]
    /// and no command is issued. Only the first call has any effect.
    pub fn resolve(&mut self, link: Option<&str>) -> Option<Command> {
        if self.phase != Phase::Resolving || self.token.is_some() {
            return None;
        }

        match link.and_then(resolve_token) {
            Some(token) => {
                debug!(token = %token, "token resolved, checking");
                self.token = Some(token.clone());
                Some(Command::Check { token })
            }
            None => {
                info!("no token in link");
                self.phase = Phase::BlockedNoToken;
                None
            }
        }
    }

    /// Applies the outcome of the existence check.
    pub fn apply_check(&mut self, result: Result<CheckResponse, ApiError>) {
        if self.phase != Phase::Resolving || self.token.is_none() {
            return;
        }

        match result {
            Ok(response) if response.exists => {
                self.submitted_at = response.submitted_at;
                self.phase = Phase::AlreadySubmitted;
            }
            Ok(_) => {
                self.step = Step::Income;
                self.phase = Phase::InProgress;
            }
            Err(err) => {
                warn!(error = %err, "existence check failed");
                self.fail(err);
            }
        }
        debug!(phase = ?self.phase, "check applied");
    }

    /// Records the option at `index` for the current choice step and
    /// schedules the move to the next step.
    ///
    /// Picking again before the delay elapses replaces the pending advance,
    /// so the wizard still moves exactly one step.
    pub fn select_option(&mut self, index: usize, now: Instant) -> bool {
        let Some(step) = self.current_step() else {
            return false;
        };
        if !step.auto_advances() || self.is_submitting {
            return false;
        }
        let Some(option) = step.question().options.get(index) else {
            return false;
        };

        self.draft.set(step.answer_key(), option.value);
        self.pending_advance = Some(ScheduledAdvance {
            due: now + self.advance_delay,
            from: step,
        });
        self.tick(now);
        true
    }

    /// Fires the scheduled advance once it is due. Returns whether the
    /// step changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending_advance else {
            return false;
        };
        if pending.due > now {
            return false;
        }
        self.pending_advance = None;

        if self.phase != Phase::InProgress || self.step != pending.from {
            return false;
        }
        match pending.from.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    /// Moves one step back, cancelling any pending advance.
    pub fn go_back(&mut self) -> bool {
        if self.phase != Phase::InProgress || self.is_submitting {
            return false;
        }
        let Some(previous) = self.step.previous() else {
            return false;
        };
        self.pending_advance = None;
        self.step = previous;
        true
    }

    /// Appends to the free-text reason, up to the character cap.
    pub fn type_char(&mut self, c: char) -> bool {
        if !self.editing_reason() || text_len(&self.draft.reason_text) >= REASON_MAX_CHARS {
            return false;
        }
        self.draft.reason_text.push(c);
        true
    }

    pub fn erase_char(&mut self) -> bool {
        if !self.editing_reason() {
            return false;
        }
        self.draft.reason_text.pop().is_some()
    }

    /// Replaces the reason text, truncated to the character cap.
    pub fn set_reason(&mut self, text: &str) -> bool {
        if !self.editing_reason() {
            return false;
        }
        self.draft.reason_text = text.chars().take(REASON_MAX_CHARS).collect();
        true
    }

    fn editing_reason(&self) -> bool {
        self.current_step() == Some(Step::Reason) && !self.is_submitting
    }

    pub fn can_submit(&self) -> bool {
        self.current_step() == Some(Step::Reason)
            && !self.is_submitting
            && text_len(&self.draft.reason_text) >= REASON_MIN_CHARS
    }

    /// Starts the submission if allowed. While it is outstanding further
    /// submit attempts return `None`.
    pub fn begin_submit(&mut self) -> Option<Command> {
        if !self.can_submit() {
            return None;
        }
        let token = self.token.clone()?;
        self.is_submitting = true;
        Some(Command::Submit(SubmitRequest {
            token: Some(token),
            answers: self.draft.clone(),
        }))
    }

    /// Applies the outcome of the submit call.
    pub fn apply_submit(&mut self, result: Result<(), ApiError>) {
        if self.phase != Phase::InProgress || !self.is_submitting {
            return;
        }
        self.is_submitting = false;

        match result {
            Ok(()) => {
                info!("submission accepted");
                self.phase = Phase::JustSubmitted;
            }
            Err(err) => {
                warn!(error = %err, "submission failed");
                self.fail(err);
            }
        }
    }

    fn fail(&mut self, err: ApiError) {
        self.pending_advance = None;
        self.fault = Some(err.into());
        self.phase = Phase::BlockedError;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The step being shown; only meaningful while in progress.
    pub fn current_step(&self) -> Option<Step> {
        (self.phase == Phase::InProgress).then_some(self.step)
    }

    pub fn answers(&self) -> &Answers {
        &self.draft
    }

    pub fn answer(&self, key: AnswerKey) -> &str {
        self.draft.get(key)
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn pending_advance(&self) -> Option<ScheduledAdvance> {
        self.pending_advance
    }

    pub fn fault(&self) -> Option<&WizardFault> {
        self.fault.as_ref()
    }

    /// Timestamp reported by the check when the token was already used.
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn reason_len(&self) -> usize {
        text_len(&self.draft.reason_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "https://form.example/?uuid=abc123";

    fn option_index(step: Step, value: &str) -> usize {
        step.question()
            .options
            .iter()
            .position(|o| o.value == value)
            .unwrap()
    }

    fn in_progress() -> Wizard {
        let mut wizard = Wizard::default();
        wizard.resolve(Some(LINK));
        wizard.apply_check(Ok(CheckResponse {
            exists: false,
            submitted_at: None,
        }));
        wizard
    }

    fn at_reason_step() -> Wizard {
        let mut wizard = Wizard::new(Duration::ZERO);
        wizard.resolve(Some(LINK));
        wizard.apply_check(Ok(CheckResponse {
            exists: false,
            submitted_at: None,
        }));
        let now = Instant::now();
        for _ in 0..3 {
            assert!(wizard.select_option(0, now));
        }
        assert_eq!(wizard.current_step(), Some(Step::Reason));
        wizard
    }

    #[test]
    fn test_starts_resolving() {
        let wizard = Wizard::default();
        assert_eq!(wizard.phase(), Phase::Resolving);
        assert!(wizard.current_step().is_none());
        assert!(!wizard.phase().is_terminal());
    }

    #[test]
    fn test_no_token_blocks_without_check() {
        let mut wizard = Wizard::default();
        assert!(wizard.resolve(Some("https://form.example/")).is_none());
        assert_eq!(wizard.phase(), Phase::BlockedNoToken);

        // A late check result cannot revive the session.
        wizard.apply_check(Ok(CheckResponse {
            exists: false,
            submitted_at: None,
        }));
        assert_eq!(wizard.phase(), Phase::BlockedNoToken);

        let mut without_link = Wizard::default();
        assert!(without_link.resolve(None).is_none());
        assert_eq!(without_link.phase(), Phase::BlockedNoToken);
    }

    #[test]
    fn test_resolve_issues_check_once() {
        let mut wizard = Wizard::default();
        assert_eq!(
            wizard.resolve(Some(LINK)),
            Some(Command::Check {
                token: "abc123".to_string()
            })
        );
        assert_eq!(wizard.token(), Some("abc123"));
        assert!(wizard.resolve(Some(LINK)).is_none());
    }

    #[test]
    fn test_check_found_is_already_submitted() {
        let mut wizard = Wizard::default();
        wizard.resolve(Some(LINK));
        let when = Utc::now();
        wizard.apply_check(Ok(CheckResponse {
            exists: true,
            submitted_at: Some(when),
        }));
        assert_eq!(wizard.phase(), Phase::AlreadySubmitted);
        assert_eq!(wizard.submitted_at(), Some(when));
        assert!(wizard.phase().is_terminal());
    }

    #[test]
    fn test_check_not_found_starts_at_step_one() {
        let wizard = in_progress();
        assert_eq!(wizard.phase(), Phase::InProgress);
        assert_eq!(wizard.current_step(), Some(Step::Income));
    }

    #[test]
    fn test_check_failure_blocks_with_error() {
        let mut wizard = Wizard::default();
        wizard.resolve(Some(LINK));
        wizard.apply_check(Err(ApiError::Transport("connection refused".to_string())));
        assert_eq!(wizard.phase(), Phase::BlockedError);
        assert!(matches!(wizard.fault(), Some(WizardFault::Unreachable(_))));
    }

    #[test]
    fn test_selection_advances_after_delay() {
        let mut wizard = in_progress();
        let start = Instant::now();
        let index = option_index(Step::Income, "2.500 € – 4.000 €");

        assert!(wizard.select_option(index, start));
        assert_eq!(wizard.answer(AnswerKey::IncomeBracket), "2.500 € – 4.000 €");
        assert_eq!(wizard.current_step(), Some(Step::Income));

        assert!(!wizard.tick(start + Duration::from_millis(100)));
        assert_eq!(wizard.current_step(), Some(Step::Income));

        assert!(wizard.tick(start + DEFAULT_ADVANCE_DELAY));
        assert_eq!(wizard.current_step(), Some(Step::Financing));
        assert!(wizard.pending_advance().is_none());
    }

    #[test]
    fn test_reselect_before_delay_moves_exactly_one_step() {
        let mut wizard = in_progress();
        let start = Instant::now();
        wizard.select_option(0, start);
        wizard.select_option(1, start + Duration::from_millis(100));

        assert!(wizard.tick(start + Duration::from_secs(1)));
        assert!(!wizard.tick(start + Duration::from_secs(2)));
        assert_eq!(wizard.current_step(), Some(Step::Financing));
        assert_eq!(wizard.answer(AnswerKey::IncomeBracket), "2.500 € – 4.000 €");
    }

    #[test]
    fn test_back_cancels_pending_advance() {
        let mut wizard = Wizard::new(Duration::ZERO);
        wizard.resolve(Some(LINK));
        wizard.apply_check(Ok(CheckResponse {
            exists: false,
            submitted_at: None,
        }));
        let start = Instant::now();
        wizard.select_option(0, start);
        assert_eq!(wizard.current_step(), Some(Step::Financing));

        let mut slow = wizard.clone();
        slow.advance_delay = DEFAULT_ADVANCE_DELAY;
        slow.select_option(0, start);
        assert!(slow.go_back());
        assert_eq!(slow.current_step(), Some(Step::Income));
        assert!(slow.pending_advance().is_none());
        assert!(!slow.tick(start + Duration::from_secs(1)));
        assert_eq!(slow.current_step(), Some(Step::Income));
    }

    #[test]
    fn test_back_stops_at_step_one() {
        let mut wizard = in_progress();
        assert!(!wizard.go_back());
        assert_eq!(wizard.current_step(), Some(Step::Income));
        assert_eq!(wizard.phase(), Phase::InProgress);
    }

    #[test]
    fn test_back_keeps_answers() {
        let mut wizard = at_reason_step();
        wizard.set_reason("abc");
        assert!(wizard.go_back());
        assert_eq!(wizard.current_step(), Some(Step::Credit));
        assert_eq!(wizard.answer(AnswerKey::ReasonText), "abc");
        assert_eq!(wizard.answer(AnswerKey::CreditStatus), "Sauber");
    }

    #[test]
    fn test_reason_step_never_auto_advances() {
        let mut wizard = at_reason_step();
        assert!(!wizard.select_option(0, Instant::now()));
        wizard.set_reason("Suche eine Wohnung");
        assert!(!wizard.tick(Instant::now() + Duration::from_secs(10)));
        assert_eq!(wizard.current_step(), Some(Step::Reason));
    }

    #[test]
    fn test_invalid_option_index_is_ignored() {
        let mut wizard = in_progress();
        assert!(!wizard.select_option(99, Instant::now()));
        assert!(wizard.pending_advance().is_none());
    }

    #[test]
    fn test_submit_gated_on_reason_length() {
        let mut wizard = at_reason_step();
        assert!(!wizard.can_submit());
        assert!(wizard.begin_submit().is_none());

        wizard.type_char('a');
        wizard.type_char('b');
        assert!(!wizard.can_submit());
        wizard.type_char('c');
        assert!(wizard.can_submit());

        wizard.erase_char();
        assert!(!wizard.can_submit());
    }

    #[test]
    fn test_reason_length_counts_characters() {
        let mut wizard = at_reason_step();
        wizard.set_reason("äöü");
        assert_eq!(wizard.reason_len(), 3);
        assert!(wizard.can_submit());
    }

    #[test]
    fn test_reason_capped_at_limit() {
        let mut wizard = at_reason_step();
        wizard.set_reason(&"x".repeat(REASON_MAX_CHARS + 20));
        assert_eq!(wizard.reason_len(), REASON_MAX_CHARS);
        assert!(!wizard.type_char('y'));
        assert_eq!(wizard.reason_len(), REASON_MAX_CHARS);
    }

    #[test]
    fn test_submit_blocks_duplicate_calls() {
        let mut wizard = at_reason_step();
        wizard.set_reason("Suche ab 01.08. eine Wohnung");

        let command = wizard.begin_submit().unwrap();
        match command {
            Command::Submit(request) => {
                assert_eq!(request.token.as_deref(), Some("abc123"));
                assert_eq!(request.answers.reason_text, "Suche ab 01.08. eine Wohnung");
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(wizard.is_submitting());
        assert!(!wizard.can_submit());
        assert!(wizard.begin_submit().is_none());
        assert!(!wizard.go_back());
        assert!(!wizard.type_char('x'));
    }

    #[test]
    fn test_submit_success_is_terminal() {
        let mut wizard = at_reason_step();
        wizard.set_reason("abc");
        wizard.begin_submit();
        wizard.apply_submit(Ok(()));

        assert_eq!(wizard.phase(), Phase::JustSubmitted);
        assert!(!wizard.is_submitting());
        assert!(wizard.current_step().is_none());
        assert!(!wizard.go_back());
        assert!(!wizard.set_reason("changed"));
        assert!(wizard.begin_submit().is_none());
    }

    #[test]
    fn test_submit_duplicate_is_error() {
        let mut wizard = at_reason_step();
        wizard.set_reason("abc");
        wizard.begin_submit();
        wizard.apply_submit(Err(ApiError::Duplicate));

        assert_eq!(wizard.phase(), Phase::BlockedError);
        assert_eq!(wizard.fault(), Some(&WizardFault::Duplicate));
    }

    #[test]
    fn test_submit_result_without_submission_is_ignored() {
        let mut wizard = at_reason_step();
        wizard.apply_submit(Ok(()));
        assert_eq!(wizard.phase(), Phase::InProgress);
    }

    #[test]
    fn test_terminal_phase_ignores_input() {
        let mut wizard = Wizard::default();
        wizard.resolve(Some(LINK));
        wizard.apply_check(Err(ApiError::Decode("bad json".to_string())));

        assert!(!wizard.select_option(0, Instant::now()));
        assert!(!wizard.go_back());
        assert!(!wizard.type_char('a'));
        wizard.apply_check(Ok(CheckResponse {
            exists: false,
            submitted_at: None,
        }));
        assert_eq!(wizard.phase(), Phase::BlockedError);
    }
}
