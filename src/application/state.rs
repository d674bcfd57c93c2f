//! Application state for the terminal intake client.
//!
//! [`App`] couples the [`Wizard`] with the bits of state only the terminal
//! front end cares about, and runs the wizard's backend commands.

use std::time::{Duration, Instant};

use tracing::debug;

use super::api::FormApi;
use super::wizard::{Command, Phase, Wizard};
use crate::domain::Step;

/// Main application state.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use intake::application::{App, Phase};
///
/// let app = App::new(None, Duration::ZERO);
/// assert_eq!(app.wizard.phase(), Phase::BlockedNoToken);
/// assert!(!app.has_queued_command());
/// ```
#[derive(Debug)]
pub struct App {
    /// The wizard being driven
    pub wizard: Wizard,
    /// Highlighted option on a choice step
    pub option_cursor: usize,
    /// Set once the user asked to leave
    pub should_quit: bool,
    /// Backend work waiting to be dispatched
    queued: Option<Command>,
}

impl App {
    /// Creates the app for `link`, queueing the existence check when a
    /// token could be resolved.
    pub fn new(link: Option<&str>, advance_delay: Duration) -> Self {
        let mut wizard = Wizard::new(advance_delay);
        let queued = wizard.resolve(link);
        Self {
            wizard,
            option_cursor: 0,
            should_quit: false,
            queued,
        }
    }

    pub fn has_queued_command(&self) -> bool {
        self.queued.is_some()
    }

    /// Runs the queued command against `api` and applies its outcome.
    ///
    /// Blocks until the call completes; there is no cancellation.
    pub fn dispatch<A: FormApi + ?Sized>(&mut self, api: &A) -> bool {
        let Some(command) = self.queued.take() else {
            return false;
        };

        match command {
            Command::Check { token } => {
                let result = api.check(&token);
                self.wizard.apply_check(result);
            }
            Command::Submit(request) => {
                let result = api.submit(&request);
                self.wizard.apply_submit(result);
            }
        }
        debug!(phase = ?self.wizard.phase(), "command dispatched");
        self.sync_cursor();
        true
    }

    pub fn move_cursor_up(&mut self) {
        self.option_cursor = self.option_cursor.saturating_sub(1);
    }

    pub fn move_cursor_down(&mut self) {
        let count = self.option_count();
        if count > 0 && self.option_cursor + 1 < count {
            self.option_cursor += 1;
        }
    }

    /// Picks the highlighted option.
    pub fn choose(&mut self, now: Instant) {
        self.choose_index(self.option_cursor, now);
    }

    pub fn choose_index(&mut self, index: usize, now: Instant) {
        if self.wizard.select_option(index, now) {
            self.option_cursor = index;
            self.sync_cursor();
        }
    }

    pub fn back(&mut self) {
        if self.wizard.go_back() {
            self.sync_cursor();
        }
    }

    /// Queues the submission when the wizard allows it.
    pub fn submit(&mut self) {
        if self.queued.is_some() {
            return;
        }
        self.queued = self.wizard.begin_submit();
    }

    /// Advances time; returns whether the screen changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let advanced = self.wizard.tick(now);
        if advanced {
            self.sync_cursor();
        }
        advanced
    }

    /// How long the event loop may wait before the next scheduled advance.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.wizard
            .pending_advance()
            .map(|pending| pending.due.saturating_duration_since(now))
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Whether the wizard reached a screen with nothing left to do.
    pub fn is_finished(&self) -> bool {
        self.wizard.phase().is_terminal()
    }

    fn option_count(&self) -> usize {
        self.wizard
            .current_step()
            .map_or(0, |step| step.question().options.len())
    }

    /// Points the cursor at the stored answer of the visible step, if any.
    fn sync_cursor(&mut self) {
        let Some(step) = self.wizard.current_step() else {
            self.option_cursor = 0;
            return;
        };
        if self.wizard.phase() != Phase::InProgress || step == Step::Reason {
            self.option_cursor = 0;
            return;
        }
        let chosen = self.wizard.answer(step.answer_key());
        let selected = step
            .question()
            .options
            .iter()
            .position(|option| option.value == chosen);
        self.option_cursor = selected.unwrap_or_else(|| {
            self.option_cursor
                .min(step.question().options.len().saturating_sub(1))
        });
    }
}
