use std::time::Instant;

use crate::application::{App, Phase};
use crate::domain::Step;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers, now: Instant) {
        if modifiers.contains(KeyModifiers::CONTROL) && matches!(key, KeyCode::Char('c')) {
            app.quit();
            return;
        }

        match app.wizard.phase() {
            Phase::InProgress => match app.wizard.current_step() {
                Some(Step::Reason) => Self::handle_reason_step(app, key, modifiers),
                Some(_) => Self::handle_choice_step(app, key, now),
                None => {}
            },
            Phase::Resolving => {
                if matches!(key, KeyCode::Esc) {
                    app.quit();
                }
            }
            _ => Self::handle_terminal_screen(app, key),
        }
    }

    fn handle_choice_step(app: &mut App, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.move_cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => app.move_cursor_down(),
            KeyCode::Enter | KeyCode::Char(' ') => app.choose(now),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                app.choose_index(index, now);
            }
            KeyCode::Esc | KeyCode::Left | KeyCode::Backspace | KeyCode::Char('h') => app.back(),
            KeyCode::Char('q') => app.quit(),
            _ => {}
        }
    }

    fn handle_reason_step(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Enter => app.submit(),
            KeyCode::Esc => app.back(),
            KeyCode::Backspace => {
                app.wizard.erase_char();
            }
            KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                app.wizard.type_char(c);
            }
            _ => {}
        }
    }

    fn handle_terminal_screen(app: &mut App, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter) {
            app.quit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ApiError, FormApi};
    use crate::domain::{AnswerKey, CheckResponse, SubmitRequest};
    use std::time::Duration;

    struct OpenApi;

    impl FormApi for OpenApi {
        fn check(&self, _token: &str) -> Result<CheckResponse, ApiError> {
            Ok(CheckResponse {
                exists: false,
                submitted_at: None,
            })
        }

        fn submit(&self, _request: &SubmitRequest) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn press(app: &mut App, key: KeyCode) {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE, Instant::now());
    }

    fn open_app() -> App {
        let mut app = App::new(Some("/abc123"), Duration::ZERO);
        app.dispatch(&OpenApi);
        app
    }

    #[test]
    fn test_arrow_keys_and_enter_select() {
        let mut app = open_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.wizard.answer(AnswerKey::IncomeBracket), "2.500 € – 4.000 €");
        assert_eq!(app.wizard.current_step(), Some(Step::Financing));
    }

    #[test]
    fn test_digit_selects_option() {
        let mut app = open_app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.wizard.answer(AnswerKey::IncomeBracket), "Über 6.000 €");

        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.wizard.current_step(), Some(Step::Financing));
        assert!(app.wizard.answer(AnswerKey::FinancingStatus).is_empty());
    }

    #[test]
    fn test_escape_goes_back() {
        let mut app = open_app();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.wizard.current_step(), Some(Step::Income));
    }

    #[test]
    fn test_typing_on_reason_step() {
        let mut app = open_app();
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('1'));
        }
        assert_eq!(app.wizard.current_step(), Some(Step::Reason));

        // Digits and 'q' are text here, not shortcuts.
        for c in "q1 ab".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.wizard.answer(AnswerKey::ReasonText), "q1 a");
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Enter);
        assert!(app.has_queued_command());
        app.dispatch(&OpenApi);
        assert_eq!(app.wizard.phase(), Phase::JustSubmitted);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let mut app = open_app();
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('1'));
        }
        let now = Instant::now();
        InputHandler::handle_key_event(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL, now);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('x'), KeyModifiers::ALT, now);
        assert!(app.wizard.answer(AnswerKey::ReasonText).is_empty());

        InputHandler::handle_key_event(&mut app, KeyCode::Char('A'), KeyModifiers::SHIFT, now);
        assert_eq!(app.wizard.answer(AnswerKey::ReasonText), "A");
    }

    #[test]
    fn test_enter_with_short_reason_does_nothing() {
        let mut app = open_app();
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('2'));
        }
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        assert!(!app.has_queued_command());
        assert!(!app.wizard.is_submitting());
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let mut app = open_app();
        InputHandler::handle_key_event(
            &mut app,
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            Instant::now(),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_blocked_screen_quits_on_q() {
        let mut app = App::new(None, Duration::ZERO);
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
