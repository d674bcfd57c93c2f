//! The fixed question catalogue walked by the intake wizard.
//!
//! Four ordered steps: three single-choice questions followed by a
//! free-text reason. Option labels are what the user sees; option values
//! are what gets persisted.

use serde::{Deserialize, Serialize};

/// Minimum length of the free-text reason before submission is allowed.
pub const REASON_MIN_CHARS: usize = 3;
/// Display and validation cap for the free-text reason.
pub const REASON_MAX_CHARS: usize = 500;

/// One of the four ordered wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Income,
    Financing,
    Credit,
    Reason,
}

impl Step {
    pub const TOTAL: u8 = 4;

    pub const fn number(self) -> u8 {
        match self {
            Step::Income => 1,
            Step::Financing => 2,
            Step::Credit => 3,
            Step::Reason => 4,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Step::Income),
            2 => Some(Step::Financing),
            3 => Some(Step::Credit),
            4 => Some(Step::Reason),
            _ => None,
        }
    }

    pub const fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub const fn previous(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    pub const fn answer_key(self) -> AnswerKey {
        match self {
            Step::Income => AnswerKey::IncomeBracket,
            Step::Financing => AnswerKey::FinancingStatus,
            Step::Credit => AnswerKey::CreditStatus,
            Step::Reason => AnswerKey::ReasonText,
        }
    }

    /// Whether picking an answer on this step moves the wizard forward on its own.
    pub const fn auto_advances(self) -> bool {
        !matches!(self, Step::Reason)
    }

    pub fn question(self) -> &'static Question {
        &QUESTIONS[usize::from(self.number() - 1)]
    }
}

/// Field names of a submission, matching the persisted JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKey {
    IncomeBracket,
    FinancingStatus,
    CreditStatus,
    ReasonText,
}

impl AnswerKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            AnswerKey::IncomeBracket => "income_bracket",
            AnswerKey::FinancingStatus => "financing_status",
            AnswerKey::CreditStatus => "credit_status",
            AnswerKey::ReasonText => "reason_text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub label: &'static str,
    pub value: &'static str,
    pub subtitle: Option<&'static str>,
    /// Rendered with emphasis (the "preferred" answer).
    pub highlighted: bool,
}

impl AnswerOption {
    const fn plain(label: &'static str, value: &'static str) -> Self {
        Self {
            label,
            value,
            subtitle: None,
            highlighted: false,
        }
    }

    const fn with_subtitle(label: &'static str, value: &'static str, subtitle: &'static str) -> Self {
        Self {
            label,
            value,
            subtitle: Some(subtitle),
            highlighted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub step: Step,
    pub title: &'static str,
    pub prompt: &'static str,
    /// Empty for the free-text step.
    pub options: &'static [AnswerOption],
    pub placeholder: Option<&'static str>,
}

const INCOME_OPTIONS: &[AnswerOption] = &[
    AnswerOption::plain("Unter 2.500 €", "Unter 2.500 €"),
    AnswerOption::plain("2.500 € – 4.000 €", "2.500 € – 4.000 €"),
    AnswerOption::plain("4.000 € – 6.000 €", "4.000 € – 6.000 €"),
    AnswerOption::plain("Über 6.000 €", "Über 6.000 €"),
];

const FINANCING_OPTIONS: &[AnswerOption] = &[
    AnswerOption {
        label: "Ja, liegt bereits vor",
        value: "Ja, liegt vor",
        subtitle: Some("Bevorzugte Behandlung"),
        highlighted: true,
    },
    AnswerOption::plain("Im Gespräch mit Bank", "Im Gespräch"),
    AnswerOption::plain("Noch nicht gekümmert", "Noch nicht"),
    AnswerOption::plain("Barzahler / Eigenkapital", "Barzahler"),
];

const CREDIT_OPTIONS: &[AnswerOption] = &[
    AnswerOption::with_subtitle("Nein, alles sauber", "Sauber", "Keine negativen Einträge"),
    AnswerOption::with_subtitle("Ja, Einträge vorhanden", "Einträge", "Offene Forderungen etc."),
    AnswerOption::plain("Weiß ich nicht genau", "Unbekannt"),
];

pub static QUESTIONS: [Question; 4] = [
    Question {
        step: Step::Income,
        title: "Nettoeinkommen",
        prompt: "Monatliches Haushaltsnettoeinkommen?",
        options: INCOME_OPTIONS,
        placeholder: None,
    },
    Question {
        step: Step::Financing,
        title: "Finanzierung",
        prompt: "Liegt bereits eine Bestätigung vor?",
        options: FINANCING_OPTIONS,
        placeholder: None,
    },
    Question {
        step: Step::Credit,
        title: "Bonität / Schufa",
        prompt: "Gibt es negative Einträge?",
        options: CREDIT_OPTIONS,
        placeholder: None,
    },
    Question {
        step: Step::Reason,
        title: "Details & Grund",
        prompt: "Erzählen Sie uns kurz von Ihrer Situation.",
        options: &[],
        placeholder: Some("Beispiel: Wir suchen ab dem 01.08. eine Wohnung..."),
    },
];

/// Length of a free-text answer as the user perceives it.
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}
