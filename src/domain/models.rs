use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::questions::AnswerKey;

/// The four answers collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Answers {
    pub income_bracket: String,
    pub financing_status: String,
    pub credit_status: String,
    pub reason_text: String,
}

impl Answers {
    pub fn get(&self, key: AnswerKey) -> &str {
        match key {
            AnswerKey::IncomeBracket => &self.income_bracket,
            AnswerKey::FinancingStatus => &self.financing_status,
            AnswerKey::CreditStatus => &self.credit_status,
            AnswerKey::ReasonText => &self.reason_text,
        }
    }

    pub fn set(&mut self, key: AnswerKey, value: impl Into<String>) {
        let slot = match key {
            AnswerKey::IncomeBracket => &mut self.income_bracket,
            AnswerKey::FinancingStatus => &mut self.financing_status,
            AnswerKey::CreditStatus => &mut self.credit_status,
            AnswerKey::ReasonText => &mut self.reason_text,
        };
        *slot = value.into();
    }
}

/// A persisted submission. Created once per token and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(flatten)]
    pub answers: Answers,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
}

/// The whole persisted document: token -> record.
pub type SubmissionDocument = BTreeMap<String, SubmissionRecord>;

/// Result of an existence lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub found: bool,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Lookup {
    pub fn missing() -> Self {
        Self {
            found: false,
            submitted_at: None,
        }
    }

    pub fn of(record: &SubmissionRecord) -> Self {
        Self {
            found: true,
            submitted_at: Some(record.submitted_at),
        }
    }
}

/// Body of `GET /api/check/:token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub exists: bool,
    #[serde(rename = "submittedAt", skip_serializing_if = "Option::is_none", default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<Lookup> for CheckResponse {
    fn from(lookup: Lookup) -> Self {
        Self {
            exists: lookup.found,
            submitted_at: lookup.submitted_at,
        }
    }
}

/// Body of `POST /api/submit`: the token alongside the flattened answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(alias = "uuid", default)]
    pub token: Option<String>,
    #[serde(flatten)]
    pub answers: Answers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
