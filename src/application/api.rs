use thiserror::Error;

use crate::domain::{CheckResponse, SubmitRequest};

/// Failure talking to the submission backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("server unreachable: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("a submission for this token already exists")]
    Duplicate,

    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// The two backend calls the wizard makes.
pub trait FormApi {
    fn check(&self, token: &str) -> Result<CheckResponse, ApiError>;

    fn submit(&self, request: &SubmitRequest) -> Result<(), ApiError>;
}
