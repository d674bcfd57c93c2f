use thiserror::Error;

/// Failure of the underlying document storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored document is corrupt: {0}")]
    Corrupt(String),

    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// Failure of a submission store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("token is missing")]
    MissingToken,

    #[error("a submission for this token already exists")]
    AlreadyExists,

    #[error("reason text exceeds the character limit")]
    ReasonTooLong,

    #[error("submission document is unreadable: {0}")]
    UnreadableDocument(#[source] StorageError),

    #[error("failed to persist submission: {0}")]
    Persistence(#[source] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;
