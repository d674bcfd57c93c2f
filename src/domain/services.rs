//! Submission registration services.
//!
//! The store owns the single persisted document mapping tokens to their
//! submission records. Every token gets at most one record; the first
//! accepted write wins and is never touched again.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::errors::{StorageError, StoreError, StoreResult};
use super::models::{Answers, Lookup, SubmissionDocument, SubmissionRecord};
use super::questions::{text_len, REASON_MAX_CHARS};

/// Backing storage for the submission document.
///
/// Implementations load and save the whole document at once. `load`
/// returns `Ok(None)` when no document has been written yet.
pub trait SubmissionStorage: Send {
    fn load(&self) -> Result<Option<SubmissionDocument>, StorageError>;

    fn save(&mut self, document: &SubmissionDocument) -> Result<(), StorageError>;
}

impl<T: SubmissionStorage + ?Sized> SubmissionStorage for Box<T> {
    fn load(&self) -> Result<Option<SubmissionDocument>, StorageError> {
        (**self).load()
    }

    fn save(&mut self, document: &SubmissionDocument) -> Result<(), StorageError> {
        (**self).save(document)
    }
}

/// What to do when the stored document cannot be read or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptReadPolicy {
    /// Behave as if no submissions exist. A later insert rewrites the
    /// document, dropping whatever was unreadable.
    #[default]
    TreatAsEmpty,
    /// Surface the fault to the caller.
    Fail,
}

/// Registers at most one submission per token.
///
/// # Examples
///
/// ```
/// use intake::domain::{Answers, SubmissionStore};
/// use intake::infrastructure::MemoryStorage;
///
/// let mut store = SubmissionStore::new(MemoryStorage::default());
/// assert!(!store.exists("abc123").unwrap().found);
///
/// store.insert(Some("abc123"), Answers::default()).unwrap();
/// assert!(store.exists("abc123").unwrap().found);
/// assert!(store.insert(Some("abc123"), Answers::default()).is_err());
/// ```
#[derive(Debug)]
pub struct SubmissionStore<S> {
    storage: S,
    on_corrupt_read: CorruptReadPolicy,
}

impl<S: SubmissionStorage> SubmissionStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_policy(storage, CorruptReadPolicy::default())
    }

    pub fn with_policy(storage: S, on_corrupt_read: CorruptReadPolicy) -> Self {
        Self {
            storage,
            on_corrupt_read,
        }
    }

    pub fn policy(&self) -> CorruptReadPolicy {
        self.on_corrupt_read
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the stored document once so a broken file is noticed at startup
    /// rather than on the first request. Returns the number of records.
    pub fn verify(&self) -> StoreResult<usize> {
        self.read_document().map(|document| document.len())
    }

    /// Looks up whether `token` already has a submission.
    ///
    /// Under [`CorruptReadPolicy::TreatAsEmpty`] this never fails.
    pub fn exists(&self, token: &str) -> StoreResult<Lookup> {
        let Some(token) = normalize_token(Some(token)) else {
            return Ok(Lookup::missing());
        };
        let document = self.read_document()?;
        Ok(document
            .get(token)
            .map_or_else(Lookup::missing, Lookup::of))
    }

    pub fn get(&self, token: &str) -> StoreResult<Option<SubmissionRecord>> {
        let Some(token) = normalize_token(Some(token)) else {
            return Ok(None);
        };
        let mut document = self.read_document()?;
        Ok(document.remove(token))
    }

    /// Inserts a submission stamped with the current time.
    pub fn insert(&mut self, token: Option<&str>, answers: Answers) -> StoreResult<SubmissionRecord> {
        self.insert_at(token, answers, Utc::now())
    }

    /// Inserts a submission stamped with `submitted_at`.
    ///
    /// Rejects blank tokens and tokens that already have a record; in both
    /// cases the stored document is left untouched.
    pub fn insert_at(
        &mut self,
        token: Option<&str>,
        answers: Answers,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<SubmissionRecord> {
        let token = normalize_token(token).ok_or(StoreError::MissingToken)?;

        if text_len(&answers.reason_text) > REASON_MAX_CHARS {
            return Err(StoreError::ReasonTooLong);
        }

        let mut document = self.read_document()?;
        if document.contains_key(token) {
            debug!(token, "rejecting duplicate submission");
            return Err(StoreError::AlreadyExists);
        }

        let record = SubmissionRecord {
            answers,
            submitted_at,
        };
        document.insert(token.to_string(), record.clone());

        self.storage
            .save(&document)
            .map_err(StoreError::Persistence)?;

        info!(token, records = document.len(), "submission stored");
        Ok(record)
    }

    fn read_document(&self) -> StoreResult<SubmissionDocument> {
        match self.storage.load() {
            Ok(document) => Ok(document.unwrap_or_default()),
            Err(err) => match self.on_corrupt_read {
                CorruptReadPolicy::TreatAsEmpty => {
                    warn!(error = %err, "submission document unreadable, treating as empty");
                    Ok(SubmissionDocument::new())
                }
                CorruptReadPolicy::Fail => Err(StoreError::UnreadableDocument(err)),
            },
        }
    }
}

/// Tokens are keyed without surrounding whitespace; blank means absent.
fn normalize_token(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}
