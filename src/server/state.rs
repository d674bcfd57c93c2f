use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::http::HeaderValue;
use tracing::info;

use super::config::ServerConfig;
use super::error::{AppError, ServerError};
use crate::domain::{StoreResult, SubmissionStorage, SubmissionStore};
use crate::infrastructure::JsonFileStorage;

pub type DynStore = SubmissionStore<Box<dyn SubmissionStorage>>;

/// Shared per-process state. The store sits behind one mutex so every
/// read-modify-write of the document runs alone.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<DynStore>>,
    pub dist_dir: PathBuf,
    pub csp: HeaderValue,
}

impl AppState {
    pub fn new(store: DynStore, dist_dir: impl Into<PathBuf>, csp: &str) -> Result<Self, ServerError> {
        let csp = HeaderValue::from_str(csp).map_err(|_| ServerError::InvalidCsp)?;
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            dist_dir: dist_dir.into(),
            csp,
        })
    }

    /// Opens the file-backed store named by `config` and checks it is readable
    /// under the configured policy.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let storage: Box<dyn SubmissionStorage> =
            Box::new(JsonFileStorage::new(&config.data_file));
        let store = SubmissionStore::with_policy(storage, config.corrupt_read_policy());

        let records = store.verify()?;
        info!(
            path = %config.data_file.display(),
            records,
            policy = ?store.policy(),
            "submission store ready"
        );

        Self::new(store, &config.dist_dir, &config.csp)
    }

    /// Runs `op` against the locked store on the blocking pool, since every
    /// store call reads and possibly fsyncs the document.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut DynStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .map_err(|_| AppError::Internal("submission store lock poisoned".to_string()))?;
            op(&mut guard).map_err(AppError::from)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
