use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::{StorageError, SubmissionDocument, SubmissionStorage};

/// Stores the submission document as pretty-printed JSON in a single file.
///
/// A missing (or blank) file means no submissions yet. Saves go through a
/// sibling temp file that is renamed over the target, so readers only ever
/// see a complete document.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("submissions.json");
        self.path
            .with_file_name(format!(".{name}.tmp.{}", std::process::id()))
    }
}

impl SubmissionStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<SubmissionDocument>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<SubmissionDocument>(&content)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    fn save(&mut self, document: &SubmissionDocument) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        let written = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::Io(e));
        }
        Ok(())
    }
}

/// In-memory storage with the same contract as [`JsonFileStorage`].
///
/// Can be told to fail reads (as if the document were corrupt) or writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Option<SubmissionDocument>,
    corrupt: bool,
    fail_writes: bool,
    saves: usize,
}

impl MemoryStorage {
    pub fn with_document(document: SubmissionDocument) -> Self {
        Self {
            document: Some(document),
            ..Self::default()
        }
    }

    pub fn corrupt() -> Self {
        Self {
            corrupt: true,
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn document(&self) -> Option<&SubmissionDocument> {
        self.document.as_ref()
    }
}

impl SubmissionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<SubmissionDocument>, StorageError> {
        if self.corrupt {
            return Err(StorageError::Corrupt("simulated corrupt document".to_string()));
        }
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &SubmissionDocument) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "simulated write failure",
            )));
        }
        self.document = Some(document.clone());
        self.corrupt = false;
        self.saves += 1;
        Ok(())
    }
}
