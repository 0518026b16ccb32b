use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::{Result, StorageError};

/// What occupies a vault path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    Document,
}

/// Document tree the synced highlights are written into.
///
/// Paths are vault-relative and `/`-separated, e.g. `Avocado/My Book.md`.
pub trait Vault: Send + Sync {
    /// Look up a path; `None` when nothing exists there
    fn entry_kind(&self, path: &str) -> Result<Option<EntryKind>>;

    fn create_folder(&self, path: &str) -> Result<()>;

    /// Create a new document with initial content. Fails if anything already
    /// occupies the path.
    fn create(&self, path: &str, content: &str) -> Result<()>;

    /// Append to the end of an existing document
    fn append(&self, path: &str, content: &str) -> Result<()>;
}

/// Vault backed by a directory on the local filesystem
pub struct FileVault {
    base_path: PathBuf,
}

impl FileVault {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a vault path to a filesystem path
    pub fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.base_path.clone(), |acc, segment| acc.join(segment))
    }
}

impl Vault for FileVault {
    fn entry_kind(&self, path: &str) -> Result<Option<EntryKind>> {
        match fs::metadata(self.resolve(path)) {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Folder)),
            Ok(_) => Ok(Some(EntryKind::Document)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn create_folder(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn create(&self, path: &str, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.resolve(path))?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    fn append(&self, path: &str, content: &str) -> Result<()> {
        if self.entry_kind(path)? != Some(EntryKind::Document) {
            return Err(StorageError::NotADocument(path.to_string()));
        }
        let mut file = OpenOptions::new().append(true).open(self.resolve(path))?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}
