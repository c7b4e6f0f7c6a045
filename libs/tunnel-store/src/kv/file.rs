//! Single-file JSON key-value medium.
//!
//! The whole map lives in one document. Every mutation reads the current
//! document, applies the change and writes it back with the
//! write-temp + fsync + rename pattern, so a crash leaves either the old
//! or the new document on disk, never a torn one.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::KeyValueStore;
use crate::error::StorageError;

/// On-disk document format version.
const FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    version: u32,
    entries: BTreeMap<String, String>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: FILE_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// Key-value store in a JSON file.
#[derive(Debug, Clone)]
pub struct FileKv {
    path: PathBuf,
}

impl FileKv {
    /// Use the file at `path`. The file is created on first write.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Document, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::default()),
            Err(e) => return Err(e.into()),
        };

        let doc: Document =
            serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if doc.version != FILE_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: doc.version,
                expected: FILE_VERSION,
            });
        }

        Ok(doc)
    }

    fn write(&self, doc: &Document) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(doc).map_err(io::Error::from)?;
        let tmp_path = self.path.with_extension("tmp");

        let written = write_synced(&tmp_path, content.as_bytes())
            .and_then(|()| fs::rename(&tmp_path, &self.path));

        if let Err(e) = written {
            // Best effort
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(
            path = %self.path.display(),
            entries = doc.entries.len(),
            "Wrote tunnel state file"
        );

        Ok(())
    }
}

fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    file.write_all(content)?;
    file.sync_all()
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read()?.entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut doc = self.read()?;
        doc.entries.insert(key.to_string(), value.to_string());
        self.write(&doc)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut doc = self.read()?;
        if doc.entries.remove(key).is_none() {
            return Ok(());
        }
        self.write(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_kv_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let kv = FileKv::new(dir.path().join("state.json"));
        assert!(kv.get("connectionInfo").unwrap().is_none());

        // Deleting from a missing file doesn't create it
        kv.delete("connectionInfo").unwrap();
        assert!(!kv.path().exists());
    }

    #[test]
    fn test_file_kv_roundtrip_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let kv = FileKv::new(&path);
        kv.set("tunnelStatus", "CONNECTED").unwrap();
        kv.set("udpSupported", "true").unwrap();
        kv.delete("tunnelStatus").unwrap();

        let reopened = FileKv::new(&path);
        assert!(reopened.get("tunnelStatus").unwrap().is_none());
        assert_eq!(
            reopened.get("udpSupported").unwrap().as_deref(),
            Some("true")
        );

        // No temp file left behind
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_kv_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let kv = FileKv::new(&path);
        assert!(matches!(kv.get("a"), Err(StorageError::Corrupt { .. })));
        assert!(matches!(kv.set("a", "b"), Err(StorageError::Corrupt { .. })));

        // The corrupt file was not overwritten
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_file_kv_version_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"version":99,"entries":{}}"#).unwrap();

        let kv = FileKv::new(&path);
        assert!(matches!(
            kv.get("a"),
            Err(StorageError::UnsupportedVersion {
                found: 99,
                expected: FILE_VERSION
            })
        ));
    }

    #[test]
    fn test_file_kv_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupant"), "x").unwrap();

        let kv = FileKv::new(&path);
        assert!(matches!(
            kv.write(&Document::default()),
            Err(StorageError::Io(_))
        ));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_kv_directory_in_the_way() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::create_dir(&path).unwrap();

        let kv = FileKv::new(&path);
        assert!(matches!(kv.get("a"), Err(StorageError::Io(_))));
    }
}
