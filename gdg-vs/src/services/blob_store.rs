//! Uploaded-image storage
//!
//! Stores each accepted photo under the uploads folder with a generated
//! unique name. The pipeline deletes the blob again when the geofence
//! check rejects a submission, so no orphaned image outlives its record.

use gdg_common::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Filesystem blob store for uploaded photos
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the uploads folder if missing
    pub fn ensure_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Store image bytes under a generated unique name; returns the name
    pub fn store(&self, original_name: &str, data: &[u8]) -> Result<String> {
        self.ensure_exists()?;
        let name = format!("{}_{}", Uuid::new_v4().simple(), sanitize(original_name));
        let path = self.root.join(&name);
        std::fs::write(&path, data)?;
        debug!(name = %name, bytes = data.len(), "Stored uploaded image");
        Ok(name)
    }

    /// Absolute path of a stored image
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Delete a stored image; missing files are not an error
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.root.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(name = %name, "Deleted stored image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// True iff a stored image exists under this name
    pub fn exists(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }
}

/// Keep only filename-safe characters from a client-supplied name
fn sanitize(name: &str) -> String {
    let cleaned: String = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let name = store.store("deed.jpg", b"image bytes").unwrap();
        assert!(name.ends_with("_deed.jpg"));
        assert!(store.exists(&name));
        assert_eq!(std::fs::read(store.path_for(&name)).unwrap(), b"image bytes");

        store.delete(&name).unwrap();
        assert!(!store.exists(&name));
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        store.delete("no-such-file.jpg").unwrap();
    }

    #[test]
    fn test_unique_names_per_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let a = store.store("deed.jpg", b"one").unwrap();
        let b = store.store("deed.jpg", b"two").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize("../../etc/passwd"), "passwd");
        assert_eq!(sanitize("photo of deed.png"), "photoofdeed.png");
        assert_eq!(sanitize("///"), "upload");
    }
}
