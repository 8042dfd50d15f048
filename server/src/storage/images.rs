//! Filesystem image store

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Image files on disk, named by UUID, stored as JPEG
#[derive(Debug, Clone)]
pub struct ImageStore {
    base_dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating the directory when missing
    pub fn open(base_dir: impl AsRef<Path>) -> io::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.jpg"))
    }

    /// Only names we generated are ever looked up, so a crafted name
    /// cannot escape the base directory.
    fn is_valid_name(name: &str) -> bool {
        Uuid::parse_str(name).is_ok()
    }

    /// Store image bytes under a fresh name and return it
    pub fn save(&self, bytes: &[u8]) -> io::Result<String> {
        let name = Uuid::new_v4().to_string();
        fs::write(self.path_for(&name), bytes)?;
        tracing::info!(image = %name, size = bytes.len(), "Image stored");
        Ok(name)
    }

    /// Image bytes by name; None when absent or the name is not ours
    pub fn load(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        if !Self::is_valid_name(name) {
            return Ok(None);
        }
        match fs::read(self.path_for(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete an image; an absent file is not an error
    pub fn delete(&self, name: &str) -> io::Result<()> {
        if !Self::is_valid_name(name) {
            return Ok(());
        }
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => {
                tracing::info!(image = %name, "Image deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().expect("tempdir");
        let store = ImageStore::open(dir.path()).expect("open");

        let name = store.save(b"jpeg bytes").expect("save");
        let bytes = store.load(&name).expect("load").expect("some");
        assert_eq!(bytes, b"jpeg bytes");
    }

    #[test]
    fn test_unknown_name_reads_absent() {
        let dir = tempdir().expect("tempdir");
        let store = ImageStore::open(dir.path()).expect("open");

        let name = Uuid::new_v4().to_string();
        assert!(store.load(&name).expect("load").is_none());
    }

    #[test]
    fn test_non_uuid_names_never_hit_disk() {
        let dir = tempdir().expect("tempdir");
        let store = ImageStore::open(dir.path()).expect("open");

        assert!(store.load("../../etc/passwd").expect("load").is_none());
        assert!(store.load("not-a-uuid").expect("load").is_none());
        store.delete("../escape").expect("delete is a no-op");
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = tempdir().expect("tempdir");
        let store = ImageStore::open(dir.path()).expect("open");

        let name = store.save(b"bytes").expect("save");
        store.delete(&name).expect("delete");
        assert!(store.load(&name).expect("load").is_none());

        // Deleting twice is fine
        store.delete(&name).expect("second delete");
    }
}
