//! Photo Vault - Flat-File Image Store
//!
//! One file per photo, addressed by the photo's generated name.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{VaultError, VaultResult};

const TEMP_SUFFIX: &str = ".tmp";

/// Flat-file blob store
pub struct FlatFileStore {
    /// Root directory
    root: PathBuf,
}

impl FlatFileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn full_path(&self, name: &str) -> VaultResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(VaultError::ImageNotFound(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Write `data` under `name`, replacing any existing file.
    ///
    /// Written to a temp file first and renamed into place.
    pub fn write_file(&self, name: &str, data: &[u8]) -> VaultResult<()> {
        let path = self.full_path(name)?;
        fs::create_dir_all(&self.root)?;

        if path.exists() {
            log::warn!("Replacing existing image file {}", name);
        }

        let temp_path = self.root.join(format!("{}{}", name, TEMP_SUFFIX));

        if let Err(e) = Self::write_then_rename(&temp_path, &path, data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }

    fn write_then_rename(temp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;

        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(temp_path, path)
    }

    /// Read the file stored under `name`; `Ok(None)` if there is none
    pub fn read_file(&self, name: &str) -> VaultResult<Option<Vec<u8>>> {
        let path = self.full_path(name)?;

        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the file under `name`. Missing files are not an error.
    pub fn delete_file(&self, name: &str) -> VaultResult<()> {
        let path = self.full_path(name)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a file exists
    pub fn exists(&self, name: &str) -> bool {
        self.full_path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Names of all stored files, sorted
    pub fn list(&self) -> VaultResult<Vec<String>> {
        let mut names = Vec::new();

        if !self.root.exists() {
            return Ok(names);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.ends_with(TEMP_SUFFIX) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Total bytes held by the store
    pub fn total_size(&self) -> u64 {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flat_file_store() {
        let dir = tempdir().unwrap();
        let store = FlatFileStore::new(&dir.path().join("images"));

        assert_eq!(store.read_file("missing").unwrap(), None);
        assert!(store.list().unwrap().is_empty());

        store.write_file("a1", b"jpeg bytes").unwrap();
        assert!(store.exists("a1"));
        assert_eq!(store.read_file("a1").unwrap().as_deref(), Some(&b"jpeg bytes"[..]));

        store.write_file("a1", b"other").unwrap();
        assert_eq!(store.read_file("a1").unwrap().as_deref(), Some(&b"other"[..]));

        store.write_file("b2", b"xy").unwrap();
        assert_eq!(store.list().unwrap(), vec!["a1".to_string(), "b2".to_string()]);
        assert_eq!(store.total_size(), 7);

        store.delete_file("a1").unwrap();
        store.delete_file("a1").unwrap();
        assert!(!store.exists("a1"));
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = FlatFileStore::new(dir.path());

        // A non-empty directory under the target name makes the rename fail
        fs::create_dir_all(dir.path().join("c3")).unwrap();
        fs::write(dir.path().join("c3").join("inner"), b"abcd").unwrap();

        assert!(store.write_file("c3", b"photo bytes").is_err());
        assert!(!dir.path().join("c3.tmp").exists());
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.total_size(), 4);
    }

    #[test]
    fn test_rejects_path_names() {
        let dir = tempdir().unwrap();
        let store = FlatFileStore::new(dir.path());

        assert!(store.write_file("../escape", b"x").is_err());
        assert!(store.read_file("a/b").is_err());
        assert!(!store.exists(".."));
    }
}
