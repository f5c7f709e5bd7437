//! Photo Vault - Storage Manager
//!
//! Persists the current user and the registry of all users in the key-value
//! store, and photo bytes in the flat-file store.
//!
//! Reads are best-effort: an absent, unreadable or corrupt record comes back
//! as `None` and a warning is logged. Writes propagate their errors.

use std::collections::HashSet;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::image_fs::FlatFileStore;
use crate::kv::{KeyValueStore, SqliteKvStore};
use crate::model::User;

/// Key of the current user record
pub const USER_KEY: &str = "user";
/// Key of the registry record
pub const USERS_KEY: &str = "users";

/// Storage manager over a key-value store and a flat-file image store
pub struct StorageManager<K: KeyValueStore = SqliteKvStore> {
    kv: K,
    images: FlatFileStore,
}

impl StorageManager<SqliteKvStore> {
    /// Open the stores of the vault described by `config`
    pub fn open(config: &VaultConfig) -> VaultResult<Self> {
        let kv = SqliteKvStore::open(&config.db_path())?;
        Ok(Self::new(kv, FlatFileStore::new(&config.images_dir())))
    }
}

impl<K: KeyValueStore> StorageManager<K> {
    pub fn new(kv: K, images: FlatFileStore) -> Self {
        Self { kv, images }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CURRENT USER / REGISTRY
    // ═══════════════════════════════════════════════════════════════════════

    /// Overwrite the current user record
    pub fn save_current_user(&self, user: &User) -> VaultResult<()> {
        let data = serde_json::to_vec(user)?;
        self.kv.set(USER_KEY, &data)
    }

    /// The current user, if one was saved and still decodes
    pub fn load_current_user(&self) -> Option<User> {
        self.load_record(USER_KEY)
    }

    /// Replace `user`'s entry in `registry` and persist the result.
    ///
    /// Every entry named like `user` is dropped, then `user` is appended.
    /// Returns the registry as persisted.
    pub fn save_user_in_registry(&self, user: &User, registry: &[User]) -> VaultResult<Vec<User>> {
        let merged = merge_into_registry(user, registry);
        let data = serde_json::to_vec(&merged)?;
        self.kv.set(USERS_KEY, &data)?;
        Ok(merged)
    }

    /// The registry, if one was saved and still decodes
    pub fn load_registry(&self) -> Option<Vec<User>> {
        self.load_record(USERS_KEY)
    }

    /// Persist `user` as the current user and merge it into `registry`, in
    /// a single write. Returns the registry as persisted.
    pub fn commit(&self, user: &User, registry: &[User]) -> VaultResult<Vec<User>> {
        let merged = merge_into_registry(user, registry);
        let user_data = serde_json::to_vec(user)?;
        let users_data = serde_json::to_vec(&merged)?;

        self.kv.set_many(&[
            (USER_KEY, user_data.as_slice()),
            (USERS_KEY, users_data.as_slice()),
        ])?;

        log::debug!(
            "Committed user {:?} ({} photos), registry size {}",
            user.name,
            user.photo_count(),
            merged.len()
        );

        Ok(merged)
    }

    fn load_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = match self.kv.get(key) {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding undecodable '{}' record: {}", key, e);
                None
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // IMAGES
    // ═══════════════════════════════════════════════════════════════════════

    /// Store image bytes under a freshly generated name and return the name
    pub fn save_image(&self, bytes: &[u8]) -> VaultResult<String> {
        let name = Uuid::new_v4().to_string().to_uppercase();
        self.images.write_file(&name, bytes)?;
        log::debug!("Saved image {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    /// Bytes of the image stored under `name`
    pub fn load_image(&self, name: &str) -> Option<Vec<u8>> {
        match self.images.read_file(name) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to read image {}: {}", name, e);
                None
            }
        }
    }

    /// Delete the image stored under `name`
    pub fn delete_image(&self, name: &str) -> VaultResult<()> {
        self.images.delete_file(name)
    }

    pub fn image_exists(&self, name: &str) -> bool {
        self.images.exists(name)
    }

    /// Names of all stored images
    pub fn list_images(&self) -> VaultResult<Vec<String>> {
        self.images.list()
    }

    /// Total bytes of stored images
    pub fn images_size(&self) -> u64 {
        self.images.total_size()
    }

    /// Stored images that no photo of any user in `registry` points at
    pub fn orphaned_images(&self, registry: &[User]) -> VaultResult<Vec<String>> {
        let referenced: HashSet<&str> = registry
            .iter()
            .flat_map(|user| user.photos())
            .map(|photo| photo.name.as_str())
            .collect();

        Ok(self
            .list_images()?
            .into_iter()
            .filter(|name| !referenced.contains(name.as_str()))
            .collect())
    }

    /// Delete every orphaned image. Returns the deleted names.
    pub fn purge_orphans(&self, registry: &[User]) -> VaultResult<Vec<String>> {
        let orphans = self.orphaned_images(registry)?;
        for name in &orphans {
            self.images.delete_file(name)?;
        }
        if !orphans.is_empty() {
            log::info!("Purged {} orphaned images", orphans.len());
        }
        Ok(orphans)
    }
}

/// Drop every entry named like `user` from `registry` and append `user`
pub fn merge_into_registry(user: &User, registry: &[User]) -> Vec<User> {
    let mut merged: Vec<User> = registry
        .iter()
        .filter(|existing| existing.name != user.name)
        .cloned()
        .collect();
    merged.push(user.clone());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use crate::model::Photo;
    use tempfile::{tempdir, TempDir};

    fn storage() -> (TempDir, StorageManager<MemoryKvStore>) {
        let dir = tempdir().unwrap();
        let images = FlatFileStore::new(&dir.path().join("images"));
        (dir, StorageManager::new(MemoryKvStore::new(), images))
    }

    fn user(name: &str, password: &str) -> User {
        User::with_credentials(name, password)
    }

    #[test]
    fn test_current_user_round_trip() {
        let (_dir, storage) = storage();
        assert_eq!(storage.load_current_user(), None);

        let alice = user("alice", "secret1");
        storage.save_current_user(&alice).unwrap();
        assert_eq!(storage.load_current_user(), Some(alice));

        let bob = user("bob", "secret2");
        storage.save_current_user(&bob).unwrap();
        assert_eq!(storage.load_current_user(), Some(bob));
    }

    #[test]
    fn test_corrupt_record_reads_as_absent() {
        let (_dir, storage) = storage();
        storage.kv.set(USER_KEY, b"not json").unwrap();
        storage.kv.set(USERS_KEY, b"{\"name\": 1}").unwrap();

        assert_eq!(storage.load_current_user(), None);
        assert_eq!(storage.load_registry(), None);
    }

    #[test]
    fn test_registry_replaces_same_name() {
        let (_dir, storage) = storage();
        assert_eq!(storage.load_registry(), None);

        let registry = vec![user("alice", "secret1"), user("bob", "secret2"), user("carol", "secret3")];

        let mut bob = user("bob", "changed");
        bob.push_photo(Photo::new("p1", true));

        let saved = storage.save_user_in_registry(&bob, &registry).unwrap();
        let loaded = storage.load_registry().unwrap();
        assert_eq!(saved, loaded);

        assert_eq!(loaded.iter().filter(|u| u.name.as_deref() == Some("bob")).count(), 1);
        assert_eq!(loaded.last(), Some(&bob));
        assert_eq!(loaded[0], registry[0]);
        assert_eq!(loaded[1], registry[2]);

        // idempotent
        let again = storage.save_user_in_registry(&bob, &loaded).unwrap();
        assert_eq!(again, loaded);
    }

    #[test]
    fn test_commit_writes_both_records() {
        let (_dir, storage) = storage();
        let registry = vec![user("alice", "secret1")];

        let bob = user("bob", "secret2");
        let merged = storage.commit(&bob, &registry).unwrap();

        assert_eq!(storage.load_current_user(), Some(bob.clone()));
        assert_eq!(storage.load_registry(), Some(merged.clone()));
        assert_eq!(merged, vec![user("alice", "secret1"), bob]);
    }

    #[test]
    fn test_image_round_trip() {
        let (_dir, storage) = storage();
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 0, 255];

        let name = storage.save_image(&bytes).unwrap();
        assert_eq!(storage.load_image(&name), Some(bytes));

        let other = storage.save_image(b"second").unwrap();
        assert_ne!(name, other);

        assert_eq!(storage.load_image("does-not-exist"), None);
    }

    #[test]
    fn test_orphaned_images() {
        let (_dir, storage) = storage();

        let kept = storage.save_image(b"kept").unwrap();
        let leaked = storage.save_image(b"leaked").unwrap();

        let mut alice = user("alice", "secret1");
        alice.push_photo(Photo::new(kept.clone(), false));
        let registry = vec![alice];

        assert_eq!(storage.orphaned_images(&registry).unwrap(), vec![leaked.clone()]);

        assert_eq!(storage.purge_orphans(&registry).unwrap(), vec![leaked.clone()]);
        assert!(!storage.image_exists(&leaked));
        assert!(storage.image_exists(&kept));
        assert!(storage.orphaned_images(&registry).unwrap().is_empty());
    }
}
