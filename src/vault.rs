//! Photo Vault - Session and Photo Operations
//!
//! `PhotoVault` is the context object a front end drives: it owns the
//! storage, the signed-in user, the registry snapshot and the index of the
//! photo being displayed. Every mutation is committed as one write of the
//! current user together with the registry.

use std::path::Path;
use serde::Serialize;

use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::kv::{KeyValueStore, SqliteKvStore};
use crate::model::{Photo, User};
use crate::storage::StorageManager;
use crate::thumbs::ThumbnailEngine;
use crate::validation::{self, RegistrationForm};

/// Photo Vault - Main entry point
pub struct PhotoVault<K: KeyValueStore = SqliteKvStore> {
    /// Configuration
    config: VaultConfig,
    /// Persistence
    storage: StorageManager<K>,
    /// Grid thumbnails
    thumbs: ThumbnailEngine,
    /// Signed-in user
    user: Option<User>,
    /// Registry snapshot, refreshed on every commit
    registry: Vec<User>,
    /// Index of the displayed photo
    index: usize,
}

impl PhotoVault<SqliteKvStore> {
    /// Open (or create) the vault at `path` and resume its session
    pub fn open<P: AsRef<Path>>(path: P) -> VaultResult<Self> {
        let config = VaultConfig::load_or_create(path)?;
        let storage = StorageManager::open(&config)?;
        let mut vault = Self::with_storage(config, storage);
        vault.resume();
        Ok(vault)
    }
}

impl<K: KeyValueStore> PhotoVault<K> {
    // ═══════════════════════════════════════════════════════════════════════
    // INITIALIZATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Build a vault over an existing storage manager. No session is loaded.
    pub fn with_storage(config: VaultConfig, storage: StorageManager<K>) -> Self {
        let thumbs = ThumbnailEngine::new(config.thumb_size);
        Self {
            config,
            storage,
            thumbs,
            user: None,
            registry: Vec::new(),
            index: 0,
        }
    }

    /// Reload the current user and the registry from storage
    pub fn resume(&mut self) -> Option<&User> {
        self.user = self.storage.load_current_user();
        self.registry = self.storage.load_registry().unwrap_or_default();
        self.index = 0;

        if let Some(ref user) = self.user {
            log::debug!("Resumed session of {:?}", user.name);
        }
        self.user.as_ref()
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageManager<K> {
        &self.storage
    }

    /// Signed-in user
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Registry snapshot
    pub fn registry(&self) -> &[User] {
        &self.registry
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCOUNTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Register a new user and sign them in
    pub fn register(&mut self, form: &RegistrationForm) -> VaultResult<&User> {
        let registry = self.storage.load_registry().unwrap_or_default();

        let report = validation::validate_registration(form, &registry, None);
        if !report.is_valid() {
            return Err(VaultError::Validation(report));
        }

        let user = User::with_credentials(form.username.as_str(), form.password.as_str());
        self.registry = self.storage.commit(&user, &registry)?;
        self.index = 0;

        log::info!("Registered user {}", form.username);
        Ok(self.user.insert(user))
    }

    /// Change the signed-in user's name and password, keeping their photos
    pub fn update_account(&mut self, form: &RegistrationForm) -> VaultResult<&User> {
        let current = self.user.as_ref().ok_or(VaultError::NotSignedIn)?;
        let own_name = current.name.clone();

        let report = validation::validate_registration(form, &self.registry, own_name.as_deref());
        if !report.is_valid() {
            return Err(VaultError::Validation(report));
        }

        let mut user = User::with_credentials(form.username.as_str(), form.password.as_str());
        user.photos = current.photos.clone();

        let remaining: Vec<User> = self
            .registry
            .iter()
            .filter(|existing| existing.name != own_name)
            .cloned()
            .collect();

        self.registry = self.storage.commit(&user, &remaining)?;

        log::info!("Account {:?} changed to {}", own_name, form.username);
        Ok(self.user.insert(user))
    }

    /// Sign in against the stored registry
    pub fn sign_in(&mut self, username: &str, password: &str) -> VaultResult<&User> {
        let registry = self.storage.load_registry().unwrap_or_default();

        let user = validation::sign_in(
            &validation::strip_spaces(username),
            &validation::strip_spaces(password),
            &registry,
        )
        .map_err(|e| {
            log::debug!("Sign-in refused for {}: {}", username, e);
            e
        })?;

        self.storage.save_current_user(&user)?;
        self.registry = registry;
        self.index = 0;

        log::info!("Signed in {}", username);
        Ok(self.user.insert(user))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PHOTO OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Store `bytes` and append a new photo. It becomes the current photo.
    ///
    /// If the commit fails the stored image is deleted again and the session
    /// is left as it was.
    pub fn add_photo(&mut self, bytes: &[u8]) -> VaultResult<String> {
        let mut user = self.signed_in()?.clone();

        let name = self.storage.save_image(bytes)?;
        let index = user.push_photo(Photo::new(name.as_str(), false));

        if let Err(e) = self.commit_user(user, index) {
            if let Err(cleanup) = self.storage.delete_image(&name) {
                log::warn!("Failed to delete image {} after aborted add: {}", name, cleanup);
            }
            return Err(e);
        }

        Ok(name)
    }

    /// Flip the liked flag of the photo at `index`. Returns the new flag.
    pub fn toggle_like(&mut self, index: usize) -> VaultResult<bool> {
        let mut user = self.signed_in()?.clone();

        let photo = photo_at_mut(&mut user, index)?;
        photo.is_liked = !photo.is_liked;
        let liked = photo.is_liked;

        self.commit_user(user, self.index)?;
        Ok(liked)
    }

    /// Set the comment of the photo at `index`.
    ///
    /// Empty text leaves the comment untouched and returns `false`.
    pub fn edit_comment(&mut self, index: usize, text: &str) -> VaultResult<bool> {
        if text.is_empty() {
            return Ok(false);
        }

        let mut user = self.signed_in()?.clone();
        photo_at_mut(&mut user, index)?.comment = Some(text.to_string());

        self.commit_user(user, self.index)?;
        Ok(true)
    }

    /// Remove the photo at `index` (every photo with its name).
    ///
    /// Returns the new current index, or `None` once no photos are left.
    pub fn remove_photo(&mut self, index: usize) -> VaultResult<Option<usize>> {
        let removed = self.photo(index)?.name.clone();
        let mut user = self.signed_in()?.clone();

        let remaining: Vec<Photo> = user
            .photos()
            .iter()
            .filter(|photo| photo.name != removed)
            .cloned()
            .collect();

        let next_index = if remaining.is_empty() {
            user.photos = None;
            None
        } else {
            let last = remaining.len() - 1;
            user.photos = Some(remaining);
            Some(if index > 0 { (index - 1).min(last) } else { last })
        };

        self.commit_user(user, next_index.unwrap_or(0))?;

        if self.config.delete_removed_images {
            self.storage.delete_image(&removed)?;
        } else {
            log::debug!("Photo {} removed, image file kept", removed);
        }

        Ok(next_index)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BROWSING
    // ═══════════════════════════════════════════════════════════════════════

    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Photo at the current index
    pub fn current_photo(&self) -> Option<&Photo> {
        self.user.as_ref()?.photos().get(self.index)
    }

    pub fn set_index(&mut self, index: usize) -> VaultResult<()> {
        self.photo(index)?;
        self.index = index;
        Ok(())
    }

    /// Move to the next photo, wrapping to the first
    pub fn next(&mut self) -> Option<usize> {
        let count = self.user.as_ref()?.photo_count();
        if count == 0 {
            return None;
        }
        self.index = if self.index + 1 < count { self.index + 1 } else { 0 };
        Some(self.index)
    }

    /// Move to the previous photo, wrapping to the last
    pub fn previous(&mut self) -> Option<usize> {
        let count = self.user.as_ref()?.photo_count();
        if count == 0 {
            return None;
        }
        self.index = if self.index > 0 && self.index < count { self.index - 1 } else { count - 1 };
        Some(self.index)
    }

    /// Liked subset of the signed-in user's photos
    pub fn liked_photos(&self) -> Vec<&Photo> {
        self.user.as_ref().map(User::liked_photos).unwrap_or_default()
    }

    /// Make the n-th liked photo current. Returns its full index.
    pub fn open_liked(&mut self, liked_index: usize) -> VaultResult<usize> {
        let user = self.user.as_ref().ok_or(VaultError::NotSignedIn)?;
        let index = user
            .liked_index_to_full(liked_index)
            .ok_or(VaultError::PhotoIndexOutOfRange {
                index: liked_index,
                len: user.liked_count(),
            })?;
        self.index = index;
        Ok(index)
    }

    /// Image bytes of the photo at `index`; `None` if the file is gone
    pub fn load_photo_image(&self, index: usize) -> VaultResult<Option<Vec<u8>>> {
        let name = &self.photo(index)?.name;
        Ok(self.storage.load_image(name))
    }

    /// Grid thumbnail of the photo at `index`
    pub fn load_thumbnail(&self, index: usize) -> VaultResult<Option<Vec<u8>>> {
        match self.load_photo_image(index)? {
            Some(data) => Ok(Some(self.thumbs.generate(&data)?)),
            None => Ok(None),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // MAINTENANCE
    // ═══════════════════════════════════════════════════════════════════════

    /// Stored images no registered user points at
    pub fn orphaned_images(&self) -> VaultResult<Vec<String>> {
        let registry = self.storage.load_registry().unwrap_or_default();
        self.storage.orphaned_images(&registry)
    }

    /// Delete stored images no registered user points at
    pub fn purge_orphans(&self) -> VaultResult<Vec<String>> {
        let registry = self.storage.load_registry().unwrap_or_default();
        self.storage.purge_orphans(&registry)
    }

    /// Counts for the signed-in user and the store
    pub fn stats(&self) -> VaultResult<VaultStats> {
        let user = self.user.as_ref().ok_or(VaultError::NotSignedIn)?;
        let photos = user.photos();

        Ok(VaultStats {
            users: self.registry.len(),
            photos: photos.len(),
            liked: user.liked_count(),
            commented: photos.iter().filter(|p| p.comment.is_some()).count(),
            stored_images: self.storage.list_images()?.len(),
            stored_bytes: self.storage.images_size(),
            orphaned_images: self.orphaned_images()?.len(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    fn signed_in(&self) -> VaultResult<&User> {
        self.user.as_ref().ok_or(VaultError::NotSignedIn)
    }

    fn photo(&self, index: usize) -> VaultResult<&Photo> {
        let photos = self.signed_in()?.photos();
        photos.get(index).ok_or(VaultError::PhotoIndexOutOfRange {
            index,
            len: photos.len(),
        })
    }

    /// Commit `user` together with the registry, then make it the session
    /// user. Nothing in the session changes when the commit fails.
    fn commit_user(&mut self, user: User, index: usize) -> VaultResult<()> {
        self.registry = self.storage.commit(&user, &self.registry)?;
        self.user = Some(user);
        self.index = index;
        Ok(())
    }
}

fn photo_at_mut(user: &mut User, index: usize) -> VaultResult<&mut Photo> {
    let len = user.photo_count();
    user.photos
        .as_mut()
        .and_then(|photos| photos.get_mut(index))
        .ok_or(VaultError::PhotoIndexOutOfRange { index, len })
}

/// Vault statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultStats {
    pub users: usize,
    pub photos: usize,
    pub liked: usize,
    pub commented: usize,
    pub stored_images: usize,
    pub stored_bytes: u64,
    pub orphaned_images: usize,
}
