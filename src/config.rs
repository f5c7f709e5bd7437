//! Photo Vault - Configuration
//!
//! The vault manifest (`vault.json`) and on-disk layout.

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

/// Manifest file name inside the vault root
pub const MANIFEST_FILE: &str = "vault.json";

/// Vault configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault name
    pub name: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last access timestamp
    pub last_access: DateTime<Utc>,
    /// Version
    pub version: String,
    /// JPEG quality used when normalizing picked images (1-100)
    pub jpeg_quality: u8,
    /// Grid thumbnail size (square)
    pub thumb_size: u32,
    /// Delete the image file when its photo is removed
    pub delete_removed_images: bool,
    /// Vault root (not persisted)
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            name: "Photo Vault".into(),
            created_at: Utc::now(),
            last_access: Utc::now(),
            version: crate::VERSION.into(),
            jpeg_quality: 100,
            thumb_size: 256,
            delete_removed_images: false,
            root: PathBuf::from("./vault"),
        }
    }
}

impl VaultConfig {
    /// Default configuration rooted at `root`
    pub fn at<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load the manifest under `root`, or write a fresh one.
    ///
    /// Touches `last_access` either way.
    pub fn load_or_create<P: AsRef<Path>>(root: P) -> VaultResult<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;

        let manifest = root.join(MANIFEST_FILE);
        let mut config = if manifest.exists() {
            let data = std::fs::read(&manifest)?;
            serde_json::from_slice::<VaultConfig>(&data).map_err(|e| {
                VaultError::SerializationError(format!("Manifest {}: {}", manifest.display(), e))
            })?
        } else {
            log::info!("Creating vault manifest at {}", manifest.display());
            VaultConfig::default()
        };

        config.root = root.to_path_buf();
        config.last_access = Utc::now();
        config.save()?;

        Ok(config)
    }

    /// Load the manifest of an existing vault
    pub fn open<P: AsRef<Path>>(root: P) -> VaultResult<Self> {
        let root = root.as_ref();
        if !root.join(MANIFEST_FILE).exists() {
            return Err(VaultError::VaultNotFound(root.display().to_string()));
        }
        Self::load_or_create(root)
    }

    /// Persist the manifest
    pub fn save(&self) -> VaultResult<()> {
        let data = serde_json::to_vec_pretty(self)?;
        std::fs::write(self.root.join(MANIFEST_FILE), data)?;
        Ok(())
    }

    /// Directory holding photo files
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// SQLite key-value database
    pub fn db_path(&self) -> PathBuf {
        self.root.join("db").join("store.db")
    }
}
