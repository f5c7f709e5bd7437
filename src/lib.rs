//! # Photo Vault
//!
//! Personal photo vault persisted to local storage. Users register or sign
//! in with a username and password, then store, view, like, comment on and
//! delete photos.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       PHOTO VAULT                         │
//! │  ┌─────────────┐  ┌──────────────────┐  ┌──────────────┐  │
//! │  │ VALIDATION  │  │ SESSION + PHOTOS │  │ CODEC/THUMBS │  │
//! │  └──────┬──────┘  └────────┬─────────┘  └──────┬───────┘  │
//! │         │                  │                   │          │
//! │  ┌──────┴──────────────────┴───────────────────┴───────┐  │
//! │  │                   STORAGE MANAGER                    │  │
//! │  │   current user + registry  │  image bytes by name    │  │
//! │  └──────────────┬─────────────┴───────────┬────────────┘  │
//! │  ┌──────────────┴──────────┐  ┌───────────┴────────────┐  │
//! │  │  KEY-VALUE (SQLite)     │  │  FLAT-FILE STORE       │  │
//! │  └─────────────────────────┘  └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Model
//!
//! - Current user and registry are JSON records in a SQLite key-value table
//! - Both records are written in one transaction after every mutation
//! - Photo bytes live one file per photo, named by a generated UUID
//! - Passwords are stored in plaintext

pub mod codec;
pub mod config;
pub mod error;
pub mod image_fs;
pub mod kv;
pub mod model;
pub mod storage;
pub mod thumbs;
pub mod validation;
pub mod vault;

pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use model::{Photo, User};
pub use storage::StorageManager;
pub use validation::{RegistrationForm, RegistrationReport, SignInError};
pub use vault::{PhotoVault, VaultStats};

/// Photo Vault version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
