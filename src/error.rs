//! Photo Vault - Error Types

use thiserror::Error;

use crate::validation::{RegistrationReport, SignInError};

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    // ═══════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Registration rejected: {0}")]
    Validation(RegistrationReport),

    #[error("Sign-in failed: {0}")]
    SignIn(#[from] SignInError),

    // ═══════════════════════════════════════════════════════════════
    // SESSION ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Photo index {index} out of range (photos: {len})")]
    PhotoIndexOutOfRange { index: usize, len: usize },

    // ═══════════════════════════════════════════════════════════════
    // FILE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Vault not found at: {0}")]
    VaultNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Image processing error: {0}")]
    ImageError(String),
}

impl VaultError {
    /// Errors the user can fix by changing what they typed or picked
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            VaultError::Validation(_)
                | VaultError::SignIn(_)
                | VaultError::PhotoIndexOutOfRange { .. }
        )
    }

    /// "Nothing to show" conditions that should degrade to an empty view
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VaultError::NotSignedIn | VaultError::ImageNotFound(_) | VaultError::VaultNotFound(_)
        )
    }
}

impl From<rusqlite::Error> for VaultError {
    fn from(e: rusqlite::Error) -> Self {
        VaultError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(e: serde_json::Error) -> Self {
        VaultError::SerializationError(e.to_string())
    }
}

impl From<image::ImageError> for VaultError {
    fn from(e: image::ImageError) -> Self {
        VaultError::ImageError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(VaultError::SignIn(SignInError::WrongPassword).is_user_correctable());
        assert!(VaultError::NotSignedIn.is_not_found());
        assert!(!VaultError::DatabaseError("locked".into()).is_user_correctable());
    }
}
