//! Photo Vault - Validation Rules
//!
//! Registration form checks and sign-in credential lookup against the
//! registry.

use std::fmt;
use thiserror::Error;

use crate::model::User;

/// A username must be longer than this many characters
pub const MIN_USERNAME_CHARS: usize = 3;
/// A password must be longer than this many characters
pub const MIN_PASSWORD_CHARS: usize = 5;

/// Field-level warning shown next to a rejected input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWarning {
    UsernameTooShort,
    UsernameTaken,
    PasswordTooShort,
    PasswordMismatch,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FieldWarning::UsernameTooShort => "Username must contain 4+ characters",
            FieldWarning::UsernameTaken => "Username is taken",
            FieldWarning::PasswordTooShort => "Password must contain 6+ characters",
            FieldWarning::PasswordMismatch => "Passwords do not match",
        };
        f.write_str(text)
    }
}

/// Outcome of checking a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// Passed (checkmark shown)
    Valid,
    /// Not checked on its own; counts as valid and shows nothing
    Skipped,
    /// Rejected with a warning
    Invalid(FieldWarning),
}

impl FieldStatus {
    pub fn is_valid(&self) -> bool {
        !matches!(self, FieldStatus::Invalid(_))
    }

    pub fn warning(&self) -> Option<FieldWarning> {
        match self {
            FieldStatus::Invalid(warning) => Some(*warning),
            _ => None,
        }
    }
}

/// Registration / account-change form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm: String,
}

impl RegistrationForm {
    pub fn new(username: &str, password: &str, confirm: &str) -> Self {
        Self {
            username: strip_spaces(username),
            password: strip_spaces(password),
            confirm: strip_spaces(confirm),
        }
    }
}

/// Per-field result of registration validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationReport {
    pub username: FieldStatus,
    pub password: FieldStatus,
    pub confirm: FieldStatus,
}

impl RegistrationReport {
    /// All three fields passed
    pub fn is_valid(&self) -> bool {
        self.username.is_valid() && self.password.is_valid() && self.confirm.is_valid()
    }

    /// Warnings in field order
    pub fn warnings(&self) -> Vec<FieldWarning> {
        [self.username, self.password, self.confirm]
            .iter()
            .filter_map(FieldStatus::warning)
            .collect()
    }
}

impl fmt::Display for RegistrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let warnings: Vec<String> = self.warnings().iter().map(ToString::to_string).collect();
        if warnings.is_empty() {
            f.write_str("ok")
        } else {
            f.write_str(&warnings.join("; "))
        }
    }
}

/// Remove spaces; credential fields never contain them
pub fn strip_spaces(input: &str) -> String {
    input.chars().filter(|c| *c != ' ').collect()
}

/// Check the username field.
///
/// `signed_in` is the current name of the user editing their own account;
/// their own registry entry is then not counted as taken.
pub fn check_username(username: &str, registry: &[User], signed_in: Option<&str>) -> FieldStatus {
    if username.chars().count() <= MIN_USERNAME_CHARS {
        return FieldStatus::Invalid(FieldWarning::UsernameTooShort);
    }

    let taken = registry
        .iter()
        .filter(|user| signed_in.map_or(true, |own| !user.is_named(Some(own))))
        .any(|user| user.is_named(Some(username)));

    if taken {
        FieldStatus::Invalid(FieldWarning::UsernameTaken)
    } else {
        FieldStatus::Valid
    }
}

/// Check the password field
pub fn check_password(password: &str) -> FieldStatus {
    if password.chars().count() > MIN_PASSWORD_CHARS {
        FieldStatus::Valid
    } else {
        FieldStatus::Invalid(FieldWarning::PasswordTooShort)
    }
}

/// Check the confirmation field. Skipped while the password itself is rejected.
pub fn check_confirm(password_status: FieldStatus, password: &str, confirm: &str) -> FieldStatus {
    if !password_status.is_valid() {
        return FieldStatus::Skipped;
    }

    if password == confirm {
        FieldStatus::Valid
    } else {
        FieldStatus::Invalid(FieldWarning::PasswordMismatch)
    }
}

/// Check all three registration fields
pub fn validate_registration(
    form: &RegistrationForm,
    registry: &[User],
    signed_in: Option<&str>,
) -> RegistrationReport {
    let username = check_username(&form.username, registry, signed_in);
    let password = check_password(&form.password);
    let confirm = check_confirm(password, &form.password, &form.confirm);

    RegistrationReport {
        username,
        password,
        confirm,
    }
}

/// Why a sign-in was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInError {
    #[error("Unknown username")]
    UnknownUsername,

    #[error("Wrong password")]
    WrongPassword,
}

/// Look up `username`/`password` in the registry.
///
/// On success the returned user is built from the given credentials and
/// carries the photos of the matching registry entry.
pub fn sign_in(username: &str, password: &str, registry: &[User]) -> Result<User, SignInError> {
    let matching = registry
        .iter()
        .find(|user| user.is_named(Some(username)) && user.password.as_deref() == Some(password));

    match matching {
        Some(stored) => {
            let mut user = User::with_credentials(username, password);
            user.photos = stored.photos.clone();
            Ok(user)
        }
        None if registry.iter().any(|user| user.is_named(Some(username))) => {
            Err(SignInError::WrongPassword)
        }
        None => Err(SignInError::UnknownUsername),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Photo;

    fn registry() -> Vec<User> {
        let mut alice = User::with_credentials("alice", "secret1");
        alice.push_photo(Photo::new("p1", false));
        vec![alice, User::with_credentials("carol", "secret3")]
    }

    #[test]
    fn test_short_username_always_fails() {
        for name in ["", "a", "ab", "abc"] {
            let form = RegistrationForm::new(name, "secret99", "secret99");
            let report = validate_registration(&form, &[], None);
            assert_eq!(report.username, FieldStatus::Invalid(FieldWarning::UsernameTooShort));
            assert!(!report.is_valid());
        }
    }

    #[test]
    fn test_short_password_fails() {
        for password in ["", "12345", "abcde"] {
            assert_eq!(
                check_password(password),
                FieldStatus::Invalid(FieldWarning::PasswordTooShort)
            );
        }
        assert_eq!(check_password("123456"), FieldStatus::Valid);
    }

    #[test]
    fn test_confirm_skipped_when_password_fails() {
        let form = RegistrationForm::new("dave", "123", "999");
        let report = validate_registration(&form, &[], None);

        assert_eq!(report.confirm, FieldStatus::Skipped);
        assert_eq!(report.confirm.warning(), None);
        assert_eq!(report.warnings(), vec![FieldWarning::PasswordTooShort]);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_confirm_mismatch() {
        let form = RegistrationForm::new("dave", "secret99", "secret98");
        let report = validate_registration(&form, &[], None);

        assert_eq!(report.confirm, FieldStatus::Invalid(FieldWarning::PasswordMismatch));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_username_taken() {
        let form = RegistrationForm::new("alice", "secret99", "secret99");
        let report = validate_registration(&form, &registry(), None);

        assert_eq!(report.username, FieldStatus::Invalid(FieldWarning::UsernameTaken));
        assert_eq!(report.to_string(), "Username is taken");
    }

    #[test]
    fn test_self_edit_excludes_own_entry() {
        let registry = registry();

        let keep_name = RegistrationForm::new("alice", "secret99", "secret99");
        assert!(validate_registration(&keep_name, &registry, Some("alice")).is_valid());

        let rename = RegistrationForm::new("alicia", "secret99", "secret99");
        assert!(validate_registration(&rename, &registry, Some("alice")).is_valid());

        let steal = RegistrationForm::new("carol", "secret99", "secret99");
        let report = validate_registration(&steal, &registry, Some("alice"));
        assert_eq!(report.username, FieldStatus::Invalid(FieldWarning::UsernameTaken));
    }

    #[test]
    fn test_valid_registration() {
        let form = RegistrationForm::new("dave", "secret99", "secret99");
        let report = validate_registration(&form, &registry(), None);
        assert!(report.is_valid());
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_spaces_are_stripped() {
        let form = RegistrationForm::new(" da ve ", "secret 99", "secret99");
        assert_eq!(form.username, "dave");
        assert_eq!(form.password, "secret99");
    }

    #[test]
    fn test_sign_in_carries_photos() {
        let user = sign_in("alice", "secret1", &registry()).unwrap();
        assert_eq!(user.name.as_deref(), Some("alice"));
        assert_eq!(user.photos, Some(vec![Photo::new("p1", false)]));
    }

    #[test]
    fn test_sign_in_wrong_password() {
        assert_eq!(sign_in("alice", "wrong", &registry()), Err(SignInError::WrongPassword));
    }

    #[test]
    fn test_sign_in_unknown_username() {
        assert_eq!(sign_in("bob", "x", &registry()), Err(SignInError::UnknownUsername));
        assert_eq!(sign_in("bob", "x", &[]), Err(SignInError::UnknownUsername));
    }
}
