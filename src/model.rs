//! Photo Vault - Data Model
//!
//! `User` and `Photo` as they are persisted in the key-value store.

use serde::{Deserialize, Serialize};

/// A photo owned by a user.
///
/// `name` is the generated storage key of the image bytes in the flat-file
/// store. It is unique within the owner's photo sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Generated unique ID, doubles as the image file name
    pub name: String,
    /// Optional user comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Liked flag
    pub is_liked: bool,
}

impl Photo {
    /// Create a new photo record
    pub fn new(name: impl Into<String>, is_liked: bool) -> Self {
        Self {
            name: name.into(),
            comment: None,
            is_liked,
        }
    }
}

/// A registered user.
///
/// `photos` is `None` when the user has no photos; an empty sequence is
/// never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique username
    #[serde(default)]
    pub name: Option<String>,
    /// Plaintext password
    #[serde(default)]
    pub password: Option<String>,
    /// Photos in display order
    #[serde(default)]
    pub photos: Option<Vec<Photo>>,
}

impl User {
    /// Build a user from sign-in or registration form fields
    pub fn with_credentials(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            password: Some(password.into()),
            photos: None,
        }
    }

    /// Photos as a slice, empty when the user has none
    pub fn photos(&self) -> &[Photo] {
        self.photos.as_deref().unwrap_or(&[])
    }

    /// Number of photos
    pub fn photo_count(&self) -> usize {
        self.photos().len()
    }

    /// Liked subset, in display order
    pub fn liked_photos(&self) -> Vec<&Photo> {
        self.photos().iter().filter(|p| p.is_liked).collect()
    }

    /// Number of liked photos
    pub fn liked_count(&self) -> usize {
        self.photos().iter().filter(|p| p.is_liked).count()
    }

    /// Map the n-th liked photo to its index in the full sequence.
    ///
    /// Resolved by name: the full index is the position of the photo whose
    /// name matches the n-th liked photo.
    pub fn liked_index_to_full(&self, liked_index: usize) -> Option<usize> {
        let target = self.liked_photos().get(liked_index)?.name.clone();
        self.photos().iter().position(|p| p.name == target)
    }

    /// Append a photo, creating the sequence if absent. Returns its index.
    pub fn push_photo(&mut self, photo: Photo) -> usize {
        let photos = self.photos.get_or_insert_with(Vec::new);
        photos.push(photo);
        photos.len() - 1
    }

    /// Whether this user's name equals `name`
    pub fn is_named(&self, name: Option<&str>) -> bool {
        self.name.as_deref() == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str, liked: bool) -> Photo {
        Photo::new(name, liked)
    }

    #[test]
    fn test_liked_index_mapping() {
        let user = User {
            photos: Some(vec![photo("n1", false), photo("n2", true), photo("n3", true)]),
            ..User::with_credentials("alice", "secret1")
        };

        assert_eq!(user.liked_count(), 2);
        assert_eq!(user.liked_index_to_full(0), Some(1));
        assert_eq!(user.liked_index_to_full(1), Some(2));
        assert_eq!(user.liked_index_to_full(2), None);
    }

    #[test]
    fn test_push_photo_creates_sequence() {
        let mut user = User::with_credentials("alice", "secret1");
        assert!(user.photos.is_none());

        assert_eq!(user.push_photo(photo("a", false)), 0);
        assert_eq!(user.push_photo(photo("b", false)), 1);
        assert_eq!(user.photo_count(), 2);
    }

    #[test]
    fn test_json_shape() {
        let user = User {
            photos: Some(vec![photo("p1", true)]),
            ..User::with_credentials("alice", "secret1")
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["name"], "alice");
        assert_eq!(json["photos"][0]["isLiked"], true);
        assert!(json["photos"][0].get("comment").is_none());

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_missing_fields_deserialize() {
        let user: User = serde_json::from_str("{}").unwrap();
        assert_eq!(user, User::default());
    }
}
