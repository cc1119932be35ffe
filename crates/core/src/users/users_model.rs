//! User domain models.

use serde::{Deserialize, Serialize};

/// Domain model for the signed-in user's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Partial profile update.
///
/// Email is deliberately absent: it is immutable by convention and no code
/// path offers to change it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    /// Merges the set fields into `user`, leaving the rest untouched.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(avatar) = &self.avatar {
            user.avatar = Some(avatar.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar.is_none()
    }
}
