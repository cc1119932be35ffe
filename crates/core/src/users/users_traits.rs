use crate::errors::Result;
use crate::users::users_model::{ProfileUpdate, User};
use async_trait::async_trait;

/// Trait for profile storage operations.
///
/// Implemented by the in-memory demo backend and by the gateway's
/// `profiles` table client.
#[async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    /// Loads the profile row for `user_id`, if one exists.
    async fn fetch(&self, user_id: &str) -> Result<Option<User>>;

    /// Creates or replaces the profile row.
    async fn upsert(&self, user: User) -> Result<User>;

    /// Applies a partial update to the profile row for `user_id`.
    async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<()>;
}
