//! Remote repository for the `profiles` table.
//!
//! Profiles are keyed on the auth user id, one row per account, so the
//! surface is fetch/upsert/update rather than a full collection.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use finanzasduo_core::errors::{Error, GatewayError, Result};
use finanzasduo_core::users::{ProfileRepositoryTrait, ProfileUpdate, User};

use crate::client::GatewayClient;
use crate::store::is_empty_patch;

const TABLE_PATH: &str = "/rest/v1/profiles";

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: String,
    email: String,
    name: String,
    #[serde(default)]
    avatar: Option<String>,
}

impl From<ProfileRow> for User {
    fn from(row: ProfileRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            avatar: row.avatar,
        }
    }
}

#[derive(Serialize)]
struct UpsertProfileRow<'a> {
    id: &'a str,
    email: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdateProfileRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<&'a str>,
}

fn row_path(user_id: &str) -> String {
    format!("{TABLE_PATH}?id=eq.{}", urlencoding::encode(user_id))
}

/// Profile repository backed by the remote gateway.
pub struct GatewayProfileRepository {
    client: Arc<GatewayClient>,
}

impl GatewayProfileRepository {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileRepositoryTrait for GatewayProfileRepository {
    async fn fetch(&self, user_id: &str) -> Result<Option<User>> {
        let path = format!("{}&select=*", row_path(user_id));
        let rows: Vec<ProfileRow> = self.client.get(&path).await?;
        Ok(rows.into_iter().next().map(User::from))
    }

    async fn upsert(&self, user: User) -> Result<User> {
        let row = UpsertProfileRow {
            id: &user.id,
            email: &user.email,
            name: &user.name,
            avatar: user.avatar.as_deref(),
        };

        let mut rows: Vec<ProfileRow> = self.client.upsert(TABLE_PATH, &row).await?;
        if rows.is_empty() {
            return Err(
                GatewayError::Decode("upsert returned no representation".to_string()).into(),
            );
        }
        Ok(rows.remove(0).into())
    }

    async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<()> {
        let row = UpdateProfileRow {
            name: update.name.as_deref(),
            avatar: update.avatar.as_deref(),
        };
        let patch = serde_json::to_value(&row)
            .map_err(|e| Error::Unexpected(format!("Failed to serialize update: {e}")))?;
        if is_empty_patch(&patch) {
            return Ok(());
        }
        self.client
            .patch_no_content(&row_path(user_id), &patch)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_maps_into_the_domain_model() {
        let json = r#"{
            "id": "u-1",
            "email": "maria@email.com",
            "name": "María García",
            "avatar": null,
            "created_at": "2025-11-02T10:00:00+00:00"
        }"#;
        let user = User::from(serde_json::from_str::<ProfileRow>(json).unwrap());

        assert_eq!(user.id, "u-1");
        assert_eq!(user.email, "maria@email.com");
        assert_eq!(user.name, "María García");
        assert_eq!(user.avatar, None);
    }

    #[test]
    fn test_upsert_row_skips_a_missing_avatar() {
        let row = UpsertProfileRow {
            id: "u-1",
            email: "maria@email.com",
            name: "María García",
            avatar: None,
        };
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["id"], "u-1");
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn test_update_row_only_carries_set_fields() {
        let update = ProfileUpdate {
            name: Some("María G.".to_string()),
            avatar: None,
        };
        let row = UpdateProfileRow {
            name: update.name.as_deref(),
            avatar: update.avatar.as_deref(),
        };
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["name"], "María G.");
    }
}
