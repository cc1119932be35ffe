//! Remote repository for the `smart_alerts` table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use finanzasduo_core::alerts::{AlertType, NewSmartAlert, SmartAlert, SmartAlertRepositoryTrait};
use finanzasduo_core::errors::{GatewayError, Result};

use crate::client::GatewayClient;

const TABLE_PATH: &str = "/rest/v1/smart_alerts";

#[derive(Debug, Deserialize)]
struct SmartAlertRow {
    id: String,
    user_id: String,
    #[serde(rename = "type")]
    alert_type: AlertType,
    title: String,
    message: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    read: bool,
}

impl From<SmartAlertRow> for SmartAlert {
    fn from(row: SmartAlertRow) -> Self {
        SmartAlert {
            id: row.id,
            user_id: row.user_id,
            alert_type: row.alert_type,
            title: row.title,
            message: row.message,
            created_at: row.created_at,
            read: row.read,
        }
    }
}

/// Insert row. Alerts are born unread; id and creation time come from the
/// table defaults.
#[derive(Serialize)]
struct InsertSmartAlertRow<'a> {
    user_id: &'a str,
    #[serde(rename = "type")]
    alert_type: AlertType,
    title: &'a str,
    message: &'a str,
    read: bool,
}

#[derive(Serialize)]
struct MarkReadRow {
    read: bool,
}

fn list_path(user_id: &str) -> String {
    format!(
        "{TABLE_PATH}?user_id=eq.{}&select=*&order=created_at.desc",
        urlencoding::encode(user_id)
    )
}

fn row_path(user_id: &str, id: &str) -> String {
    format!(
        "{TABLE_PATH}?id=eq.{}&user_id=eq.{}",
        urlencoding::encode(id),
        urlencoding::encode(user_id)
    )
}

/// Smart alert repository backed by the remote gateway.
pub struct GatewaySmartAlertRepository {
    client: Arc<GatewayClient>,
}

impl GatewaySmartAlertRepository {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SmartAlertRepositoryTrait for GatewaySmartAlertRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SmartAlert>> {
        let rows: Vec<SmartAlertRow> = self.client.get(&list_path(user_id)).await?;
        Ok(rows.into_iter().map(SmartAlert::from).collect())
    }

    async fn insert(&self, user_id: &str, new_alert: NewSmartAlert) -> Result<SmartAlert> {
        let row = InsertSmartAlertRow {
            user_id,
            alert_type: new_alert.alert_type,
            title: &new_alert.title,
            message: &new_alert.message,
            read: false,
        };

        let mut rows: Vec<SmartAlertRow> = self.client.insert(TABLE_PATH, &row).await?;
        if rows.is_empty() {
            return Err(
                GatewayError::Decode("insert returned no representation".to_string()).into(),
            );
        }
        Ok(rows.remove(0).into())
    }

    async fn mark_read(&self, user_id: &str, id: &str) -> Result<()> {
        self.client
            .patch_no_content(&row_path(user_id, id), &MarkReadRow { read: true })
            .await
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        self.client.delete_no_content(&row_path(user_id, id)).await
    }
}
