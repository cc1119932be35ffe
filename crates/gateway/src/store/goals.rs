//! Remote repository for the `saving_goals` table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finanzasduo_core::errors::{Error, GatewayError, Result};
use finanzasduo_core::goals::{NewSavingGoal, SavingGoal, SavingGoalRepositoryTrait, SavingGoalUpdate};

use crate::client::GatewayClient;
use crate::store::is_empty_patch;

const TABLE_PATH: &str = "/rest/v1/saving_goals";

#[derive(Debug, Deserialize)]
struct SavingGoalRow {
    id: String,
    user_id: String,
    name: String,
    target_amount: Decimal,
    current_amount: Decimal,
    #[serde(default)]
    deadline: Option<NaiveDate>,
    #[serde(default)]
    is_shared: bool,
}

impl From<SavingGoalRow> for SavingGoal {
    fn from(row: SavingGoalRow) -> Self {
        SavingGoal {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            target_amount: row.target_amount,
            current_amount: row.current_amount,
            deadline: row.deadline,
            is_shared: row.is_shared,
        }
    }
}

/// Insert row. Goals always start with nothing accumulated; progress comes
/// from approved saving transactions and explicit edits afterwards.
#[derive(Serialize)]
struct InsertSavingGoalRow<'a> {
    user_id: &'a str,
    name: &'a str,
    target_amount: Decimal,
    current_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<NaiveDate>,
    is_shared: bool,
}

/// Update row. The nested deadline option keeps the distinction between
/// "leave the deadline alone" (outer `None`, field skipped) and "clear it"
/// (inner `None`, serialized as an explicit null).
#[derive(Serialize)]
struct UpdateSavingGoalRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_shared: Option<bool>,
}

impl<'a> UpdateSavingGoalRow<'a> {
    fn new(update: &'a SavingGoalUpdate) -> Self {
        Self {
            name: update.name.as_deref(),
            target_amount: update.target_amount,
            current_amount: update.current_amount,
            deadline: update.deadline,
            is_shared: update.is_shared,
        }
    }
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

/// Saving goal repository backed by the remote gateway.
pub struct GatewaySavingGoalRepository {
    client: Arc<GatewayClient>,
}

impl GatewaySavingGoalRepository {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SavingGoalRepositoryTrait for GatewaySavingGoalRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavingGoal>> {
        let rows: Vec<SavingGoalRow> = self.client.get(&list_path(user_id)).await?;
        Ok(rows.into_iter().map(SavingGoal::from).collect())
    }

    async fn insert(&self, user_id: &str, new_goal: NewSavingGoal) -> Result<SavingGoal> {
        let row = InsertSavingGoalRow {
            user_id,
            name: &new_goal.name,
            target_amount: new_goal.target_amount,
            current_amount: Decimal::ZERO,
            deadline: new_goal.deadline,
            is_shared: new_goal.is_shared,
        };

        let mut rows: Vec<SavingGoalRow> = self.client.insert(TABLE_PATH, &row).await?;
        if rows.is_empty() {
            return Err(
                GatewayError::Decode("insert returned no representation".to_string()).into(),
            );
        }
        Ok(rows.remove(0).into())
    }

    async fn update(&self, user_id: &str, id: &str, update: SavingGoalUpdate) -> Result<()> {
        let patch = serde_json::to_value(UpdateSavingGoalRow::new(&update))
            .map_err(|e| Error::Unexpected(format!("Failed to serialize update: {e}")))?;
        if is_empty_patch(&patch) {
            return Ok(());
        }
        self.client
            .patch_no_content(&row_path(user_id, id), &patch)
            .await
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        self.client.delete_no_content(&row_path(user_id, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_maps_into_the_domain_model() {
        let json = r#"{
            "id": "g-1",
            "user_id": "u-1",
            "name": "Vacaciones en Japón",
            "target_amount": 3000,
            "current_amount": 1250.5,
            "deadline": "2027-06-01",
            "is_shared": true,
            "created_at": "2026-01-10T08:00:00+00:00"
        }"#;
        let goal = SavingGoal::from(serde_json::from_str::<SavingGoalRow>(json).unwrap());

        assert_eq!(goal.name, "Vacaciones en Japón");
        assert_eq!(goal.current_amount, dec!(1250.5));
        assert_eq!(goal.deadline, NaiveDate::from_ymd_opt(2027, 6, 1));
        assert!(goal.is_shared);
    }

    #[test]
    fn test_insert_row_zeroes_the_accumulated_amount() {
        let new_goal = NewSavingGoal {
            name: "Fondo de emergencia".to_string(),
            target_amount: dec!(5000),
            deadline: None,
            is_shared: false,
        };
        let row = InsertSavingGoalRow {
            user_id: "u-1",
            name: &new_goal.name,
            target_amount: new_goal.target_amount,
            current_amount: Decimal::ZERO,
            deadline: new_goal.deadline,
            is_shared: new_goal.is_shared,
        };
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["current_amount"], 0.0);
        assert!(json.get("deadline").is_none());
    }

    #[test]
    fn test_update_row_distinguishes_clearing_the_deadline_from_keeping_it() {
        let keep = serde_json::to_value(UpdateSavingGoalRow::new(&SavingGoalUpdate {
            name: Some("Coche nuevo".to_string()),
            ..Default::default()
        }))
        .unwrap();
        assert!(keep.get("deadline").is_none());

        let clear = serde_json::to_value(UpdateSavingGoalRow::new(&SavingGoalUpdate {
            deadline: Some(None),
            ..Default::default()
        }))
        .unwrap();
        assert!(clear["deadline"].is_null());
    }
}
