//! Remote repository for the `recurring_transactions` table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finanzasduo_core::errors::{Error, GatewayError, Result};
use finanzasduo_core::recurring::{
    Frequency, NewRecurringTransaction, RecurringRepositoryTrait, RecurringTransaction,
    RecurringType, RecurringUpdate,
};

use crate::client::GatewayClient;
use crate::store::is_empty_patch;

const TABLE_PATH: &str = "/rest/v1/recurring_transactions";

#[derive(Debug, Deserialize)]
struct RecurringRow {
    id: String,
    user_id: String,
    amount: Decimal,
    description: String,
    category: String,
    #[serde(rename = "type")]
    recurring_type: RecurringType,
    frequency: Frequency,
    day_of_month: u32,
    start_date: NaiveDate,
    next_due_date: NaiveDate,
    #[serde(default)]
    is_shared: bool,
}

impl From<RecurringRow> for RecurringTransaction {
    fn from(row: RecurringRow) -> Self {
        RecurringTransaction {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            description: row.description,
            category: row.category,
            recurring_type: row.recurring_type,
            frequency: row.frequency,
            day_of_month: row.day_of_month,
            start_date: row.start_date,
            next_due_date: row.next_due_date,
            is_shared: row.is_shared,
        }
    }
}

#[derive(Serialize)]
struct InsertRecurringRow<'a> {
    user_id: &'a str,
    amount: Decimal,
    description: &'a str,
    category: &'a str,
    #[serde(rename = "type")]
    recurring_type: RecurringType,
    frequency: Frequency,
    day_of_month: u32,
    start_date: NaiveDate,
    next_due_date: NaiveDate,
    is_shared: bool,
}

#[derive(Serialize)]
struct UpdateRecurringRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    recurring_type: Option<RecurringType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    day_of_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_shared: Option<bool>,
}

impl<'a> UpdateRecurringRow<'a> {
    fn new(update: &'a RecurringUpdate) -> Self {
        Self {
            amount: update.amount,
            description: update.description.as_deref(),
            category: update.category.as_deref(),
            recurring_type: update.recurring_type,
            frequency: update.frequency,
            day_of_month: update.day_of_month,
            start_date: update.start_date,
            next_due_date: update.next_due_date,
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

/// Recurring transaction repository backed by the remote gateway.
pub struct GatewayRecurringRepository {
    client: Arc<GatewayClient>,
}

impl GatewayRecurringRepository {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecurringRepositoryTrait for GatewayRecurringRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<RecurringTransaction>> {
        let rows: Vec<RecurringRow> = self.client.get(&list_path(user_id)).await?;
        Ok(rows.into_iter().map(RecurringTransaction::from).collect())
    }

    async fn insert(
        &self,
        user_id: &str,
        new_recurring: NewRecurringTransaction,
        next_due_date: NaiveDate,
    ) -> Result<RecurringTransaction> {
        let row = InsertRecurringRow {
            user_id,
            amount: new_recurring.amount,
            description: &new_recurring.description,
            category: &new_recurring.category,
            recurring_type: new_recurring.recurring_type,
            frequency: new_recurring.frequency,
            day_of_month: new_recurring.day_of_month,
            start_date: new_recurring.start_date,
            next_due_date,
            is_shared: new_recurring.is_shared,
        };

        let mut rows: Vec<RecurringRow> = self.client.insert(TABLE_PATH, &row).await?;
        if rows.is_empty() {
            return Err(
                GatewayError::Decode("insert returned no representation".to_string()).into(),
            );
        }
        Ok(rows.remove(0).into())
    }

    async fn update(&self, user_id: &str, id: &str, update: RecurringUpdate) -> Result<()> {
        let patch = serde_json::to_value(UpdateRecurringRow::new(&update))
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
