//! Remote repository for the `transactions` table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finanzasduo_core::errors::{Error, GatewayError, Result};
use finanzasduo_core::transactions::{
    NewTransaction, Transaction, TransactionRepositoryTrait, TransactionStatus, TransactionType,
    TransactionUpdate,
};

use crate::client::GatewayClient;
use crate::store::is_empty_patch;

const TABLE_PATH: &str = "/rest/v1/transactions";

/// Wire row as the gateway returns it.
#[derive(Debug, Deserialize)]
struct TransactionRow {
    id: String,
    user_id: String,
    amount: Decimal,
    description: String,
    category: String,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    date: DateTime<Utc>,
    #[serde(default)]
    goal_id: Option<String>,
    status: TransactionStatus,
    #[serde(default)]
    is_shared: bool,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            description: row.description,
            category: row.category,
            transaction_type: row.transaction_type,
            date: row.date,
            goal_id: row.goal_id,
            status: row.status,
            is_shared: row.is_shared,
        }
    }
}

#[derive(Serialize)]
struct InsertTransactionRow<'a> {
    user_id: &'a str,
    amount: Decimal,
    description: &'a str,
    category: &'a str,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal_id: Option<&'a str>,
    status: TransactionStatus,
    is_shared: bool,
}

#[derive(Serialize)]
struct UpdateTransactionRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_shared: Option<bool>,
}

impl<'a> UpdateTransactionRow<'a> {
    fn new(update: &'a TransactionUpdate) -> Self {
        Self {
            amount: update.amount,
            description: update.description.as_deref(),
            category: update.category.as_deref(),
            transaction_type: update.transaction_type,
            date: update.date,
            goal_id: update.goal_id.as_deref(),
            status: update.status,
            is_shared: update.is_shared,
        }
    }
}

fn list_path(user_id: &str) -> String {
    format!(
        "{TABLE_PATH}?user_id=eq.{}&select=*&order=date.desc",
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

/// Transaction repository backed by the remote gateway.
pub struct GatewayTransactionRepository {
    client: Arc<GatewayClient>,
}

impl GatewayTransactionRepository {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for GatewayTransactionRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = self.client.get(&list_path(user_id)).await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn insert(&self, user_id: &str, new_transaction: NewTransaction) -> Result<Transaction> {
        let row = InsertTransactionRow {
            user_id,
            amount: new_transaction.amount,
            description: &new_transaction.description,
            category: &new_transaction.category,
            transaction_type: new_transaction.transaction_type,
            date: new_transaction.date,
            goal_id: new_transaction.goal_id.as_deref(),
            status: new_transaction.status,
            is_shared: new_transaction.is_shared,
        };

        let mut rows: Vec<TransactionRow> = self.client.insert(TABLE_PATH, &row).await?;
        if rows.is_empty() {
            return Err(
                GatewayError::Decode("insert returned no representation".to_string()).into(),
            );
        }
        Ok(rows.remove(0).into())
    }

    async fn update(&self, user_id: &str, id: &str, update: TransactionUpdate) -> Result<()> {
        let patch = serde_json::to_value(UpdateTransactionRow::new(&update))
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
            "id": "t-1",
            "user_id": "u-1",
            "amount": 1250.75,
            "description": "Nómina",
            "category": "Salario",
            "type": "income",
            "date": "2026-08-01T09:00:00+00:00",
            "goal_id": null,
            "status": "approved",
            "is_shared": false,
            "created_at": "2026-08-01T09:00:00+00:00"
        }"#;
        let row: TransactionRow = serde_json::from_str(json).unwrap();
        let transaction = Transaction::from(row);

        assert_eq!(transaction.id, "t-1");
        assert_eq!(transaction.amount, dec!(1250.75));
        assert_eq!(transaction.transaction_type, TransactionType::Income);
        assert_eq!(transaction.status, TransactionStatus::Approved);
        assert_eq!(transaction.goal_id, None);
    }

    #[test]
    fn test_insert_row_uses_wire_column_names() {
        let row = InsertTransactionRow {
            user_id: "u-1",
            amount: dec!(45.20),
            description: "Cena",
            category: "Restaurantes",
            transaction_type: TransactionType::Expense,
            date: "2026-08-20T20:30:00Z".parse().unwrap(),
            goal_id: None,
            status: TransactionStatus::Pending,
            is_shared: true,
        };
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["user_id"], "u-1");
        assert_eq!(json["type"], "expense");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["is_shared"], true);
        assert!(json.get("goal_id").is_none());
    }

    #[test]
    fn test_update_row_only_carries_set_fields() {
        let update = TransactionUpdate {
            status: Some(TransactionStatus::Approved),
            ..Default::default()
        };
        let json = serde_json::to_value(UpdateTransactionRow::new(&update)).unwrap();

        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["status"], "approved");
    }

    #[test]
    fn test_paths_scope_to_the_owning_user() {
        assert_eq!(
            list_path("u-1"),
            "/rest/v1/transactions?user_id=eq.u-1&select=*&order=date.desc"
        );
        assert_eq!(
            row_path("u-1", "t-9"),
            "/rest/v1/transactions?id=eq.t-9&user_id=eq.u-1"
        );
    }
}
