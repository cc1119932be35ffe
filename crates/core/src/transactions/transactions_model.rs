//! Transaction domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Kind of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Saving,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Saving => "saving",
        }
    }
}

/// Transaction approval status.
///
/// Only approved transactions count toward dashboard statistics and goal
/// progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Rejected => "rejected",
        }
    }
}

/// Domain model representing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub date: DateTime<Utc>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub is_shared: bool,
}

impl Transaction {
    /// True when this transaction counts toward statistics and goals.
    pub fn is_approved(&self) -> bool {
        self.status == TransactionStatus::Approved
    }

    /// True for approved expenses, the population the high-expense rule
    /// evaluates against.
    pub fn is_approved_expense(&self) -> bool {
        self.is_approved() && self.transaction_type == TransactionType::Expense
    }
}

/// Input model for creating a transaction. The owner id is supplied by the
/// controller, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub goal_id: Option<String>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub is_shared: bool,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_sign_negative() {
            return Err(
                ValidationError::InvalidInput("amount must be non-negative".to_string()).into(),
            );
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description".to_string()).into());
        }
        Ok(())
    }
}

/// Partial transaction update. Unset fields keep their prior value; the
/// goal reference can be set, never cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub goal_id: Option<String>,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(default)]
    pub is_shared: Option<bool>,
}

impl TransactionUpdate {
    /// Update that only moves the approval status.
    pub fn status_change(status: TransactionStatus) -> Self {
        TransactionUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            if amount.is_sign_negative() {
                return Err(ValidationError::InvalidInput(
                    "amount must be non-negative".to_string(),
                )
                .into());
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(ValidationError::MissingField("description".to_string()).into());
            }
        }
        Ok(())
    }

    /// Merges the set fields into `transaction` (update fields win).
    pub fn apply_to(&self, transaction: &mut Transaction) {
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(description) = &self.description {
            transaction.description = description.clone();
        }
        if let Some(category) = &self.category {
            transaction.category = category.clone();
        }
        if let Some(transaction_type) = self.transaction_type {
            transaction.transaction_type = transaction_type;
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(goal_id) = &self.goal_id {
            transaction.goal_id = Some(goal_id.clone());
        }
        if let Some(status) = self.status {
            transaction.status = status;
        }
        if let Some(is_shared) = self.is_shared {
            transaction.is_shared = is_shared;
        }
    }
}
