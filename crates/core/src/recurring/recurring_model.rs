//! Recurring transaction domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Kind of movement a recurring template produces. Recurring income is not
/// part of the product, templates cover outgoing money only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringType {
    Expense,
    Saving,
}

impl RecurringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringType::Expense => "expense",
            RecurringType::Saving => "saving",
        }
    }
}

/// Cadence of a recurring transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

/// Domain model representing a recurring transaction template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub recurring_type: RecurringType,
    pub frequency: Frequency,
    pub day_of_month: u32,
    pub start_date: NaiveDate,
    pub next_due_date: NaiveDate,
    #[serde(default)]
    pub is_shared: bool,
}

/// Input model for creating a recurring transaction. The next due date is
/// derived by the controller, not supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringTransaction {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub recurring_type: RecurringType,
    pub frequency: Frequency,
    pub day_of_month: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub is_shared: bool,
}

impl NewRecurringTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.amount.is_sign_negative() {
            return Err(
                ValidationError::InvalidInput("amount must be non-negative".to_string()).into(),
            );
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description".to_string()).into());
        }
        if !(1..=31).contains(&self.day_of_month) {
            return Err(ValidationError::InvalidInput(
                "day of month must be between 1 and 31".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Partial recurring transaction update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringUpdate {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    #[serde(rename = "type")]
    pub recurring_type: Option<RecurringType>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_shared: Option<bool>,
}

impl RecurringUpdate {
    /// True when the update touches a field the due date is derived from.
    pub fn changes_schedule(&self) -> bool {
        self.frequency.is_some() || self.day_of_month.is_some() || self.start_date.is_some()
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
        if let Some(day_of_month) = self.day_of_month {
            if !(1..=31).contains(&day_of_month) {
                return Err(ValidationError::InvalidInput(
                    "day of month must be between 1 and 31".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Merges the set fields into `recurring` (update fields win).
    pub fn apply_to(&self, recurring: &mut RecurringTransaction) {
        if let Some(amount) = self.amount {
            recurring.amount = amount;
        }
        if let Some(description) = &self.description {
            recurring.description = description.clone();
        }
        if let Some(category) = &self.category {
            recurring.category = category.clone();
        }
        if let Some(recurring_type) = self.recurring_type {
            recurring.recurring_type = recurring_type;
        }
        if let Some(frequency) = self.frequency {
            recurring.frequency = frequency;
        }
        if let Some(day_of_month) = self.day_of_month {
            recurring.day_of_month = day_of_month;
        }
        if let Some(start_date) = self.start_date {
            recurring.start_date = start_date;
        }
        if let Some(next_due_date) = self.next_due_date {
            recurring.next_due_date = next_due_date;
        }
        if let Some(is_shared) = self.is_shared {
            recurring.is_shared = is_shared;
        }
    }
}
