//! Saving goal domain models.

use chrono::NaiveDate;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Domain model representing a saving goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingGoal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub is_shared: bool,
}

impl SavingGoal {
    /// True once the accumulated amount meets or exceeds the target.
    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Amount still missing, floored at zero.
    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    /// Share of the target reached, for progress displays. Capped at 100
    /// even when the accumulated amount overshoots the target.
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= Decimal::ZERO {
            return 0.0;
        }
        let percent = self.current_amount / self.target_amount * Decimal::ONE_HUNDRED;
        percent.min(Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
    }
}

/// Input model for creating a saving goal. The accumulated amount always
/// starts at zero and advances through approved saving transactions or
/// explicit edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavingGoal {
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub is_shared: bool,
}

impl NewSavingGoal {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(
                ValidationError::InvalidInput("target amount must be positive".to_string()).into(),
            );
        }
        Ok(())
    }
}

/// Keeps an explicit JSON `null` apart from an absent field; a plain nested
/// option would collapse both to the outer `None`.
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Partial saving goal update. The deadline uses a nested option so a goal
/// can have its deadline cleared, not only replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingGoalUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target_amount: Option<Decimal>,
    #[serde(default)]
    pub current_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub is_shared: Option<bool>,
}

impl SavingGoalUpdate {
    /// Update that only moves the accumulated amount.
    pub fn amount_change(current_amount: Decimal) -> Self {
        SavingGoalUpdate {
            current_amount: Some(current_amount),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name".to_string()).into());
            }
        }
        if let Some(target_amount) = self.target_amount {
            if target_amount <= Decimal::ZERO {
                return Err(ValidationError::InvalidInput(
                    "target amount must be positive".to_string(),
                )
                .into());
            }
        }
        if let Some(current_amount) = self.current_amount {
            if current_amount.is_sign_negative() {
                return Err(ValidationError::InvalidInput(
                    "current amount must be non-negative".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Merges the set fields into `goal` (update fields win).
    pub fn apply_to(&self, goal: &mut SavingGoal) {
        if let Some(name) = &self.name {
            goal.name = name.clone();
        }
        if let Some(target_amount) = self.target_amount {
            goal.target_amount = target_amount;
        }
        if let Some(current_amount) = self.current_amount {
            goal.current_amount = current_amount;
        }
        if let Some(deadline) = &self.deadline {
            goal.deadline = *deadline;
        }
        if let Some(is_shared) = self.is_shared {
            goal.is_shared = is_shared;
        }
    }
}
