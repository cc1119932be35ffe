use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate totals over the approved transactions of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_savings: Decimal,
    /// Income minus expenses minus savings. Savings count as money set
    /// aside, not as available balance.
    pub balance: Decimal,
}

/// Per-category totals split by movement kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
}

/// Approved totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// First day of the month the totals cover.
    pub month: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
}
