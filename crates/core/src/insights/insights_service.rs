//! Pure derivations over the in-memory transactions collection.
//!
//! Nothing here caches or talks to storage. Collections are session-sized,
//! recomputing on every call is cheap and keeps the numbers in lockstep
//! with the collection.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::insights::insights_model::{CategoryTotals, DashboardStats, MonthlySummary};
use crate::transactions::{Transaction, TransactionType};

/// Sums approved transactions by kind. Pending and rejected rows never
/// count.
pub fn dashboard_stats(transactions: &[Transaction]) -> DashboardStats {
    let mut stats = DashboardStats::default();
    for transaction in transactions.iter().filter(|t| t.is_approved()) {
        match transaction.transaction_type {
            TransactionType::Income => stats.total_income += transaction.amount,
            TransactionType::Expense => stats.total_expenses += transaction.amount,
            TransactionType::Saving => stats.total_savings += transaction.amount,
        }
    }
    stats.balance = stats.total_income - stats.total_expenses - stats.total_savings;
    stats
}

/// Per-category approved totals, keyed by category name in lexical order.
pub fn category_breakdown(transactions: &[Transaction]) -> BTreeMap<String, CategoryTotals> {
    let mut breakdown: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for transaction in transactions.iter().filter(|t| t.is_approved()) {
        let totals = breakdown.entry(transaction.category.clone()).or_default();
        match transaction.transaction_type {
            TransactionType::Income => totals.income += transaction.amount,
            TransactionType::Expense => totals.expenses += transaction.amount,
            TransactionType::Saving => totals.savings += transaction.amount,
        }
    }
    breakdown
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn months_before(today: NaiveDate, back: u32) -> NaiveDate {
    let index = today.year() * 12 + today.month0() as i32 - back as i32;
    month_start(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Approved totals for the last `months` calendar months ending with the
/// month of `today`, oldest first. Months without transactions yield zero
/// rows so charts keep a continuous axis.
pub fn monthly_summaries(
    transactions: &[Transaction],
    months: u32,
    today: NaiveDate,
) -> Vec<MonthlySummary> {
    let approved: Vec<&Transaction> = transactions.iter().filter(|t| t.is_approved()).collect();

    (0..months)
        .rev()
        .map(|back| {
            let month = months_before(today, back);
            let mut summary = MonthlySummary {
                month,
                income: Decimal::ZERO,
                expenses: Decimal::ZERO,
                savings: Decimal::ZERO,
            };
            for transaction in &approved {
                let date = transaction.date.date_naive();
                if date.year() != month.year() || date.month() != month.month() {
                    continue;
                }
                match transaction.transaction_type {
                    TransactionType::Income => summary.income += transaction.amount,
                    TransactionType::Expense => summary.expenses += transaction.amount,
                    TransactionType::Saving => summary.savings += transaction.amount,
                }
            }
            summary
        })
        .collect()
}

/// The newest `limit` approved transactions by date.
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut approved: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.is_approved())
        .cloned()
        .collect();
    approved.sort_by(|a, b| b.date.cmp(&a.date));
    approved.truncate(limit);
    approved
}
