//! Post-mutation alert rules.
//!
//! Mutation handlers never synthesize alerts inline. After a mutation the
//! controller publishes a [`RuleEvent`] to an ordered list of evaluators,
//! each of which may contribute one alert. Rules are pure over the event
//! payload, which keeps the heuristics testable in isolation and swappable
//! without touching the CRUD path.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::alerts::alerts_model::NewSmartAlert;
use crate::constants::HIGH_EXPENSE_MIN_HISTORY;
use crate::goals::SavingGoal;
use crate::transactions::Transaction;

/// Domain occurrence the alert rules react to.
#[derive(Debug, Clone, Copy)]
pub enum RuleEvent<'a> {
    /// A transaction was inserted. `prior_transactions` is the collection
    /// as it stood before the insert.
    TransactionAdded {
        transaction: &'a Transaction,
        prior_transactions: &'a [Transaction],
    },
    /// A goal's accumulated amount moved, typically through an approved
    /// saving transaction.
    GoalProgressed {
        goal: &'a SavingGoal,
        previous_amount: Decimal,
        new_amount: Decimal,
    },
}

/// A single alert heuristic. Returns the alert to raise, if any.
pub trait AlertRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, event: &RuleEvent<'_>) -> Option<NewSmartAlert>;
}

/// Flags approved expenses that dwarf the user's spending history.
///
/// Fires when strictly more than [`HIGH_EXPENSE_MIN_HISTORY`] approved
/// expenses already exist and the new amount exceeds both twice their mean
/// and an absolute floor of 100.
pub struct HighExpenseRule;

impl AlertRule for HighExpenseRule {
    fn name(&self) -> &'static str {
        "high_expense"
    }

    fn evaluate(&self, event: &RuleEvent<'_>) -> Option<NewSmartAlert> {
        let RuleEvent::TransactionAdded {
            transaction,
            prior_transactions,
        } = event
        else {
            return None;
        };

        if !transaction.is_approved_expense() {
            return None;
        }

        let history: Vec<Decimal> = prior_transactions
            .iter()
            .filter(|prior| prior.is_approved_expense())
            .map(|prior| prior.amount)
            .collect();
        if history.len() <= HIGH_EXPENSE_MIN_HISTORY {
            return None;
        }

        let mean = history.iter().copied().sum::<Decimal>() / Decimal::from(history.len() as u64);
        if transaction.amount > mean * Decimal::TWO && transaction.amount > Decimal::ONE_HUNDRED {
            return Some(NewSmartAlert::warning(
                "Gasto inusualmente alto",
                format!(
                    "Has registrado un gasto de €{} en {}, más del doble de tu gasto promedio (€{}).",
                    transaction.amount.round_dp(2),
                    transaction.category,
                    mean.round_dp(2),
                ),
            ));
        }
        None
    }
}

/// Celebrates a goal the moment its accumulated amount first reaches the
/// target. The below-to-at-or-above crossing check makes the alert fire
/// exactly once per completion.
pub struct GoalCompletionRule;

impl AlertRule for GoalCompletionRule {
    fn name(&self) -> &'static str {
        "goal_completion"
    }

    fn evaluate(&self, event: &RuleEvent<'_>) -> Option<NewSmartAlert> {
        let RuleEvent::GoalProgressed {
            goal,
            previous_amount,
            new_amount,
        } = event
        else {
            return None;
        };

        if *previous_amount < goal.target_amount && *new_amount >= goal.target_amount {
            return Some(NewSmartAlert::success(
                "¡Meta de ahorro alcanzada!",
                format!("Has completado tu meta \"{}\". ¡Enhorabuena!", goal.name),
            ));
        }
        None
    }
}

/// The rule set evaluated after every mutation, in order.
pub fn default_rules() -> Vec<Arc<dyn AlertRule>> {
    vec![Arc::new(HighExpenseRule), Arc::new(GoalCompletionRule)]
}
