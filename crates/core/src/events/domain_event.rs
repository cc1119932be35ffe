//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::context::SessionMode;

/// Domain events emitted by the session controller after successful
/// mutations and lifecycle transitions.
///
/// These events represent facts about domain data changes. The view layer
/// subscribes to re-render collections, show toasts for raised alerts, and
/// route on session transitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A user signed in and their collections finished loading.
    SessionStarted {
        user_id: String,
        mode: SessionMode,
    },

    /// The session ended, through sign-out or a mirrored gateway event.
    SessionEnded,

    /// All four collections were reloaded from the active backend.
    CollectionsReloaded { user_id: String },

    /// Transactions were created, updated, or deleted.
    TransactionsChanged { transaction_ids: Vec<String> },

    /// Saving goals were created, updated, or deleted.
    GoalsChanged { goal_ids: Vec<String> },

    /// Recurring transactions were created, updated, or deleted.
    RecurringChanged { recurring_ids: Vec<String> },

    /// Smart alerts were created, marked read, or deleted.
    AlertsChanged { alert_ids: Vec<String> },

    /// An alert rule fired off the back of a mutation.
    AlertRaised { rule: String, alert_id: String },

    /// The profile record of the signed-in user changed.
    ProfileUpdated { user_id: String },
}

impl DomainEvent {
    /// Creates a SessionStarted event.
    pub fn session_started(user_id: impl Into<String>, mode: SessionMode) -> Self {
        Self::SessionStarted {
            user_id: user_id.into(),
            mode,
        }
    }

    /// Creates a CollectionsReloaded event.
    pub fn collections_reloaded(user_id: impl Into<String>) -> Self {
        Self::CollectionsReloaded {
            user_id: user_id.into(),
        }
    }

    /// Creates a TransactionsChanged event.
    pub fn transactions_changed(transaction_ids: Vec<String>) -> Self {
        Self::TransactionsChanged { transaction_ids }
    }

    /// Creates a GoalsChanged event.
    pub fn goals_changed(goal_ids: Vec<String>) -> Self {
        Self::GoalsChanged { goal_ids }
    }

    /// Creates a RecurringChanged event.
    pub fn recurring_changed(recurring_ids: Vec<String>) -> Self {
        Self::RecurringChanged { recurring_ids }
    }

    /// Creates an AlertsChanged event.
    pub fn alerts_changed(alert_ids: Vec<String>) -> Self {
        Self::AlertsChanged { alert_ids }
    }

    /// Creates an AlertRaised event.
    pub fn alert_raised(rule: impl Into<String>, alert_id: impl Into<String>) -> Self {
        Self::AlertRaised {
            rule: rule.into(),
            alert_id: alert_id.into(),
        }
    }

    /// Creates a ProfileUpdated event.
    pub fn profile_updated(user_id: impl Into<String>) -> Self {
        Self::ProfileUpdated {
            user_id: user_id.into(),
        }
    }
}
