//! Per-table REST repositories.
//!
//! Each repository owns one gateway table and translates between the
//! domain models and the table's snake_case wire rows. Row filtering is
//! pushed to the gateway through query-string filters; every write is
//! additionally scoped to the owning user so a stale or forged id cannot
//! touch another user's rows.

mod alerts;
mod goals;
mod profiles;
mod recurring;
mod transactions;

pub use alerts::GatewaySmartAlertRepository;
pub use goals::GatewaySavingGoalRepository;
pub use profiles::GatewayProfileRepository;
pub use recurring::GatewayRecurringRepository;
pub use transactions::GatewayTransactionRepository;

/// True when a serialized partial update carries no fields. The REST layer
/// rejects bodyless PATCH requests, so these become local no-ops.
pub(crate) fn is_empty_patch(patch: &serde_json::Value) -> bool {
    patch.as_object().map_or(true, |fields| fields.is_empty())
}
