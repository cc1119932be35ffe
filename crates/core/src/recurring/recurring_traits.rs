use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;
use crate::recurring::recurring_model::{
    NewRecurringTransaction, RecurringTransaction, RecurringUpdate,
};

/// Storage seam for recurring transactions.
#[async_trait]
pub trait RecurringRepositoryTrait: Send + Sync {
    /// Lists the user's recurring transactions ordered by creation time,
    /// newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<RecurringTransaction>>;

    /// Persists a new template together with its derived due date and
    /// returns it with its assigned id.
    async fn insert(
        &self,
        user_id: &str,
        new_recurring: NewRecurringTransaction,
        next_due_date: NaiveDate,
    ) -> Result<RecurringTransaction>;

    /// Applies a partial update. Unknown ids are a silent no-op.
    async fn update(&self, user_id: &str, id: &str, update: RecurringUpdate) -> Result<()>;

    /// Removes a template. Unknown ids are a silent no-op.
    async fn delete(&self, user_id: &str, id: &str) -> Result<()>;
}
