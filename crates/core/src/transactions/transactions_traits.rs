use async_trait::async_trait;

use crate::errors::Result;
use crate::transactions::transactions_model::{NewTransaction, Transaction, TransactionUpdate};

/// Storage seam for transactions. Implemented in memory for demo sessions
/// and by the remote gateway for live ones.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Lists the user's transactions ordered by date, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// Persists a new transaction and returns it with its assigned id.
    async fn insert(&self, user_id: &str, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Applies a partial update. Unknown ids are a silent no-op.
    async fn update(&self, user_id: &str, id: &str, update: TransactionUpdate) -> Result<()>;

    /// Removes a transaction. Unknown ids are a silent no-op.
    async fn delete(&self, user_id: &str, id: &str) -> Result<()>;
}
