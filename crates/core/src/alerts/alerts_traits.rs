use async_trait::async_trait;

use crate::alerts::alerts_model::{NewSmartAlert, SmartAlert};
use crate::errors::Result;

/// Storage seam for smart alerts.
#[async_trait]
pub trait SmartAlertRepositoryTrait: Send + Sync {
    /// Lists the user's alerts ordered by creation time, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SmartAlert>>;

    /// Persists a new alert, stamping identity, owner and creation time,
    /// and returns the stored row.
    async fn insert(&self, user_id: &str, new_alert: NewSmartAlert) -> Result<SmartAlert>;

    /// Flips an alert's read flag on. Unknown ids are a silent no-op.
    async fn mark_read(&self, user_id: &str, id: &str) -> Result<()>;

    /// Removes an alert. Unknown ids are a silent no-op.
    async fn delete(&self, user_id: &str, id: &str) -> Result<()>;
}
