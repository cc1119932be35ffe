use async_trait::async_trait;

use crate::errors::Result;
use crate::goals::goals_model::{NewSavingGoal, SavingGoal, SavingGoalUpdate};

/// Storage seam for saving goals.
#[async_trait]
pub trait SavingGoalRepositoryTrait: Send + Sync {
    /// Lists the user's goals ordered by creation time, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SavingGoal>>;

    /// Persists a new goal and returns it with its assigned id.
    async fn insert(&self, user_id: &str, new_goal: NewSavingGoal) -> Result<SavingGoal>;

    /// Applies a partial update. Unknown ids are a silent no-op.
    async fn update(&self, user_id: &str, id: &str, update: SavingGoalUpdate) -> Result<()>;

    /// Removes a goal. Unknown ids are a silent no-op.
    async fn delete(&self, user_id: &str, id: &str) -> Result<()>;
}
