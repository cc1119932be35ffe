mod goals_model;
mod goals_traits;

pub use goals_model::{NewSavingGoal, SavingGoal, SavingGoalUpdate};
pub use goals_traits::SavingGoalRepositoryTrait;
