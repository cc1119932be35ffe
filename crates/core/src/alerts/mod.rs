mod alert_rules;
mod alerts_model;
mod alerts_traits;

pub use alert_rules::{default_rules, AlertRule, GoalCompletionRule, HighExpenseRule, RuleEvent};
pub use alerts_model::{AlertType, NewSmartAlert, SmartAlert};
pub use alerts_traits::SmartAlertRepositoryTrait;
