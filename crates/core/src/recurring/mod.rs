mod recurring_model;
mod recurring_traits;
mod schedule;

pub use recurring_model::{
    Frequency, NewRecurringTransaction, RecurringTransaction, RecurringType, RecurringUpdate,
};
pub use recurring_traits::RecurringRepositoryTrait;
pub use schedule::next_due_date;
