//! Users module - profile models and storage traits.

mod users_model;
mod users_traits;

pub use users_model::{ProfileUpdate, User};
pub use users_traits::ProfileRepositoryTrait;
