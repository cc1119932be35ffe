mod transactions_model;
mod transactions_traits;

pub use transactions_model::{
    NewTransaction, Transaction, TransactionStatus, TransactionType, TransactionUpdate,
};
pub use transactions_traits::TransactionRepositoryTrait;
