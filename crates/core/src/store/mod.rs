//! In-memory storage backend.
//!
//! Implements every repository trait against session-lived vectors. Demo
//! sessions run entirely on this backend, seeded from the demo dataset.

use std::sync::Arc;

mod demo_auth;
mod memory;

pub use demo_auth::{DemoAuthProvider, NoopSessionArtifacts};
pub use memory::{
    MemoryProfileRepository, MemoryRecurringRepository, MemorySavingGoalRepository,
    MemorySmartAlertRepository, MemoryTransactionRepository,
};

use crate::context::Backends;
use crate::demo::DemoDataset;

/// Assembles a complete backend set over the given dataset.
pub fn demo_backends(dataset: DemoDataset) -> Backends {
    let primary = dataset.primary_user().clone();
    Backends {
        auth: Arc::new(DemoAuthProvider::new(primary)),
        artifacts: Arc::new(NoopSessionArtifacts),
        profiles: Arc::new(MemoryProfileRepository::seeded(dataset.users)),
        transactions: Arc::new(MemoryTransactionRepository::seeded(dataset.transactions)),
        goals: Arc::new(MemorySavingGoalRepository::seeded(dataset.goals)),
        recurring: Arc::new(MemoryRecurringRepository::seeded(dataset.recurring)),
        alerts: Arc::new(MemorySmartAlertRepository::seeded(dataset.alerts)),
    }
}
