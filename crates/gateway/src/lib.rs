//! FinanzasDuo Gateway - Remote data backend.
//!
//! Implements the storage seams defined in `finanzasduo-core` against the
//! hosted gateway: token-based auth endpoints plus one REST repository per
//! table. [`live_backends`] wires the whole set up around a single shared
//! HTTP client so the bearer token installed at sign-in covers every
//! repository.

pub mod auth;
pub mod client;
pub mod config;
pub mod session_cache;
pub mod store;

pub use auth::GatewayAuthProvider;
pub use client::GatewayClient;
pub use config::{GatewayConfig, DEFAULT_GATEWAY_URL};
pub use session_cache::{FileSessionCache, GatewaySessionArtifacts, PersistedSession};
pub use store::{
    GatewayProfileRepository, GatewayRecurringRepository, GatewaySavingGoalRepository,
    GatewaySmartAlertRepository, GatewayTransactionRepository,
};

use std::sync::Arc;

use finanzasduo_core::context::{AppContext, Backends};
use finanzasduo_core::errors::Result;
use finanzasduo_core::events::DomainEventSink;

/// Assembles a complete backend set over the remote gateway.
pub fn live_backends(config: GatewayConfig) -> Result<Backends> {
    let client = Arc::new(GatewayClient::new(&config.base_url, &config.api_key)?);
    let cache = Arc::new(FileSessionCache::new(config.session_file));

    Ok(Backends {
        auth: Arc::new(GatewayAuthProvider::new(client.clone(), cache.clone())),
        artifacts: Arc::new(GatewaySessionArtifacts::new(client.clone(), cache)),
        profiles: Arc::new(GatewayProfileRepository::new(client.clone())),
        transactions: Arc::new(GatewayTransactionRepository::new(client.clone())),
        goals: Arc::new(GatewaySavingGoalRepository::new(client.clone())),
        recurring: Arc::new(GatewayRecurringRepository::new(client.clone())),
        alerts: Arc::new(GatewaySmartAlertRepository::new(client)),
    })
}

/// Builds a session controller wired to the remote gateway. The returned
/// context still expects `initialize()` to be called once.
pub fn live_context(
    config: GatewayConfig,
    events: Arc<dyn DomainEventSink>,
) -> Result<Arc<AppContext>> {
    Ok(AppContext::new(live_backends(config)?, events))
}
