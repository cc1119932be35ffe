//! FinanzasDuo Core - Domain entities, session state, and alert rules.
//!
//! This crate contains the client-side domain layer for FinanzasDuo.
//! It is transport-agnostic and defines repository traits that are
//! implemented by the `gateway` crate (remote backend) and by the
//! in-memory demo backend in [`store`].

pub mod alerts;
pub mod auth;
pub mod constants;
pub mod context;
pub mod demo;
pub mod errors;
pub mod events;
pub mod goals;
pub mod insights;
pub mod recurring;
pub mod store;
pub mod transactions;
pub mod users;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

// Re-export the session controller, the main entry point for consumers
pub use context::{AppContext, Backends, RegisterOutcome, SessionMode, SessionPhase};
