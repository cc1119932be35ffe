//! Session controller module.
//!
//! [`AppContext`] is the entry point consumers hold for the lifetime of
//! the application session. It is constructed once with the live backend
//! set and torn down on full sign-out.

mod app_context;

#[cfg(test)]
mod app_context_tests;

pub use app_context::{AppContext, Backends, RegisterOutcome, SessionMode, SessionPhase};
