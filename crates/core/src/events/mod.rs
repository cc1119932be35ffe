//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events
//! after successful mutations. The view layer implements the sink to
//! translate domain events into re-renders and toasts.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
