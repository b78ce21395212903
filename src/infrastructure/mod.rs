//! Infrastructure Layer
//!
//! Cross-cutting concerns and infrastructure components.

pub mod inflight;
pub mod shutdown;

pub use inflight::{InFlightGuard, InFlightRegistry};
pub use shutdown::{shutdown_signal, ShutdownController};
