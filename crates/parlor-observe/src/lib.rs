//! Observability setup for Parlor.

pub mod tracing_setup;

pub use tracing_setup::{TracingGuard, init_tracing};
