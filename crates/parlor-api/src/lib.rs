//! Parlor application layer: shared state, HTTP API and CLI.

pub mod cli;
pub mod http;
pub mod state;
