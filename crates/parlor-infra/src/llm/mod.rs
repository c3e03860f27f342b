//! Model server clients.
//!
//! Concrete implementations of the [`ChatModel`](parlor_core::relay::ChatModel)
//! relay trait defined in `parlor-core`.

pub mod ollama;
