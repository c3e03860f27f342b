//! Chat transcripts: repository port, orchestration service, and helpers.

pub mod repository;
pub mod service;
pub mod title;
pub mod transcript;
