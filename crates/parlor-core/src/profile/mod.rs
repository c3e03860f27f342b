//! User profiles: repository port, prompt compiler, and service.

pub mod compiler;
pub mod repository;
pub mod service;
