//! Example prompt catalog: repository port and service.

pub mod repository;
pub mod service;
