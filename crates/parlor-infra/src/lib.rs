//! Infrastructure adapters for Parlor: SQLite storage, the Ollama relay,
//! configuration loading and legacy data import.

pub mod config;
pub mod filesystem;
pub mod import;
pub mod llm;
pub mod sqlite;
