//! Core domain logic for running external analysis scripts.
//!
//! Everything here is free of HTTP concerns so the orchestrator can be
//! driven from the API server, a worker, or tests alike.

pub mod config;
pub mod error;
pub mod scripting;
