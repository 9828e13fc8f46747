//! Ticketdesk - support ticket tracking with SLA monitoring.
//!
//! This library provides the engine behind the `td` CLI tool:
//! the SLA policy, the ticket store with its lifecycle rules, and the
//! aggregator that derives breach status and KPIs at query time.

pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;


/// Library-level error type for Ticketdesk operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] kdl::KdlError),

    #[error("Not initialized: run `td init` first")]
    NotInitialized,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Ticket not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Ticketdesk operations.
pub type Result<T> = std::result::Result<T, Error>;
