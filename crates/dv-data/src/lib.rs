//! Backend access and session persistence for the visualization platform

pub mod gateways;
pub mod store;

use thiserror::Error;

// Re-exports
pub use gateways::{ApiClient, ApiConfig};
pub use store::FileSessionStore;

/// Errors that can occur while setting up data access
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
