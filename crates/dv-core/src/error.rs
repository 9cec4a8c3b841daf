//! Error kinds surfaced by gateways and the controller

use thiserror::Error;

/// Banner text shown when report generation fails
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to download PDF";

/// Errors that can occur when talking to a backend gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl GatewayError {
    /// HTTP status, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors returned by controller event handlers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The event is not allowed in the current state; nothing was changed
    #[error("cannot {event}: {reason}")]
    InvalidTransition { event: &'static str, reason: String },

    /// Login/logout failed at the gateway
    #[error("authentication request failed: {0}")]
    Auth(#[source] GatewayError),
}

impl ControllerError {
    pub(crate) fn invalid(event: &'static str, reason: impl Into<String>) -> Self {
        ControllerError::InvalidTransition {
            event,
            reason: reason.into(),
        }
    }
}

/// Classification of a failed latest-dataset load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailure {
    /// No dataset has been uploaded yet
    NotFound,
    /// Anything else; logged, never shown
    Transient,
}

impl LoadFailure {
    pub fn classify(error: &GatewayError) -> Self {
        if error.is_not_found() {
            LoadFailure::NotFound
        } else {
            LoadFailure::Transient
        }
    }
}
