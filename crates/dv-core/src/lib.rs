//! Core functionality for the data visualization platform
//!
//! This crate owns the view-state controller: which tab is shown, who is
//! signed in, which dataset is active, and the loading/error overlay. The
//! transitions live in a pure reducer ([`events::reduce`]); the
//! [`ViewStateController`] runs the effects it emits against the injected
//! gateways and session store.

pub mod controller;
pub mod dataset;
pub mod error;
pub mod events;
pub mod gateway;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use controller::{StateSubscriber, ViewStateController};
pub use dataset::{Dataset, DatasetId};
pub use error::{ControllerError, GatewayError, LoadFailure, DOWNLOAD_FAILED_MESSAGE};
pub use events::{reduce, Effect, Event, RestoredSession};
pub use gateway::{AuthGateway, Credentials, DatasetGateway, LoginResponse};
pub use session::{MemorySessionStore, Session, SessionStore, UserRecord};
pub use state::{can_activate, AsyncStatus, Tab, ViewState};
