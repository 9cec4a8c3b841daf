//! Application view state

mod tab;

pub use tab::{can_activate, Tab};

use crate::dataset::Dataset;
use crate::session::{Session, UserRecord};

/// Loading flag and banner message
///
/// One cell shared by every in-flight gateway call: whichever call resolves
/// last decides what is shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsyncStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// Everything the shell renders from
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Signed-in user, if any
    pub session: Session,

    /// The active dataset
    pub dataset: Option<Dataset>,

    /// Tab currently displayed
    pub active_tab: Tab,

    /// Loading/error overlay
    pub status: AsyncStatus,

    /// A logout call is in flight
    pub logout_pending: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            dataset: None,
            active_tab: Tab::Upload,
            status: AsyncStatus::default(),
            logout_pending: false,
        }
    }
}

impl ViewState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.session.user()
    }

    pub fn has_dataset(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.status.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }
}
