//! User interface components for the data visualization platform
//!
//! Everything here renders from a [`dv_core::ViewState`] snapshot and reports
//! what the user asked for as [`Intent`] values. Nothing in this crate mutates
//! the controller directly.

pub mod shell;
pub mod theme;
pub mod views;

use std::path::PathBuf;

use dv_core::{Credentials, Dataset, DatasetId, Tab};

/// Re-export commonly used types
pub use shell::show_shell;
pub use theme::{apply_theme, Theme};

/// Something the user asked for during a frame
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SelectTab(Tab),
    BrowseForUpload,
    Upload(PathBuf),
    RefreshHistory,
    OpenDataset(DatasetId),
    Login(Credentials),
    Logout,
    DownloadReport,
    DismissError,
}

/// Form input and side-panel data that persists across frames
///
/// This is view-local: the controller never reads it.
#[derive(Debug, Default)]
pub struct UiState {
    pub upload_path: String,
    pub upload_in_progress: bool,
    pub upload_error: Option<String>,

    pub login_username: String,
    pub login_password: String,
    pub login_in_progress: bool,
    pub login_error: Option<String>,

    pub history: Vec<Dataset>,
    pub history_lookup: String,
    pub history_loading: bool,
    pub history_error: Option<String>,
}

// Common icon definitions
pub mod icons {
    pub const UPLOAD: &str = "⬆";
    pub const SUMMARY: &str = "ℹ";
    pub const TABLE: &str = "📋";
    pub const CHART: &str = "📊";
    pub const HISTORY: &str = "🕘";
    pub const LOGIN: &str = "🔑";
    pub const WARNING: &str = "⚠";
    pub const CLOSE: &str = "✖";
}
