//! Top-level tabs and their eligibility rules

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ViewState;

/// Mutually exclusive top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Upload,
    Summary,
    Table,
    Charts,
    History,
    Login,
}

impl Tab {
    /// Display order in the tab bar
    pub const ALL: [Tab; 6] = [
        Tab::Upload,
        Tab::Summary,
        Tab::Table,
        Tab::Charts,
        Tab::History,
        Tab::Login,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Upload => "Upload",
            Tab::Summary => "Summary",
            Tab::Table => "Data Table",
            Tab::Charts => "Charts",
            Tab::History => "History",
            Tab::Login => "Login",
        }
    }

    /// Tabs that render the active dataset
    pub fn requires_dataset(self) -> bool {
        matches!(self, Tab::Summary | Tab::Table | Tab::Charts)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether `tab` may be shown in `state`
pub fn can_activate(tab: Tab, state: &ViewState) -> bool {
    match tab {
        Tab::Upload | Tab::History => true,
        Tab::Login => !state.is_authenticated(),
        Tab::Summary | Tab::Table | Tab::Charts => state.has_dataset(),
    }
}
