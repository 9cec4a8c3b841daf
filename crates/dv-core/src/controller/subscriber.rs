//! State subscriber trait

use crate::state::ViewState;

/// Trait for components that need to respond to view-state changes
pub trait StateSubscriber: Send + Sync {
    /// Called after every committed transition
    fn on_state_change(&self, state: &ViewState);
}
