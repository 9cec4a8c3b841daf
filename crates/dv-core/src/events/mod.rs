//! Controller events and the reducer that applies them
//!
//! [`reduce`] is the whole state machine. It never performs I/O: anything
//! that has to touch a gateway or the session store comes back as an
//! [`Effect`], and the result of a remote effect re-enters as another event.

use tracing::{debug, error, warn};

use crate::dataset::{Dataset, DatasetId};
use crate::error::{ControllerError, GatewayError, LoadFailure, DOWNLOAD_FAILED_MESSAGE};
use crate::session::{Session, UserRecord};
use crate::state::{can_activate, Tab, ViewState};

/// Session read back from the store at mount
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSession {
    pub token: String,
    pub user: UserRecord,
}

/// Everything that can change the view state
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Shell started
    Mount { restored: Option<RestoredSession> },

    /// Ask for the most recent dataset
    LoadLatestDataset,

    /// Result of a latest-dataset load
    LatestDatasetLoaded(Result<Dataset, GatewayError>),

    /// The upload view stored a new dataset
    UploadSucceeded(Dataset),

    /// A dataset was picked in the history view
    DatasetSelected(Dataset),

    /// The login view obtained a token
    LoginSucceeded { user: UserRecord, token: String },

    LogoutRequested,

    LogoutFinished(Result<(), GatewayError>),

    TabRequested(Tab),

    DownloadRequested,

    DownloadFinished(Result<(), GatewayError>),

    ErrorDismissed,
}

impl Event {
    /// Short name used in logs and refusal errors
    pub fn name(&self) -> &'static str {
        match self {
            Event::Mount { .. } => "mount",
            Event::LoadLatestDataset => "load latest dataset",
            Event::LatestDatasetLoaded(_) => "finish latest dataset load",
            Event::UploadSucceeded(_) => "accept upload",
            Event::DatasetSelected(_) => "select dataset",
            Event::LoginSucceeded { .. } => "log in",
            Event::LogoutRequested => "log out",
            Event::LogoutFinished(_) => "finish logout",
            Event::TabRequested(_) => "switch tab",
            Event::DownloadRequested => "download report",
            Event::DownloadFinished(_) => "finish report download",
            Event::ErrorDismissed => "dismiss error",
        }
    }
}

/// Work the reducer asks the controller to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchLatestDataset,
    Logout,
    DownloadReport(DatasetId),
    PersistSession { token: String, user: UserRecord },
    ClearSession,
    ApplyToken(Option<String>),
}

impl Effect {
    /// Remote effects suspend on a gateway call and report back with an event
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Effect::FetchLatestDataset | Effect::Logout | Effect::DownloadReport(_)
        )
    }
}

/// Apply `event` to `state`
///
/// A refused event leaves `state` untouched. Completion events always clear
/// the loading flag before anything else is decided.
pub fn reduce(state: &mut ViewState, event: Event) -> Result<Vec<Effect>, ControllerError> {
    debug!("Reducing event: {}", event.name());

    match event {
        Event::Mount { restored } => {
            let mut effects = Vec::new();
            if let Some(RestoredSession { token, user }) = restored {
                state.session = Session::signed_in(user);
                effects.push(Effect::ApplyToken(Some(token)));
            }
            state.status.loading = true;
            effects.push(Effect::FetchLatestDataset);
            Ok(effects)
        }

        Event::LoadLatestDataset => {
            state.status.loading = true;
            Ok(vec![Effect::FetchLatestDataset])
        }

        Event::LatestDatasetLoaded(result) => {
            state.status.loading = false;
            match result {
                Ok(dataset) => {
                    debug!("Latest dataset loaded: {}", dataset.id);
                    state.dataset = Some(dataset);
                    state.status.error = None;
                }
                Err(e) => match LoadFailure::classify(&e) {
                    LoadFailure::NotFound => debug!("No dataset uploaded yet"),
                    LoadFailure::Transient => error!("Error loading latest dataset: {}", e),
                },
            }
            Ok(Vec::new())
        }

        Event::UploadSucceeded(dataset) => {
            state.dataset = Some(dataset);
            state.status.error = None;
            state.active_tab = Tab::Summary;
            Ok(Vec::new())
        }

        Event::DatasetSelected(dataset) => {
            state.dataset = Some(dataset);
            state.active_tab = Tab::Summary;
            Ok(Vec::new())
        }

        Event::LoginSucceeded { user, token } => {
            if state.is_authenticated() {
                return Err(ControllerError::invalid(
                    "log in",
                    "a session is already active",
                ));
            }
            state.session = Session::signed_in(user.clone());
            Ok(vec![
                Effect::PersistSession {
                    token: token.clone(),
                    user,
                },
                Effect::ApplyToken(Some(token)),
            ])
        }

        Event::LogoutRequested => {
            if !state.is_authenticated() {
                return Err(ControllerError::invalid("log out", "nobody is signed in"));
            }
            if state.logout_pending {
                return Err(ControllerError::invalid("log out", "a logout is already in flight"));
            }
            state.logout_pending = true;
            state.status.loading = true;
            Ok(vec![Effect::Logout])
        }

        Event::LogoutFinished(result) => {
            state.status.loading = false;
            state.logout_pending = false;
            match result {
                Ok(()) => {
                    state.session = Session::default();
                    Ok(vec![Effect::ClearSession, Effect::ApplyToken(None)])
                }
                Err(e) => Err(ControllerError::Auth(e)),
            }
        }

        Event::TabRequested(tab) => {
            if !can_activate(tab, state) {
                let reason = if tab == Tab::Login {
                    "already signed in".to_string()
                } else {
                    format!("{} needs an active dataset", tab)
                };
                return Err(ControllerError::invalid("switch tab", reason));
            }
            state.active_tab = tab;
            Ok(Vec::new())
        }

        Event::DownloadRequested => match &state.dataset {
            Some(dataset) => {
                let id = dataset.id.clone();
                state.status.loading = true;
                Ok(vec![Effect::DownloadReport(id)])
            }
            None => {
                debug!("Ignoring report download without an active dataset");
                Ok(Vec::new())
            }
        },

        Event::DownloadFinished(result) => {
            state.status.loading = false;
            if let Err(e) = result {
                warn!("Report download failed: {}", e);
                state.status.error = Some(DOWNLOAD_FAILED_MESSAGE.to_string());
            }
            Ok(Vec::new())
        }

        Event::ErrorDismissed => {
            state.status.error = None;
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn dataset(id: &str) -> Dataset {
        Dataset::new(id, Map::new())
    }

    fn alice() -> UserRecord {
        UserRecord::new(json!({"username": "alice"}))
    }

    fn http(status: u16) -> GatewayError {
        GatewayError::Http {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_mount_without_session_only_fetches() {
        let mut state = ViewState::default();
        let effects = reduce(&mut state, Event::Mount { restored: None }).unwrap();

        assert_eq!(effects, vec![Effect::FetchLatestDataset]);
        assert!(state.is_loading());
        assert!(!state.is_authenticated());
        assert_eq!(state.active_tab, Tab::Upload);
    }

    #[test]
    fn test_mount_restores_session_before_fetch() {
        let mut state = ViewState::default();
        let restored = RestoredSession {
            token: "tok1".to_string(),
            user: alice(),
        };
        let effects = reduce(&mut state, Event::Mount { restored: Some(restored) }).unwrap();

        assert_eq!(
            effects,
            vec![
                Effect::ApplyToken(Some("tok1".to_string())),
                Effect::FetchLatestDataset
            ]
        );
        assert!(state.is_authenticated());
        assert_eq!(state.user(), Some(&alice()));
    }

    #[test]
    fn test_failed_loads_stay_silent() {
        for status in [404, 500] {
            let mut state = ViewState::default();
            reduce(&mut state, Event::Mount { restored: None }).unwrap();
            reduce(&mut state, Event::LatestDatasetLoaded(Err(http(status)))).unwrap();

            assert!(!state.is_loading());
            assert_eq!(state.error(), None);
            assert!(state.dataset.is_none());
        }
    }

    #[test]
    fn test_successful_load_clears_banner() {
        let mut state = ViewState::default();
        state.status.error = Some(DOWNLOAD_FAILED_MESSAGE.to_string());

        reduce(&mut state, Event::LatestDatasetLoaded(Ok(dataset("d9")))).unwrap();

        assert_eq!(state.dataset, Some(dataset("d9")));
        assert_eq!(state.error(), None);
        assert_eq!(state.active_tab, Tab::Upload);
    }

    #[test]
    fn test_upload_and_selection_switch_to_summary() {
        let mut state = ViewState::default();
        state.status.error = Some("stale".to_string());

        reduce(&mut state, Event::UploadSucceeded(dataset("d1"))).unwrap();
        assert_eq!(state.active_tab, Tab::Summary);
        assert_eq!(state.error(), None);

        state.active_tab = Tab::History;
        state.status.error = Some("kept".to_string());
        reduce(&mut state, Event::DatasetSelected(dataset("d2"))).unwrap();
        assert_eq!(state.active_tab, Tab::Summary);
        assert_eq!(state.dataset, Some(dataset("d2")));
        assert_eq!(state.error(), Some("kept"));
    }

    #[test]
    fn test_login_twice_is_refused() {
        let mut state = ViewState::default();
        let effects = reduce(
            &mut state,
            Event::LoginSucceeded {
                user: alice(),
                token: "tok1".to_string(),
            },
        )
        .unwrap();
        assert!(matches!(effects[0], Effect::PersistSession { .. }));

        let before = state.clone();
        let err = reduce(
            &mut state,
            Event::LoginSucceeded {
                user: UserRecord::new(json!({"username": "mallory"})),
                token: "tok2".to_string(),
            },
        )
        .unwrap_err();

        assert!(matches!(err, ControllerError::InvalidTransition { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_logout_requires_session() {
        let mut state = ViewState::default();
        let err = reduce(&mut state, Event::LogoutRequested).unwrap_err();

        assert!(matches!(err, ControllerError::InvalidTransition { .. }));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_failed_logout_keeps_session_and_clears_loading() {
        let mut state = ViewState {
            session: Session::signed_in(alice()),
            ..ViewState::default()
        };
        reduce(&mut state, Event::LogoutRequested).unwrap();
        assert!(state.is_loading());

        let err = reduce(
            &mut state,
            Event::LogoutFinished(Err(GatewayError::Network("offline".to_string()))),
        )
        .unwrap_err();

        assert!(matches!(err, ControllerError::Auth(_)));
        assert!(state.is_authenticated());
        assert!(!state.is_loading());
        assert!(!state.logout_pending);

        // A retry is allowed once the failed call has finished.
        assert_eq!(
            reduce(&mut state, Event::LogoutRequested).unwrap(),
            vec![Effect::Logout]
        );
    }

    #[test]
    fn test_second_logout_refused_while_first_in_flight() {
        let mut state = ViewState {
            session: Session::signed_in(alice()),
            ..ViewState::default()
        };
        assert_eq!(
            reduce(&mut state, Event::LogoutRequested).unwrap(),
            vec![Effect::Logout]
        );

        let before = state.clone();
        let err = reduce(&mut state, Event::LogoutRequested).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidTransition { event: "log out", .. }));
        assert_eq!(state, before);

        reduce(&mut state, Event::LogoutFinished(Ok(()))).unwrap();
        assert!(!state.is_authenticated());
        assert!(!state.logout_pending);
    }

    #[test]
    fn test_tab_guard_refuses_ineligible_tabs() {
        let mut state = ViewState::default();
        for tab in [Tab::Summary, Tab::Table, Tab::Charts] {
            assert!(reduce(&mut state, Event::TabRequested(tab)).is_err());
            assert_eq!(state.active_tab, Tab::Upload);
        }

        reduce(&mut state, Event::TabRequested(Tab::History)).unwrap();
        assert_eq!(state.active_tab, Tab::History);

        state.session = Session::signed_in(alice());
        assert!(reduce(&mut state, Event::TabRequested(Tab::Login)).is_err());
        assert_eq!(state.active_tab, Tab::History);

        state.dataset = Some(dataset("d1"));
        reduce(&mut state, Event::TabRequested(Tab::Charts)).unwrap();
        assert_eq!(state.active_tab, Tab::Charts);
    }

    #[test]
    fn test_download_without_dataset_emits_nothing() {
        let mut state = ViewState::default();
        let effects = reduce(&mut state, Event::DownloadRequested).unwrap();

        assert!(effects.is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_download_failure_sets_banner() {
        let mut state = ViewState {
            dataset: Some(dataset("d1")),
            ..ViewState::default()
        };
        let effects = reduce(&mut state, Event::DownloadRequested).unwrap();
        assert_eq!(effects, vec![Effect::DownloadReport(DatasetId::from("d1"))]);

        reduce(&mut state, Event::DownloadFinished(Err(http(502)))).unwrap();
        assert_eq!(state.error(), Some(DOWNLOAD_FAILED_MESSAGE));
        assert!(!state.is_loading());

        reduce(&mut state, Event::ErrorDismissed).unwrap();
        assert_eq!(state.error(), None);
    }
}
