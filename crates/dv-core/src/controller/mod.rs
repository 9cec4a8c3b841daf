//! View-state controller
//!
//! Owns the [`ViewState`] and drives [`reduce`] with events coming from the
//! view layer. Effects emitted by the reducer are executed here: local ones
//! (session store, auth token) right away, remote ones by awaiting the
//! matching gateway and feeding the result back as a completion event.
//!
//! The state lock is never held across an await, so a handler suspended on
//! a gateway call does not block other handlers. Concurrent calls share the
//! single loading/error cell; the last one to resolve wins.

mod subscriber;

pub use subscriber::StateSubscriber;

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::error::ControllerError;
use crate::events::{reduce, Effect, Event, RestoredSession};
use crate::gateway::{AuthGateway, DatasetGateway};
use crate::session::{read_session, SessionStore, UserRecord, TOKEN_KEY, USER_KEY};
use crate::state::{Tab, ViewState};

/// Root controller of the shell
pub struct ViewStateController {
    state: Arc<RwLock<ViewState>>,
    store: Arc<dyn SessionStore>,
    auth: Arc<dyn AuthGateway>,
    datasets: Arc<dyn DatasetGateway>,
    subscribers: Arc<RwLock<Vec<Weak<dyn StateSubscriber>>>>,
}

impl ViewStateController {
    /// Create a controller in the initial state
    pub fn new(
        store: Arc<dyn SessionStore>,
        auth: Arc<dyn AuthGateway>,
        datasets: Arc<dyn DatasetGateway>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(ViewState::default())),
            store,
            auth,
            datasets,
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> ViewState {
        self.state.read().clone()
    }

    /// Register a subscriber; it is held weakly
    pub fn subscribe(&self, subscriber: &Arc<dyn StateSubscriber>) {
        self.subscribers.write().push(Arc::downgrade(subscriber));
    }

    /// Restore the stored session, then load the latest dataset
    pub async fn mount(&self) -> Result<(), ControllerError> {
        let restored = read_session(self.store.as_ref())
            .map(|(token, user)| RestoredSession { token, user });
        if let Some(session) = &restored {
            info!(
                "Restored session for {}",
                session.user.display_name().unwrap_or("unnamed user")
            );
        }
        self.dispatch(Event::Mount { restored }).await
    }

    /// Reload the most recent dataset
    pub async fn load_latest_dataset(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::LoadLatestDataset).await
    }

    pub fn upload_succeeded(&self, dataset: Dataset) -> Result<(), ControllerError> {
        self.dispatch_local(Event::UploadSucceeded(dataset))
    }

    pub fn select_dataset(&self, dataset: Dataset) -> Result<(), ControllerError> {
        self.dispatch_local(Event::DatasetSelected(dataset))
    }

    pub fn login_succeeded(&self, user: UserRecord, token: String) -> Result<(), ControllerError> {
        self.dispatch_local(Event::LoginSucceeded { user, token })
    }

    /// Log out at the gateway; on failure the session is kept and the
    /// gateway error is returned
    pub async fn logout(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::LogoutRequested).await
    }

    pub fn request_tab(&self, tab: Tab) -> Result<(), ControllerError> {
        self.dispatch_local(Event::TabRequested(tab))
    }

    /// Download the report of the active dataset; no-op without one
    pub async fn request_download(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::DownloadRequested).await
    }

    pub fn dismiss_error(&self) -> Result<(), ControllerError> {
        self.dispatch_local(Event::ErrorDismissed)
    }

    /// Run an event to completion, awaiting every remote effect it causes
    async fn dispatch(&self, event: Event) -> Result<(), ControllerError> {
        let mut pending: VecDeque<Effect> = self.commit(event)?.into();

        while let Some(effect) = pending.pop_front() {
            let completion = match effect {
                Effect::FetchLatestDataset => {
                    Event::LatestDatasetLoaded(self.datasets.fetch_latest_dataset().await)
                }
                Effect::Logout => Event::LogoutFinished(self.auth.logout().await),
                Effect::DownloadReport(id) => {
                    info!("Requesting report for dataset {}", id);
                    Event::DownloadFinished(self.datasets.download_report(&id).await)
                }
                other => {
                    debug_assert!(false, "local effect escaped commit: {:?}", other);
                    continue;
                }
            };
            pending.extend(self.commit(completion)?);
        }

        Ok(())
    }

    /// Dispatch an event that never reaches a gateway
    fn dispatch_local(&self, event: Event) -> Result<(), ControllerError> {
        let remote = self.commit(event)?;
        debug_assert!(remote.is_empty(), "local event produced {:?}", remote);
        Ok(())
    }

    /// Reduce under the lock, notify, run local effects and hand back the
    /// remote ones
    fn commit(&self, event: Event) -> Result<Vec<Effect>, ControllerError> {
        let (result, snapshot) = {
            let mut state = self.state.write();
            let result = reduce(&mut state, event);
            (result, state.clone())
        };

        // A refused event changed nothing and a failed completion still
        // cleared the loading flag, so subscribers hear about both.
        self.notify_subscribers(&snapshot);

        let (remote, local): (Vec<Effect>, Vec<Effect>) =
            result?.into_iter().partition(Effect::is_remote);
        for effect in local {
            self.run_local(effect);
        }
        Ok(remote)
    }

    fn run_local(&self, effect: Effect) {
        match effect {
            Effect::PersistSession { token, user } => {
                let persisted = self
                    .store
                    .set(TOKEN_KEY, &token)
                    .and_then(|_| self.store.set(USER_KEY, &user.to_json()));
                if let Err(e) = persisted {
                    warn!("Failed to persist session: {:#}", e);
                }
            }
            Effect::ClearSession => {
                for key in [TOKEN_KEY, USER_KEY] {
                    if let Err(e) = self.store.remove(key) {
                        warn!("Failed to clear '{}' from session store: {:#}", key, e);
                    }
                }
            }
            Effect::ApplyToken(token) => self.auth.set_token(token.as_deref()),
            remote => debug!("Skipping remote effect in local runner: {:?}", remote),
        }
    }

    fn notify_subscribers(&self, state: &ViewState) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|weak| match weak.upgrade() {
            Some(subscriber) => {
                subscriber.on_state_change(state);
                true
            }
            None => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, DOWNLOAD_FAILED_MESSAGE};
    use crate::gateway::{Credentials, LoginResponse};
    use crate::session::MemorySessionStore;
    use crate::DatasetId;
    use parking_lot::Mutex;
    use serde_json::{json, Map};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeAuth {
        logout_results: Mutex<VecDeque<Result<(), GatewayError>>>,
        logout_calls: AtomicUsize,
        logout_gate: Option<Arc<Notify>>,
        tokens: Mutex<Vec<Option<String>>>,
    }

    #[async_trait::async_trait]
    impl AuthGateway for FakeAuth {
        async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, GatewayError> {
            Err(GatewayError::Network("not scripted".to_string()))
        }

        async fn logout(&self) -> Result<(), GatewayError> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.logout_gate {
                gate.notified().await;
            }
            self.logout_results.lock().pop_front().unwrap_or(Ok(()))
        }

        fn set_token(&self, token: Option<&str>) {
            self.tokens.lock().push(token.map(str::to_string));
        }
    }

    #[derive(Default)]
    struct FakeDatasets {
        latest: Mutex<VecDeque<Result<Dataset, GatewayError>>>,
        downloads: Mutex<VecDeque<Result<(), GatewayError>>>,
        download_calls: AtomicUsize,
        latest_gate: Option<Arc<Notify>>,
    }

    #[async_trait::async_trait]
    impl DatasetGateway for FakeDatasets {
        async fn fetch_latest_dataset(&self) -> Result<Dataset, GatewayError> {
            if let Some(gate) = &self.latest_gate {
                gate.notified().await;
            }
            self.latest.lock().pop_front().unwrap_or_else(|| Err(not_found()))
        }

        async fn fetch_dataset_by_id(&self, id: &DatasetId) -> Result<Dataset, GatewayError> {
            Ok(Dataset::new(id.clone(), Map::new()))
        }

        async fn download_report(&self, _id: &DatasetId) -> Result<(), GatewayError> {
            self.download_calls.fetch_add(1, Ordering::SeqCst);
            self.downloads.lock().pop_front().unwrap_or(Ok(()))
        }
    }

    struct CountingSubscriber(AtomicUsize);

    impl StateSubscriber for CountingSubscriber {
        fn on_state_change(&self, _state: &ViewState) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn not_found() -> GatewayError {
        GatewayError::Http {
            status: 404,
            message: "No datasets found".to_string(),
        }
    }

    fn uploaded(id: &str) -> Dataset {
        Dataset::from_value(json!({
            "id": id,
            "raw_data_parsed": [{"x": 1, "y": 2}, {"x": 2, "y": 4}],
        }))
        .unwrap()
    }

    fn controller(
        store: Arc<MemorySessionStore>,
        auth: Arc<FakeAuth>,
        datasets: Arc<FakeDatasets>,
    ) -> ViewStateController {
        ViewStateController::new(store, auth, datasets)
    }

    #[tokio::test]
    async fn test_mount_404_then_upload_download_dismiss() {
        let datasets = Arc::new(FakeDatasets::default());
        datasets.downloads.lock().push_back(Err(GatewayError::Http {
            status: 500,
            message: "report failed".to_string(),
        }));
        let ctrl = controller(
            Arc::new(MemorySessionStore::new()),
            Arc::new(FakeAuth::default()),
            datasets.clone(),
        );

        ctrl.mount().await.unwrap();
        let state = ctrl.snapshot();
        assert_eq!(state.active_tab, Tab::Upload);
        assert!(!state.is_loading());
        assert!(state.dataset.is_none());
        assert_eq!(state.error(), None);

        ctrl.upload_succeeded(uploaded("d1")).unwrap();
        let state = ctrl.snapshot();
        assert_eq!(state.active_tab, Tab::Summary);
        assert_eq!(state.dataset.as_ref().map(|d| d.id.as_str()), Some("d1"));

        ctrl.request_download().await.unwrap();
        assert_eq!(datasets.download_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctrl.snapshot().error(), Some(DOWNLOAD_FAILED_MESSAGE));
        assert!(!ctrl.snapshot().is_loading());

        ctrl.dismiss_error().unwrap();
        assert_eq!(ctrl.snapshot().error(), None);
    }

    #[tokio::test]
    async fn test_mount_server_error_is_not_surfaced() {
        let datasets = Arc::new(FakeDatasets::default());
        datasets.latest.lock().push_back(Err(GatewayError::Http {
            status: 500,
            message: "database down".to_string(),
        }));
        let ctrl = controller(
            Arc::new(MemorySessionStore::new()),
            Arc::new(FakeAuth::default()),
            datasets,
        );

        ctrl.mount().await.unwrap();

        let state = ctrl.snapshot();
        assert_eq!(state.error(), None);
        assert!(state.dataset.is_none());
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_mount_restores_session_before_load_resolves() {
        let gate = Arc::new(Notify::new());
        let datasets = Arc::new(FakeDatasets {
            latest_gate: Some(gate.clone()),
            ..FakeDatasets::default()
        });
        datasets.latest.lock().push_back(Ok(uploaded("d7")));
        let user = UserRecord::new(json!({"username": "alice"}));
        let store = Arc::new(MemorySessionStore::with_session("tok1", &user));
        let auth = Arc::new(FakeAuth::default());
        let ctrl = controller(store, auth.clone(), datasets);

        let observe = async {
            let state = ctrl.snapshot();
            assert!(state.is_authenticated());
            assert_eq!(state.user(), Some(&user));
            assert!(state.dataset.is_none());
            assert!(state.is_loading());
            gate.notify_one();
        };
        let (mounted, ()) = tokio::join!(ctrl.mount(), observe);
        mounted.unwrap();

        assert_eq!(ctrl.snapshot().dataset.map(|d| d.id), Some(DatasetId::from("d7")));
        assert_eq!(auth.tokens.lock().as_slice(), &[Some("tok1".to_string())]);
    }

    #[tokio::test]
    async fn test_download_without_dataset_makes_no_call() {
        let datasets = Arc::new(FakeDatasets::default());
        let ctrl = controller(
            Arc::new(MemorySessionStore::new()),
            Arc::new(FakeAuth::default()),
            datasets.clone(),
        );

        ctrl.request_download().await.unwrap();

        assert_eq!(datasets.download_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ctrl.snapshot(), ViewState::default());
    }

    #[tokio::test]
    async fn test_login_then_logout_round_trip() {
        let store = Arc::new(MemorySessionStore::new());
        let auth = Arc::new(FakeAuth::default());
        let ctrl = controller(store.clone(), auth.clone(), Arc::new(FakeDatasets::default()));
        let alice = UserRecord::new(json!({"username": "alice"}));

        ctrl.login_succeeded(alice.clone(), "tok1".to_string()).unwrap();
        let state = ctrl.snapshot();
        assert!(state.is_authenticated());
        assert_eq!(state.user(), Some(&alice));
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
        assert_eq!(
            store.get(USER_KEY).unwrap().map(|text| UserRecord::from_json(&text).unwrap()),
            Some(alice.clone())
        );

        ctrl.logout().await.unwrap();
        let state = ctrl.snapshot();
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
        assert!(store.is_empty());
        assert_eq!(
            auth.tokens.lock().as_slice(),
            &[Some("tok1".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_failed_logout_propagates_and_keeps_session() {
        let store = Arc::new(MemorySessionStore::new());
        let auth = Arc::new(FakeAuth::default());
        auth.logout_results
            .lock()
            .push_back(Err(GatewayError::Network("connection reset".to_string())));
        let ctrl = controller(store.clone(), auth, Arc::new(FakeDatasets::default()));
        ctrl.login_succeeded(UserRecord::new(json!({"username": "alice"})), "tok1".to_string())
            .unwrap();

        let err = ctrl.logout().await.unwrap_err();

        assert!(matches!(err, ControllerError::Auth(GatewayError::Network(_))));
        assert!(ctrl.snapshot().is_authenticated());
        assert!(!ctrl.snapshot().is_loading());
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn test_concurrent_logout_calls_gateway_once() {
        let gate = Arc::new(Notify::new());
        let auth = Arc::new(FakeAuth {
            logout_gate: Some(gate.clone()),
            ..FakeAuth::default()
        });
        let store = Arc::new(MemorySessionStore::new());
        let ctrl = controller(store.clone(), auth.clone(), Arc::new(FakeDatasets::default()));
        ctrl.login_succeeded(UserRecord::new(json!({"username": "alice"})), "tok1".to_string())
            .unwrap();

        let second = async {
            let err = ctrl.logout().await.unwrap_err();
            gate.notify_one();
            err
        };
        let (first, err) = tokio::join!(ctrl.logout(), second);

        first.unwrap();
        assert!(matches!(err, ControllerError::InvalidTransition { event: "log out", .. }));
        assert_eq!(auth.logout_calls.load(Ordering::SeqCst), 1);
        assert!(!ctrl.snapshot().is_authenticated());
        assert!(!ctrl.snapshot().logout_pending);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_refused_tab_request_is_reported() {
        let ctrl = controller(
            Arc::new(MemorySessionStore::new()),
            Arc::new(FakeAuth::default()),
            Arc::new(FakeDatasets::default()),
        );

        let err = ctrl.request_tab(Tab::Charts).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidTransition { event: "switch tab", .. }));
        assert_eq!(ctrl.snapshot().active_tab, Tab::Upload);

        ctrl.select_dataset(uploaded("d3")).unwrap();
        ctrl.request_tab(Tab::Charts).unwrap();
        assert_eq!(ctrl.snapshot().active_tab, Tab::Charts);
    }

    #[tokio::test]
    async fn test_last_resolving_call_owns_shared_status() {
        let gate = Arc::new(Notify::new());
        let datasets = Arc::new(FakeDatasets {
            latest_gate: Some(gate.clone()),
            ..FakeDatasets::default()
        });
        datasets.latest.lock().push_back(Ok(uploaded("server-latest")));
        datasets
            .downloads
            .lock()
            .push_back(Err(GatewayError::Network("timeout".to_string())));
        let ctrl = controller(
            Arc::new(MemorySessionStore::new()),
            Arc::new(FakeAuth::default()),
            datasets,
        );
        ctrl.upload_succeeded(uploaded("local")).unwrap();

        let interleaved = async {
            ctrl.request_download().await.unwrap();
            // The mount load is still in flight, yet the download cleared
            // the shared loading flag.
            let state = ctrl.snapshot();
            assert!(!state.is_loading());
            assert_eq!(state.error(), Some(DOWNLOAD_FAILED_MESSAGE));
            gate.notify_one();
        };
        let (mounted, ()) = tokio::join!(ctrl.mount(), interleaved);
        mounted.unwrap();

        // The superseded load still applies its result.
        let state = ctrl.snapshot();
        assert_eq!(
            state.dataset.as_ref().map(|d| d.id.clone()),
            Some(DatasetId::from("server-latest"))
        );
        assert_eq!(state.error(), None);
        assert_eq!(state.active_tab, Tab::Summary);
    }

    #[tokio::test]
    async fn test_subscribers_are_notified_and_pruned() {
        let ctrl = controller(
            Arc::new(MemorySessionStore::new()),
            Arc::new(FakeAuth::default()),
            Arc::new(FakeDatasets::default()),
        );
        let counter = Arc::new(CountingSubscriber(AtomicUsize::new(0)));
        let subscriber: Arc<dyn StateSubscriber> = counter.clone();
        ctrl.subscribe(&subscriber);

        ctrl.mount().await.unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);

        drop(subscriber);
        drop(counter);
        ctrl.dismiss_error().unwrap();
        assert!(ctrl.subscribers.read().is_empty());
    }
}
