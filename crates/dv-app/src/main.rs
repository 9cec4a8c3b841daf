//! Main application entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use eframe::egui;
use parking_lot::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dv_core::{
    AuthGateway, Credentials, DatasetGateway, DatasetId, StateSubscriber, Tab, ViewState,
    ViewStateController,
};
use dv_data::{ApiClient, FileSessionStore};
use dv_ui::{Intent, Theme, UiState};

mod config;

use config::AppConfig;

/// Requests a repaint whenever the controller commits a transition
struct RepaintOnChange(egui::Context);

impl StateSubscriber for RepaintOnChange {
    fn on_state_change(&self, _state: &ViewState) {
        self.0.request_repaint();
    }
}

/// Everything that can fail, built before the window opens
struct Backends {
    controller: Arc<ViewStateController>,
    api: Arc<ApiClient>,
    runtime: tokio::runtime::Runtime,
}

impl Backends {
    fn new(config: &AppConfig) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;

        let store = FileSessionStore::open(&config.session_file)
            .with_context(|| format!("open session store {}", config.session_file.display()))?;
        let api = Arc::new(ApiClient::new(config.api_config()).context("build API client")?);
        let controller = Arc::new(ViewStateController::new(
            Arc::new(store),
            api.clone(),
            api.clone(),
        ));

        Ok(Self {
            controller,
            api,
            runtime,
        })
    }
}

/// Main application state
struct DataVisualizerApp {
    /// The view-state controller
    controller: Arc<ViewStateController>,

    /// Backend client, also used directly for upload/login/history
    api: Arc<ApiClient>,

    /// Form buffers shared with background tasks
    ui_state: Arc<RwLock<UiState>>,

    /// Tokio runtime
    runtime: tokio::runtime::Runtime,

    /// Egui context
    egui_ctx: egui::Context,

    /// Kept alive because the controller only holds it weakly
    _repaint: Arc<dyn StateSubscriber>,
}

impl DataVisualizerApp {
    fn new(cc: &eframe::CreationContext<'_>, backends: Backends) -> Self {
        dv_ui::apply_theme(&cc.egui_ctx, &Theme::default());

        let repaint: Arc<dyn StateSubscriber> = Arc::new(RepaintOnChange(cc.egui_ctx.clone()));
        backends.controller.subscribe(&repaint);

        let controller = backends.controller.clone();
        backends.runtime.spawn(async move {
            if let Err(e) = controller.mount().await {
                error!("Mount failed: {}", e);
            }
        });

        Self {
            controller: backends.controller,
            api: backends.api,
            ui_state: Arc::new(RwLock::new(UiState::default())),
            runtime: backends.runtime,
            egui_ctx: cc.egui_ctx.clone(),
            _repaint: repaint,
        }
    }

    fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::SelectTab(tab) => {
                if let Err(e) = self.controller.request_tab(tab) {
                    warn!("{}", e);
                }
            }
            Intent::DismissError => {
                if let Err(e) = self.controller.dismiss_error() {
                    warn!("{}", e);
                }
            }
            Intent::DownloadReport => {
                let controller = self.controller.clone();
                self.runtime.spawn(async move {
                    if let Err(e) = controller.request_download().await {
                        error!("Report download failed: {}", e);
                    }
                });
            }
            Intent::Logout => {
                let controller = self.controller.clone();
                self.runtime.spawn(async move {
                    if let Err(e) = controller.logout().await {
                        error!("Logout failed: {}", e);
                    }
                });
            }
            Intent::Login(credentials) => self.login(credentials),
            Intent::BrowseForUpload => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("CSV Files", &["csv"])
                    .pick_file()
                {
                    self.ui_state.write().upload_path = path.display().to_string();
                }
            }
            Intent::Upload(path) => self.upload(path),
            Intent::RefreshHistory => self.refresh_history(),
            Intent::OpenDataset(id) => self.open_dataset(id),
        }
    }

    /// Log in at the auth backend and hand the result to the controller
    fn login(&self, credentials: Credentials) {
        {
            let mut ui_state = self.ui_state.write();
            ui_state.login_in_progress = true;
            ui_state.login_error = None;
        }

        let api = self.api.clone();
        let controller = self.controller.clone();
        let ui_state = self.ui_state.clone();
        let ctx = self.egui_ctx.clone();

        self.runtime.spawn(async move {
            let result = api.login(&credentials).await;

            let mut ui_state = ui_state.write();
            ui_state.login_in_progress = false;
            match result {
                Ok(response) => {
                    ui_state.login_password.clear();
                    match controller.login_succeeded(response.user, response.token) {
                        // The login tab is gone once signed in.
                        Ok(()) if controller.snapshot().active_tab == Tab::Login => {
                            if let Err(e) = controller.request_tab(Tab::Upload) {
                                warn!("{}", e);
                            }
                        }
                        Ok(()) => {}
                        Err(e) => {
                            warn!("{}", e);
                            ui_state.login_error = Some(e.to_string());
                        }
                    }
                }
                Err(e) => {
                    error!("Login failed: {}", e);
                    ui_state.login_error = Some(e.to_string());
                }
            }
            ctx.request_repaint();
        });
    }

    /// Upload a CSV file; success makes it the active dataset
    fn upload(&self, path: PathBuf) {
        {
            let mut ui_state = self.ui_state.write();
            ui_state.upload_in_progress = true;
            ui_state.upload_error = None;
        }

        let api = self.api.clone();
        let controller = self.controller.clone();
        let ui_state = self.ui_state.clone();
        let ctx = self.egui_ctx.clone();

        self.runtime.spawn(async move {
            let result = api.upload_dataset(&path).await;

            let mut ui_state = ui_state.write();
            ui_state.upload_in_progress = false;
            match result {
                Ok(dataset) => {
                    info!("Uploaded {} as dataset {}", path.display(), dataset.id);
                    ui_state.upload_path.clear();
                    if let Err(e) = controller.upload_succeeded(dataset) {
                        warn!("{}", e);
                    }
                }
                Err(e) => {
                    error!("Upload of {} failed: {}", path.display(), e);
                    ui_state.upload_error = Some(e.to_string());
                }
            }
            ctx.request_repaint();
        });
    }

    fn refresh_history(&self) {
        self.ui_state.write().history_loading = true;

        let api = self.api.clone();
        let ui_state = self.ui_state.clone();
        let ctx = self.egui_ctx.clone();

        self.runtime.spawn(async move {
            let result = api.list_datasets().await;

            let mut ui_state = ui_state.write();
            ui_state.history_loading = false;
            match result {
                Ok(datasets) => {
                    ui_state.history = datasets;
                    ui_state.history_error = None;
                }
                Err(e) => {
                    error!("Failed to list datasets: {}", e);
                    ui_state.history_error = Some(e.to_string());
                }
            }
            ctx.request_repaint();
        });
    }

    /// Fetch a dataset from history and make it active
    fn open_dataset(&self, id: DatasetId) {
        let api = self.api.clone();
        let controller = self.controller.clone();
        let ui_state = self.ui_state.clone();
        let ctx = self.egui_ctx.clone();

        self.runtime.spawn(async move {
            match api.fetch_dataset_by_id(&id).await {
                Ok(dataset) => {
                    ui_state.write().history_error = None;
                    if let Err(e) = controller.select_dataset(dataset) {
                        warn!("{}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to open dataset {}: {}", id, e);
                    ui_state.write().history_error = Some(e.to_string());
                }
            }
            ctx.request_repaint();
        });
    }
}

impl eframe::App for DataVisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snapshot = self.controller.snapshot();

        let intents = {
            let mut ui_state = self.ui_state.write();
            dv_ui::show_shell(ctx, &snapshot, &mut ui_state)
        };

        for intent in intents {
            self.handle_intent(intent);
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    info!("Starting Data Visualizer against {}", config.api_base_url);
    let backends = Backends::new(&config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "Data Visualizer",
        options,
        Box::new(move |cc| Box::new(DataVisualizerApp::new(cc, backends))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
