//! Backend service boundaries consumed by the controller

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, DatasetId};
use crate::error::GatewayError;
use crate::session::UserRecord;

/// Username/password pair typed into the login form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful login answer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
}

/// Authentication backend
#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError>;

    async fn logout(&self) -> Result<(), GatewayError>;

    /// Token to attach to later requests; `None` drops it
    fn set_token(&self, _token: Option<&str>) {}
}

/// Dataset storage and report backend
#[async_trait::async_trait]
pub trait DatasetGateway: Send + Sync {
    /// Most recent upload; a 404 means nothing was uploaded yet
    async fn fetch_latest_dataset(&self) -> Result<Dataset, GatewayError>;

    async fn fetch_dataset_by_id(&self, id: &DatasetId) -> Result<Dataset, GatewayError>;

    /// Generate the PDF report for `id` and deliver it to the user
    async fn download_report(&self, id: &DatasetId) -> Result<(), GatewayError>;
}
