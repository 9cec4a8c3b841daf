//! Dataset storage and report endpoints

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dv_core::{Dataset, DatasetGateway, DatasetId, GatewayError};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::info;

use super::{transport_error, ApiClient};

impl ApiClient {
    /// Upload a CSV file for processing
    pub async fn upload_dataset(&self, path: &Path) -> Result<Dataset, GatewayError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| GatewayError::Io(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        info!("Uploading {} ({} bytes)", file_name, bytes.len());
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let request = self.request(Method::POST, "datasets/upload/").multipart(form);

        self.send(request)
            .await?
            .json::<Dataset>()
            .await
            .map_err(transport_error)
    }

    /// Previously uploaded datasets, most recent first
    pub async fn list_datasets(&self) -> Result<Vec<Dataset>, GatewayError> {
        self.get_json("datasets/history/").await
    }

    /// Where the report for `id` is written
    pub fn report_path(&self, id: &DatasetId) -> PathBuf {
        let safe: String = id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.download_dir.join(format!("report_{}.pdf", safe))
    }
}

#[async_trait]
impl DatasetGateway for ApiClient {
    async fn fetch_latest_dataset(&self) -> Result<Dataset, GatewayError> {
        self.get_json("datasets/latest/").await
    }

    async fn fetch_dataset_by_id(&self, id: &DatasetId) -> Result<Dataset, GatewayError> {
        self.get_json(&format!("datasets/{}/", id)).await
    }

    async fn download_report(&self, id: &DatasetId) -> Result<(), GatewayError> {
        let response = self
            .send(self.request(Method::GET, &format!("datasets/{}/report/", id)))
            .await?;
        let bytes = response.bytes().await.map_err(transport_error)?;

        let path = self.report_path(id);
        let io_error = |e: std::io::Error| GatewayError::Io(format!("{}: {}", path.display(), e));
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(io_error)?;
        tokio::fs::write(&path, &bytes).await.map_err(io_error)?;

        info!("Saved report to {}", path.display());
        Ok(())
    }
}
