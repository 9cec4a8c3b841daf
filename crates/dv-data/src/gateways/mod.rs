//! HTTP gateways to the visualization backend
//!
//! One [`ApiClient`] serves as both the auth and the dataset gateway so the
//! token set after login is attached to every later request.

mod auth;
mod datasets;

use std::path::PathBuf;
use std::time::Duration;

use dv_core::GatewayError;
use parking_lot::RwLock;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::DataError;

/// Connection settings for the backend
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are joined onto
    pub base_url: String,

    /// Where downloaded reports are written
    pub download_dir: PathBuf,

    /// Per-request timeout of the HTTP client; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// Client for the visualization backend
pub struct ApiClient {
    base_url: String,
    download_dir: PathBuf,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client without a token
    pub fn new(config: ApiConfig) -> Result<Self, DataError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(DataError::Config("API base URL is empty".to_string()));
        }

        let mut builder = reqwest::Client::builder().user_agent("datavis");
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DataError::Client(e.to_string()))?;

        Ok(Self {
            base_url,
            download_dir: config.download_dir,
            client,
            token: RwLock::new(None),
        })
    }

    /// Token currently attached to requests
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub(crate) fn replace_token(&self, token: Option<&str>) {
        *self.token.write() = token.map(str::to_string);
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match self.token.read().as_deref() {
            Some(token) => builder.header(AUTHORIZATION, format!("Token {}", token)),
            None => builder,
        }
    }

    /// Send a request and turn non-2xx answers into [`GatewayError::Http`]
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, GatewayError> {
        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Http {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, GatewayError> {
        self.send(self.request(Method::GET, path))
            .await?
            .json::<T>()
            .await
            .map_err(transport_error)
    }
}

/// Map a reqwest failure onto the gateway error kinds
pub(crate) fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_decode() {
        GatewayError::Decode(error.to_string())
    } else if let Some(status) = error.status() {
        GatewayError::Http {
            status: status.as_u16(),
            message: error.to_string(),
        }
    } else {
        GatewayError::Network(error.to_string())
    }
}

/// Pull a readable message out of an error body
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        });

    from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string())
}
