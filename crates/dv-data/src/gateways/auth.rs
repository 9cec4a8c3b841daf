//! Authentication endpoints

use async_trait::async_trait;
use dv_core::{AuthGateway, Credentials, GatewayError, LoginResponse};
use reqwest::Method;
use tracing::info;

use super::{transport_error, ApiClient};

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError> {
        info!("Logging in as {}", credentials.username);
        let request = self.request(Method::POST, "auth/login/").json(credentials);
        self.send(request)
            .await?
            .json::<LoginResponse>()
            .await
            .map_err(transport_error)
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        self.send(self.request(Method::POST, "auth/logout/")).await?;
        info!("Logged out");
        Ok(())
    }

    fn set_token(&self, token: Option<&str>) {
        self.replace_token(token);
    }
}
