//! Authentication methods for the iBroadcast API.

use crate::error::{ClientError, Result, Stage};
use crate::transport;
use crate::types::{ClientConfig, Credentials, LoginRequest, LoginResponse};
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Authentication client.
pub struct AuthClient<'a> {
    http: &'a Client,
    config: &'a ClientConfig,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, config: &'a ClientConfig) -> Self {
        Self { http, config }
    }

    /// Login with email address and password.
    ///
    /// Returns the user and the token pair on success.
    pub(crate) async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(LoginResponse, Credentials)> {
        debug!(url = %self.config.api_url, username = %username, "Attempting login");

        let request = LoginRequest {
            mode: "status",
            email_address: username,
            password,
            version: &self.config.version,
            client: &self.config.client_name,
            supported_types: 1,
        };

        let body = transport::send(
            self.http.post(&self.config.api_url).json(&request),
            Stage::Auth,
        )
        .await
        .map_err(|e| match e {
            ClientError::AuthRequired { .. } => {
                ClientError::AuthFailed("Invalid username or password".to_string())
            }
            other => other,
        })?;

        let response = transport::parse(&body, Stage::Auth)?;

        // A failed login still answers 200, just without a `user` object.
        let Some(user) = response.get("user").and_then(Value::as_object) else {
            warn!(username = %username, "Login failed: invalid credentials");
            return Err(ClientError::AuthFailed(
                "Invalid username or password".to_string(),
            ));
        };

        let user_id = user.get("id").and_then(transport::scalar);
        let token = user.get("token").and_then(Value::as_str);

        match (user_id, token) {
            (Some(user_id), Some(token)) if !token.is_empty() => {
                info!(username = %username, user_id = %user_id, "Login successful");
                Ok((
                    LoginResponse {
                        user_id: user_id.clone(),
                        username: username.to_string(),
                    },
                    Credentials {
                        user_id,
                        token: token.to_string(),
                    },
                ))
            }
            _ => Err(ClientError::unexpected(
                Stage::Auth,
                "login response is missing the user id or token",
            )),
        }
    }

    /// End the session on the service side.
    pub(crate) async fn logout(&self, credentials: &Credentials) -> Result<()> {
        debug!("Logging out");

        let body = transport::command(self.config, credentials, "logout", Map::new());
        transport::send(self.http.post(&self.config.api_url).json(&body), Stage::Auth).await?;

        info!("Logged out");
        Ok(())
    }
}
