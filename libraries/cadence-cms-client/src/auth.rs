//! Authentication endpoints.

use crate::client::{error_from_response, read_json, send};
use crate::error::{CmsClientError, Result};
use crate::types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Exchange credentials for a JWT.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse> {
        let url = format!("{}/api/auth/local", self.base_url);
        debug!(url = %url, identifier = %identifier, "Attempting login");

        let response = send(
            self.http
                .post(&url)
                .json(&LoginRequest { identifier, password }),
        )
        .await?;

        let status = response.status();
        if status.is_success() {
            let auth: AuthResponse = read_json(response, "login").await?;
            info!(user_id = auth.user.id, username = %auth.user.username, "Login successful");
            Ok(auth)
        } else if status.as_u16() == 400 || status.as_u16() == 401 {
            let error = error_from_response(response, "login").await;
            warn!(status = %status, error = %error, "Login failed: invalid credentials");
            Err(CmsClientError::AuthFailed(
                "Invalid identifier or password".to_string(),
            ))
        } else {
            Err(error_from_response(response, "login").await)
        }
    }

    /// Create an account.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let url = format!("{}/api/auth/local/register", self.base_url);
        debug!(url = %url, username = %username, "Registering account");

        let response = send(self.http.post(&url).json(&RegisterRequest {
            username,
            email,
            password,
        }))
        .await?;

        if response.status().as_u16() == 400 {
            return match error_from_response(response, "registration").await {
                CmsClientError::ServerError { message, .. } => {
                    warn!(username = %username, error = %message, "Registration rejected");
                    Err(CmsClientError::AuthFailed(message))
                }
                other => Err(other),
            };
        }

        let auth: AuthResponse = read_json(response, "registration").await?;
        info!(user_id = auth.user.id, username = %auth.user.username, "Registered account");
        Ok(auth)
    }

    /// Profile of the token's owner.
    pub async fn me(&self, token: &str) -> Result<UserResponse> {
        let url = format!(
            "{}/api/users/me?populate[playlists][populate][0]=songs",
            self.base_url
        );
        debug!(url = %url, "Fetching current user");

        let response = send(self.http.get(&url).bearer_auth(token)).await?;
        read_json(response, "user").await
    }
}
