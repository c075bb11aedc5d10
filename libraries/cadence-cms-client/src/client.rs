//! Main CMS client.

use crate::albums::AlbumsClient;
use crate::auth::AuthClient;
use crate::error::{CmsClientError, Result};
use crate::playlists::PlaylistsClient;
use crate::songs::SongsClient;
use crate::types::{AuthResponse, ClientConfig, ErrorBody, UserResponse};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Client for the CMS backing the player.
///
/// Reads (songs, playlists) work anonymously; playlist mutations and the
/// profile endpoint need the JWT obtained from [`CmsClient::login`] or
/// supplied through [`ClientConfig::with_token`]. The token lives in memory
/// only.
///
/// # Example
///
/// ```ignore
/// use cadence_cms_client::{ClientConfig, CmsClient};
///
/// let client = CmsClient::new(ClientConfig::new("http://localhost:1337"))?;
///
/// let songs = client.songs().await.list().await?;
/// println!("{} songs", songs.len());
///
/// client.login("mai@example.com", "secret").await?;
/// let me = client.current_user().await?;
/// println!("{} owns {} playlists", me.username, me.playlists.len());
/// ```
pub struct CmsClient {
    http: Client,
    url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl CmsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(CmsClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim().trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(CmsClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url).map_err(|e| CmsClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Cadence/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            url,
            token: Arc::new(RwLock::new(config.token)),
        })
    }

    /// Normalized CMS base URL (no trailing slash).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if the client holds a token.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Current token, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Set the token directly.
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    /// Forget the token.
    pub async fn logout(&self) {
        *self.token.write().await = None;
        info!("Logged out");
    }

    /// Log in with a username or email and a password.
    ///
    /// On success, the JWT is kept for subsequent requests.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse> {
        let response = AuthClient::new(&self.http, &self.url)
            .login(identifier, password)
            .await?;

        *self.token.write().await = Some(response.jwt.clone());
        Ok(response)
    }

    /// Register a new account.
    ///
    /// Registration does not log the client in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        AuthClient::new(&self.http, &self.url)
            .register(username, email, password)
            .await
    }

    /// Profile of the logged-in user, with their playlists and song ids.
    pub async fn current_user(&self) -> Result<UserResponse> {
        let token = self.token().await.ok_or(CmsClientError::AuthRequired)?;
        AuthClient::new(&self.http, &self.url).me(&token).await
    }

    /// Song operations.
    pub async fn songs(&self) -> SongsClient<'_> {
        SongsClient::new(&self.http, &self.url, self.token().await)
    }

    /// Playlist operations.
    pub async fn playlists(&self) -> PlaylistsClient<'_> {
        PlaylistsClient::new(&self.http, &self.url, self.token().await)
    }

    /// Album and author lookups.
    pub async fn albums(&self) -> AlbumsClient<'_> {
        AlbumsClient::new(&self.http, &self.url, self.token().await)
    }
}

// =============================================================================
// Response handling shared by the sub-clients
// =============================================================================

/// Attach the token when there is one.
pub(crate) fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Send a request, classifying connection failures.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    request.send().await.map_err(|e| {
        if e.is_connect() || e.is_timeout() {
            CmsClientError::ServerUnreachable(e.to_string())
        } else {
            CmsClientError::Request(e)
        }
    })
}

/// Decode a successful response or turn a failed one into an error.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response, what).await);
    }

    response
        .json()
        .await
        .map_err(|e| CmsClientError::ParseError(format!("Failed to parse {} response: {}", what, e)))
}

/// Map an error status to a client error.
pub(crate) async fn error_from_response(response: Response, what: &str) -> CmsClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);

    debug!(status, what, message = %message, "CMS request failed");

    match status {
        401 => CmsClientError::AuthRequired,
        404 => CmsClientError::NotFound(what.to_string()),
        _ => CmsClientError::ServerError { status, message },
    }
}
