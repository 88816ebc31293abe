//! Client-credentials authentication for the search service.

use crate::error::{Result, SearchClientError};
use crate::types::{SearchConfig, TokenResponse};
use forza_core::PreferenceStore;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Preference key holding the last bearer token
pub const TOKEN_KEY: &str = "search_token";

/// Preference key holding the token expiry in epoch milliseconds
pub const TOKEN_EXPIRY_KEY: &str = "search_token_expiry";

/// A bearer token with its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AccessToken {
    pub value: String,
    pub expires_at_ms: i64,
}

impl AccessToken {
    fn is_valid_at(&self, now_ms: i64) -> bool {
        !self.value.is_empty() && now_ms < self.expires_at_ms
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Token exchange against the configured token endpoint.
pub(crate) struct AuthClient<'a> {
    http: &'a Client,
    config: &'a SearchConfig,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, config: &'a SearchConfig) -> Self {
        Self { http, config }
    }

    /// Exchange client credentials for a bearer token.
    pub(crate) async fn client_credentials(&self) -> Result<AccessToken> {
        let (client_id, client_secret) = self
            .config
            .credentials()
            .ok_or(SearchClientError::MissingCredentials)?;

        debug!(url = %self.config.token_url, "Requesting search token");

        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SearchClientError::AuthFailed(format!("token endpoint unreachable: {e}")))?;

        let status = response.status();

        if status.is_success() {
            let token: TokenResponse = response.json().await.map_err(|e| {
                SearchClientError::AuthFailed(format!("Failed to parse token response: {}", e))
            })?;

            let expires_at_ms = now_ms() + (token.expires_in as i64).saturating_mul(1000);
            info!(expires_in = token.expires_in, "Search token obtained");

            Ok(AccessToken {
                value: token.access_token,
                expires_at_ms,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Token exchange rejected");
            Err(SearchClientError::AuthFailed(format!(
                "token endpoint returned {}",
                status.as_u16()
            )))
        }
    }
}

/// Process-wide token cache with optional durable backing.
///
/// The mutex is held across the exchange so concurrent searches share one
/// token request.
pub(crate) struct TokenCache {
    current: Mutex<Option<AccessToken>>,
    prefs: Option<Arc<dyn PreferenceStore>>,
}

impl TokenCache {
    pub(crate) fn new(prefs: Option<Arc<dyn PreferenceStore>>) -> Self {
        Self {
            current: Mutex::new(None),
            prefs,
        }
    }

    /// Return a valid token, exchanging credentials if needed.
    pub(crate) async fn get_or_fetch(&self, auth: AuthClient<'_>) -> Result<String> {
        let mut current = self.current.lock().await;
        let now = now_ms();

        if let Some(token) = current.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(token.value.clone());
        }

        if let Some(token) = self.load_persisted().filter(|t| t.is_valid_at(now)) {
            debug!("Reusing persisted search token");
            let value = token.value.clone();
            *current = Some(token);
            return Ok(value);
        }

        let token = auth.client_credentials().await?;
        self.persist(&token);
        let value = token.value.clone();
        *current = Some(token);
        Ok(value)
    }

    /// Forget the cached token (memory and durable copy).
    pub(crate) async fn invalidate(&self) {
        *self.current.lock().await = None;
        if let Some(prefs) = &self.prefs {
            for key in [TOKEN_KEY, TOKEN_EXPIRY_KEY] {
                if let Err(e) = prefs.remove(key) {
                    warn!(key, error = %e, "Failed to clear persisted token");
                }
            }
        }
    }

    fn load_persisted(&self) -> Option<AccessToken> {
        let prefs = self.prefs.as_ref()?;
        let read = |key: &str| match prefs.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted token");
                None
            }
        };

        let value = read(TOKEN_KEY)?;
        let expires_at_ms = read(TOKEN_EXPIRY_KEY)?.trim().parse::<i64>().ok()?;
        Some(AccessToken {
            value,
            expires_at_ms,
        })
    }

    fn persist(&self, token: &AccessToken) {
        let Some(prefs) = &self.prefs else {
            return;
        };

        let result = prefs
            .set(TOKEN_KEY, &token.value)
            .and_then(|()| prefs.set(TOKEN_EXPIRY_KEY, &token.expires_at_ms.to_string()));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist search token");
        }
    }
}
