//! OAuth2 client-credentials flow against `/auth/oauth2/v2/token`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use onelogin_config::SecretString;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::error::{ApiError, ApiResult};

pub const TOKEN_PATH: &str = "auth/oauth2/v2/token";

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Used when the token response carries no `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 36_000;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// Client credentials plus a cached access token
pub struct TokenSource {
    token_url: Url,
    client_id: String,
    client_secret: SecretString,
    cached: ArcSwapOption<CachedToken>,
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    pub fn new(base_url: &Url, client_id: String, client_secret: SecretString) -> ApiResult<Self> {
        let token_url = base_url
            .join(TOKEN_PATH)
            .map_err(|e| ApiError::Auth(format!("invalid token url: {e}")))?;
        Ok(Self {
            token_url,
            client_id,
            client_secret,
            cached: ArcSwapOption::empty(),
        })
    }

    /// Returns a valid access token, fetching a new one when needed.
    pub async fn access_token(&self, http: &reqwest::Client) -> ApiResult<String> {
        if let Some(token) = self.cached.load_full()
            && token.is_fresh()
        {
            return Ok(token.access_token.clone());
        }

        let response = self.fetch(http).await?;
        let lifetime = response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let token = CachedToken {
            access_token: response.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        };
        let access_token = token.access_token.clone();
        self.cached.store(Some(Arc::new(token)));
        tracing::debug!(expires_in = lifetime, "obtained OneLogin access token");
        Ok(access_token)
    }

    /// Drops the cached token so the next call fetches a new one.
    pub fn invalidate(&self) {
        self.cached.store(None);
    }

    async fn fetch(&self, http: &reqwest::Client) -> ApiResult<TokenResponse> {
        let resp = http
            .post(self.token_url.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                format!(
                    "client_id:{}, client_secret:{}",
                    self.client_id,
                    self.client_secret.expose()
                ),
            )
            .json(&json!({ "grant_type": "client_credentials" }))
            .send()
            .await
            .map_err(|e| ApiError::Auth(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| ApiError::Auth(e.to_string()))?;
            return Err(ApiError::Auth(format!(
                "OAuth token request failed (HTTP {status}): {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| ApiError::Auth(format!("Failed to parse token response: {e}")))
    }
}
