// Upstream bearer credential cache
// Holds the process-wide access token and refreshes it when absent or expired.
// Refreshes are single-flight: callers racing on expiry queue behind the
// refresh guard and reuse whatever the first caller fetched.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::CredentialConfig;
use crate::upstream::{TokenRequest, TokenResponse};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token exchange transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned status {0}")]
    Status(u16),

    #[error("token response has no access_token")]
    MissingToken,
}

#[derive(Clone)]
pub struct Credential {
    token: String,
    expires_at: Instant,
}

impl Credential {
    pub fn new(token: impl Into<String>, expires_at: Instant) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

// The token itself never reaches logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub struct CredentialCache {
    http: reqwest::Client,
    config: CredentialConfig,
    current: RwLock<Option<Credential>>,
    refresh: Mutex<()>,
    exchange_count: AtomicUsize,
}

impl CredentialCache {
    pub fn new(http: reqwest::Client, config: CredentialConfig) -> Self {
        Self {
            http,
            config,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
            exchange_count: AtomicUsize::new(0),
        }
    }

    // Return the cached credential, or fetch and cache a fresh one
    pub async fn token(&self) -> Result<Credential, AuthError> {
        if let Some(credential) = self.cached(Instant::now()) {
            return Ok(credential);
        }

        let _guard = self.refresh.lock().await;

        // Whoever held the guard before us may already have refreshed
        if let Some(credential) = self.cached(Instant::now()) {
            debug!("reusing credential refreshed by a concurrent caller");
            return Ok(credential);
        }

        let fresh = self.exchange().await?;
        *self.current.write() = Some(fresh.clone());
        Ok(fresh)
    }

    // Number of token exchanges issued so far
    pub fn exchange_count(&self) -> usize {
        self.exchange_count.load(Ordering::SeqCst)
    }

    fn cached(&self, now: Instant) -> Option<Credential> {
        self.current
            .read()
            .as_ref()
            .filter(|credential| !credential.is_expired_at(now))
            .cloned()
    }

    async fn exchange(&self) -> Result<Credential, AuthError> {
        self.exchange_count.fetch_add(1, Ordering::SeqCst);
        info!(token_url = %self.config.token_url, "requesting upstream credential");

        let form = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
        };

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "credential exchange failed");
                AuthError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "credential exchange rejected");
            return Err(AuthError::Status(status.as_u16()));
        }

        let body: TokenResponse = response.json().await?;
        let token = body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                warn!("credential response missing access_token");
                AuthError::MissingToken
            })?;

        let granted = body
            .expires_in
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.default_ttl());
        let lifetime = credential_lifetime(granted, self.config.expiry_skew());

        debug!(lifetime_secs = lifetime.as_secs(), "credential refreshed");
        Ok(Credential::new(token, Instant::now() + lifetime))
    }
}

// Skew is capped at half the granted lifetime; a fresh credential is never
// already expired when handed out
fn credential_lifetime(granted: Duration, skew: Duration) -> Duration {
    granted - skew.min(granted / 2)
}
