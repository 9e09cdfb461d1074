// Gateway configuration
// Loading these from files or the environment is left to the host process.

use serde::Deserialize;
use std::time::Duration;

// Where search results come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferSourceKind {
    Live,
    #[default]
    Fallback,
}

// Client-credentials grant against the upstream token endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    // Used when the token response carries no expires_in
    pub default_ttl_secs: u64,
    // Credentials are treated as expired this long before the upstream says so
    pub expiry_skew_secs: u64,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            token_url: "https://test.api.amadeus.com/v1/security/oauth2/token".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            default_ttl_secs: 1799,
            expiry_skew_secs: 30,
        }
    }
}

impl CredentialConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn expiry_skew(&self) -> Duration {
        Duration::from_secs(self.expiry_skew_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub api_url: String,
    // Page-size cap sent upstream as `max`
    pub max_results: u32,
    // None keeps the transport default
    pub timeout_ms: Option<u64>,
    pub source: OfferSourceKind,
    pub credentials: CredentialConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: "https://test.api.amadeus.com/v2/shopping/flight-offers".to_string(),
            max_results: 10,
            timeout_ms: None,
            source: OfferSourceKind::Fallback,
            credentials: CredentialConfig::default(),
        }
    }
}

impl GatewayConfig {
    // Shared HTTP client for the token exchange and the offer search
    pub fn build_http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent("flight-gateway/0.1.0");
        if let Some(timeout_ms) = self.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    // Pending intents older than this belong to an expired session
    pub intent_ttl_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            intent_ttl_secs: 1800,
        }
    }
}

impl LedgerConfig {
    pub fn intent_ttl(&self) -> Duration {
        Duration::from_secs(self.intent_ttl_secs)
    }
}
