//! Gateway configuration.

use std::path::PathBuf;

use finanzasduo_core::errors::{Error, Result};

/// Default base URL for the hosted FinanzasDuo gateway.
pub const DEFAULT_GATEWAY_URL: &str = "https://api.finanzasduo.app";

const GATEWAY_URL_ENV: &str = "FINANZASDUO_GATEWAY_URL";
const GATEWAY_KEY_ENV: &str = "FINANZASDUO_GATEWAY_KEY";
const SESSION_FILE_ENV: &str = "FINANZASDUO_SESSION_FILE";

const DEFAULT_SESSION_FILE: &str = "finanzasduo-session.json";

/// Connection settings for the remote gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway, without a trailing slash.
    pub base_url: String,
    /// Project api key, sent on every request.
    pub api_key: String,
    /// File the session cache persists the signed-in session to.
    pub session_file: PathBuf,
}

impl GatewayConfig {
    pub fn new(base_url: &str, api_key: &str, session_file: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            session_file: session_file.into(),
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// The api key has no default; a missing key is an error rather than a
    /// silently anonymous client.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(GATEWAY_URL_ENV)
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());

        let api_key = std::env::var(GATEWAY_KEY_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Unexpected(format!("{GATEWAY_KEY_ENV} is not set")))?;

        let session_file = std::env::var(SESSION_FILE_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

        Ok(Self {
            base_url,
            api_key,
            session_file,
        })
    }
}
