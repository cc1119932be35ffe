//! HTTP client for the FinanzasDuo remote data gateway.
//!
//! One shared client carries the project api key and, once a user signs
//! in, their bearer token. The auth provider and every table repository
//! go through this client so header handling and error mapping stay in
//! one place.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use finanzasduo_core::errors::{Error, GatewayError, Result};

/// Default timeout for gateway requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the project api key on every request.
const API_KEY_HEADER: &str = "apikey";

/// `Prefer` value asking the REST layer to echo the written row back.
const PREFER_REPRESENTATION: &str = "return=representation";

/// `Prefer` value for idempotent writes keyed on the primary key.
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=representation";

/// Error body shapes the gateway produces. The auth endpoints answer with
/// `error`/`error_description` or `msg`, the REST layer with `message`.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// HTTP client for the FinanzasDuo gateway.
///
/// # Example
///
/// ```ignore
/// let client = GatewayClient::new("https://api.finanzasduo.app", "anon-key")?;
/// let rows: Vec<TransactionRow> = client.get("/rest/v1/transactions?user_id=eq.u1").await?;
/// ```
#[derive(Debug)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    api_key: HeaderValue,
    /// Authorization fallback for requests made before sign-in.
    anon_authorization: HeaderValue,
    /// Bearer header of the signed-in user, set by the auth provider.
    access_token: RwLock<Option<HeaderValue>>,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the api key cannot travel as a header or the
    /// HTTP client cannot be initialized.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let api_key_header = HeaderValue::from_str(api_key)
            .map_err(|e| Error::Unexpected(format!("Invalid api key format: {e}")))?;
        let anon_authorization = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| Error::Unexpected(format!("Invalid api key format: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key_header,
            anon_authorization,
            access_token: RwLock::new(None),
        })
    }

    /// Installs the signed-in user's access token.
    pub async fn set_access_token(&self, token: &str) -> Result<()> {
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::Unexpected(format!("Invalid access token format: {e}")))?;
        *self.access_token.write().await = Some(bearer);
        Ok(())
    }

    /// Drops the signed-in user's access token.
    pub async fn clear_access_token(&self) {
        *self.access_token.write().await = None;
    }

    pub async fn has_access_token(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    /// Default headers for gateway requests. Requests authenticate with
    /// the user token when one is installed and with the api key before
    /// sign-in.
    async fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, self.api_key.clone());
        let authorization = self
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.anon_authorization.clone());
        headers.insert(AUTHORIZATION, authorization);
        headers
    }

    /// Make a GET request and parse the response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[gateway] GET {url}");

        let response = self
            .client
            .get(&url)
            .headers(self.headers().await)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.parse_response(response).await
    }

    /// Make a POST request and parse the response.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[gateway] POST {url}");

        let response = self
            .client
            .post(&url)
            .headers(self.headers().await)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.parse_response(response).await
    }

    /// Make a POST request that answers with no useful body.
    pub async fn post_no_content<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[gateway] POST {url}");

        let response = self
            .client
            .post(&url)
            .headers(self.headers().await)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.parse_no_content(response).await
    }

    /// Insert a row and parse the representation the REST layer echoes
    /// back.
    pub async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[gateway] POST {url}");

        let response = self
            .client
            .post(&url)
            .headers(self.headers().await)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.parse_response(response).await
    }

    /// Insert-or-replace a row keyed on its primary key.
    pub async fn upsert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[gateway] POST {url}");

        let response = self
            .client
            .post(&url)
            .headers(self.headers().await)
            .header("Prefer", PREFER_UPSERT)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.parse_response(response).await
    }

    /// Make a PATCH request, discarding the response body.
    pub async fn patch_no_content<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[gateway] PATCH {url}");

        let response = self
            .client
            .patch(&url)
            .headers(self.headers().await)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.parse_no_content(response).await
    }

    /// Make a DELETE request, discarding the response body.
    pub async fn delete_no_content(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[gateway] DELETE {url}");

        let response = self
            .client
            .delete(&url)
            .headers(self.headers().await)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        self.parse_no_content(response).await
    }

    /// Parse an HTTP response, handling errors appropriately.
    async fn parse_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(api_error(status, body));
        }

        serde_json::from_str(&body).map_err(|e| {
            GatewayError::Decode(format!(
                "{e} - {}",
                body.chars().take(200).collect::<String>()
            ))
            .into()
        })
    }

    /// Check an HTTP response for success, discarding any body.
    async fn parse_no_content(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, body));
        }
        Ok(())
    }
}

/// Maps a non-success response into [`GatewayError::Api`], preferring the
/// structured error message when the body carries one.
fn api_error(status: StatusCode, body: String) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| body.chars().take(200).collect());
    GatewayError::Api {
        status: status.as_u16(),
        message,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GatewayClient::new("https://api.finanzasduo.app", "anon-key");
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_url_normalization() {
        let client = GatewayClient::new("https://api.finanzasduo.app/", "anon-key").unwrap();
        assert_eq!(client.base_url, "https://api.finanzasduo.app");
    }

    #[test]
    fn test_client_rejects_unprintable_api_key() {
        assert!(GatewayClient::new("https://api.finanzasduo.app", "bad\nkey").is_err());
    }

    #[tokio::test]
    async fn test_access_token_install_and_clear() {
        let client = GatewayClient::new("https://api.finanzasduo.app", "anon-key").unwrap();
        assert!(!client.has_access_token().await);

        client.set_access_token("jwt-token").await.unwrap();
        assert!(client.has_access_token().await);

        client.clear_access_token().await;
        assert!(!client.has_access_token().await);
    }

    #[test]
    fn test_api_error_prefers_structured_messages() {
        let error = api_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"code":429,"msg":"over_email_send_rate_limit"}"#.to_string(),
        );
        match error {
            Error::Gateway(gateway) => {
                assert!(gateway.is_rate_limited());
                assert_eq!(
                    gateway.to_string(),
                    "gateway error 429: over_email_send_rate_limit"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_the_raw_body() {
        let error = api_error(StatusCode::BAD_GATEWAY, "upstream unavailable".to_string());
        match error {
            Error::Gateway(GatewayError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
