//! Auth provider backed by the gateway's auth endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use finanzasduo_core::auth::{AuthEvent, AuthProviderTrait, AuthSession, SignUpResult};
use finanzasduo_core::errors::{AuthError, Error, Result};

use crate::client::GatewayClient;
use crate::session_cache::{FileSessionCache, PersistedSession};

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpMetadata<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUserMetadata {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: ApiUserMetadata,
}

#[derive(Debug, Deserialize)]
struct ApiTokenResponse {
    access_token: String,
    user: ApiAuthUser,
}

/// Sign-up answers in one of two shapes. With email confirmation turned
/// off the gateway establishes a session right away and the body looks
/// like a token response; with confirmation on it returns the bare
/// account record and no token.
#[derive(Debug, Deserialize)]
struct ApiSignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<ApiAuthUser>,
    #[serde(default)]
    id: Option<String>,
}

fn session_from_user(user: &ApiAuthUser) -> AuthSession {
    AuthSession {
        user_id: user.id.clone(),
        email: user.email.clone().unwrap_or_default(),
        name: user.user_metadata.name.clone(),
    }
}

/// Talks to the gateway's auth endpoints and keeps the shared client's
/// bearer token and the on-disk session cache in step with the outcome.
pub struct GatewayAuthProvider {
    client: Arc<GatewayClient>,
    cache: Arc<FileSessionCache>,
    events: broadcast::Sender<AuthEvent>,
}

impl GatewayAuthProvider {
    pub fn new(client: Arc<GatewayClient>, cache: Arc<FileSessionCache>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client,
            cache,
            events,
        }
    }

    async fn establish(&self, access_token: &str, session: &AuthSession) -> Result<()> {
        self.client.set_access_token(access_token).await?;
        if let Err(e) = self
            .cache
            .store(&PersistedSession::new(access_token, session))
        {
            // A failed cache write only costs session restore on the next
            // launch, not the session itself.
            warn!("failed to persist session: {e}");
        }
        let _ = self.events.send(AuthEvent::SignedIn {
            user_id: session.user_id.clone(),
        });
        Ok(())
    }

    async fn discard_local_session(&self) {
        self.client.clear_access_token().await;
        if let Err(e) = self.cache.clear() {
            warn!("failed to clear session cache: {e}");
        }
    }
}

#[async_trait]
impl AuthProviderTrait for GatewayAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let grant = PasswordGrant { email, password };
        let response: ApiTokenResponse = match self
            .client
            .post("/auth/v1/token?grant_type=password", &grant)
            .await
        {
            Ok(response) => response,
            Err(Error::Gateway(e)) if e.is_unauthorized() => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let session = session_from_user(&response.user);
        self.establish(&response.access_token, &session).await?;
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpResult> {
        let request = SignUpRequest {
            email,
            password,
            data: SignUpMetadata { name },
        };
        let response: ApiSignUpResponse = self.client.post("/auth/v1/signup", &request).await?;

        match (response.access_token, response.user) {
            (Some(access_token), Some(user)) => {
                let session = session_from_user(&user);
                self.establish(&access_token, &session).await?;
                Ok(SignUpResult {
                    session: Some(session),
                })
            }
            // Confirmation pending. The account exists but there is no
            // session until the user follows the email link.
            _ => {
                debug!(
                    "[gateway] sign-up for account {:?} awaiting confirmation",
                    response.id
                );
                Ok(SignUpResult { session: None })
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        let remote = if self.client.has_access_token().await {
            self.client
                .post_no_content("/auth/v1/logout", &serde_json::json!({}))
                .await
        } else {
            Ok(())
        };

        // Local state goes regardless of what the gateway said.
        self.discard_local_session().await;
        let _ = self.events.send(AuthEvent::SignedOut);
        remote
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        let Some(persisted) = self.cache.load()? else {
            return Ok(None);
        };

        self.client.set_access_token(&persisted.access_token).await?;
        match self.client.get::<ApiAuthUser>("/auth/v1/user").await {
            Ok(user) => Ok(Some(session_from_user(&user))),
            Err(Error::Gateway(e)) if e.is_unauthorized() => {
                // The token expired or was revoked since the last run.
                self.discard_local_session().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_mapping() {
        let json = r#"{
            "access_token": "jwt-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {
                "id": "u-1",
                "email": "ana@email.com",
                "user_metadata": { "name": "Ana Ruiz" }
            }
        }"#;
        let response: ApiTokenResponse = serde_json::from_str(json).unwrap();
        let session = session_from_user(&response.user);

        assert_eq!(response.access_token, "jwt-token");
        assert_eq!(session.user_id, "u-1");
        assert_eq!(session.email, "ana@email.com");
        assert_eq!(session.name.as_deref(), Some("Ana Ruiz"));
    }

    #[test]
    fn test_user_without_metadata_still_maps() {
        let json = r#"{ "id": "u-2" }"#;
        let user: ApiAuthUser = serde_json::from_str(json).unwrap();
        let session = session_from_user(&user);

        assert_eq!(session.user_id, "u-2");
        assert_eq!(session.email, "");
        assert_eq!(session.name, None);
    }

    #[test]
    fn test_sign_up_response_with_an_immediate_session() {
        let json = r#"{
            "access_token": "jwt-token",
            "user": { "id": "u-3", "email": "luis@email.com" }
        }"#;
        let response: ApiSignUpResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.access_token.as_deref(), Some("jwt-token"));
        assert_eq!(response.user.map(|u| u.id).as_deref(), Some("u-3"));
    }

    #[test]
    fn test_sign_up_response_with_confirmation_pending() {
        let json = r#"{ "id": "u-4", "email": "luis@email.com", "confirmation_sent_at": "2026-08-22T10:00:00Z" }"#;
        let response: ApiSignUpResponse = serde_json::from_str(json).unwrap();

        assert!(response.access_token.is_none());
        assert!(response.user.is_none());
        assert_eq!(response.id.as_deref(), Some("u-4"));
    }

    #[test]
    fn test_sign_up_request_carries_the_name_as_metadata() {
        let request = SignUpRequest {
            email: "luis@email.com",
            password: "secret123",
            data: SignUpMetadata { name: "Luis Mora" },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["data"]["name"], "Luis Mora");
    }
}
