//! Offline auth provider for demo sessions.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::auth::{AuthEvent, AuthProviderTrait, AuthSession, SessionArtifactsTrait, SignUpResult};
use crate::constants::{DEMO_EMAIL, DEMO_PASSWORD};
use crate::errors::{AuthError, Result, ValidationError};
use crate::users::User;

/// Answers auth calls from the demo dataset. Never touches the network.
pub struct DemoAuthProvider {
    user: User,
    events: broadcast::Sender<AuthEvent>,
}

impl DemoAuthProvider {
    pub fn new(user: User) -> Self {
        let (events, _) = broadcast::channel(8);
        Self { user, events }
    }
}

#[async_trait]
impl AuthProviderTrait for DemoAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        if email == DEMO_EMAIL && password == DEMO_PASSWORD {
            Ok(AuthSession {
                user_id: self.user.id.clone(),
                email: self.user.email.clone(),
                name: Some(self.user.name.clone()),
            })
        } else {
            Err(AuthError::InvalidCredentials.into())
        }
    }

    async fn sign_up(&self, _email: &str, _password: &str, _name: &str) -> Result<SignUpResult> {
        Err(ValidationError::InvalidInput(
            "registration is not available in demo mode".to_string(),
        )
        .into())
    }

    async fn sign_out(&self) -> Result<()> {
        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>> {
        // demo sessions never survive a restart
        Ok(None)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

/// Demo sessions persist nothing, so there is nothing to clear.
#[derive(Clone, Default)]
pub struct NoopSessionArtifacts;

#[async_trait]
impl SessionArtifactsTrait for NoopSessionArtifacts {
    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
