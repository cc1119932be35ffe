use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::auth::auth_model::{AuthEvent, AuthSession, SignUpResult};
use crate::errors::Result;

/// Authentication seam of the storage backend.
///
/// The remote implementation talks to the gateway's auth endpoints; the
/// demo implementation answers from the demo dataset without touching the
/// network.
#[async_trait]
pub trait AuthProviderTrait: Send + Sync {
    /// Exchanges credentials for a session.
    ///
    /// Bad credentials surface as [`crate::errors::AuthError::InvalidCredentials`],
    /// everything else as a gateway failure.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Creates an account. `name` travels as profile metadata.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpResult>;

    /// Ends the current session on the provider side.
    async fn sign_out(&self) -> Result<()>;

    /// Returns the session persisted from a previous run, if still valid.
    async fn current_session(&self) -> Result<Option<AuthSession>>;

    /// Subscribes to auth-state change notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Persisted session leftovers outside the provider itself.
///
/// Covers the gateway client's token cache and the application session
/// marker. Cleared unconditionally on logout.
#[async_trait]
pub trait SessionArtifactsTrait: Send + Sync {
    async fn clear(&self) -> Result<()>;
}
