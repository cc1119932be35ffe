//! Authentication session models.

use serde::{Deserialize, Serialize};

/// Identity of an established gateway session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    /// Display name carried in the account metadata, set at sign-up. Used
    /// to seed the profile row when none exists yet.
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of a sign-up request.
///
/// The gateway only establishes a session immediately when email
/// confirmation is disabled. With confirmation enabled `session` is `None`
/// and the profile row is created on the user's first sign-in instead.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub session: Option<AuthSession>,
}

/// Auth-state change notification from the gateway.
///
/// Delivered on a broadcast stream for the lifetime of the provider. The
/// controller mirrors `SignedOut` into its own state machine so external
/// sign-outs (another tab, token revocation) tear the session down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: String },
    SignedOut,
}
