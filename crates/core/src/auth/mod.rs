mod auth_model;
mod auth_traits;

pub use auth_model::{AuthEvent, AuthSession, SignUpResult};
pub use auth_traits::{AuthProviderTrait, SessionArtifactsTrait};
