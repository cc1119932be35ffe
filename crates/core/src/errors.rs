//! Core error types for the FinanzasDuo client.
//!
//! This module defines transport-agnostic error types. Gateway-specific
//! failures (HTTP status codes, connection errors) are converted into
//! [`GatewayError`] by the gateway crate so the domain layer never sees
//! raw transport errors.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the FinanzasDuo client.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Gateway request failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Authentication and session failures.
///
/// All of these resolve to the Unauthenticated state; none of them is fatal
/// to the process.
#[derive(Error, Debug)]
pub enum AuthError {
    /// A mutation was attempted with no signed-in user.
    #[error("no authenticated user")]
    NotAuthenticated,

    /// The gateway rejected the supplied credentials.
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// Transport-agnostic error for Remote Data Gateway operations.
///
/// The gateway crate converts its HTTP-level failures into this format so
/// that callers can branch on the shape of the failure without depending
/// on the HTTP client.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status.
    #[error("gateway error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// True when the gateway throttled the request.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::Api { status: 429, .. })
    }

    /// True when the gateway rejected the caller's credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            GatewayError::Api {
                status: 400 | 401 | 403,
                ..
            }
        )
    }
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}
