//! Error types shared by all definition builders.

use thiserror::Error;

/// Errors raised while configuring or registering a definition.
#[derive(Debug, Error)]
pub enum Error {
    /// A setter, constructor, or permission spec received a bad value.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A role required by the operation is not known to the host.
    #[error("role '{0}' does not exist")]
    RoleNotFound(String),

    /// The host rejected a registration or capability call.
    #[error("host registration failed: {0}")]
    HostRegistration(#[from] anyhow::Error),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create a role not found error.
    pub fn role_not_found(role: impl Into<String>) -> Self {
        Self::RoleNotFound(role.into())
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
