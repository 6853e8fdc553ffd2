//! Error taxonomy shared by services and handlers.
//!
//! Every failure that reaches a client is one of these kinds. The HTTP
//! mapping lives in `handlers::error`; the domain layer only classifies.

use thiserror::Error;

/// Classified failure of a marketplace operation.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Missing or malformed input.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// No bearer credential, or one that is structurally unusable.
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// A credential that is well-formed but fails signature or expiry checks.
    #[error("Invalid credential: {message}")]
    InvalidCredential { message: String },

    /// Login rejected: unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Identifier that cannot name any stored entity.
    #[error("Invalid identifier: {message}")]
    InvalidIdentifier { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The store could not be reached or the connection settings are wrong.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Unexpected store or library failure while serving a request.
    #[error("Operation failed: {message}")]
    Operation { message: String },
}

impl MarketError {
    // ---
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation {
            message: message.into(),
        }
    }

    /// Recovers a classified error from a repository failure.
    ///
    /// Repositories speak `anyhow`; when they already know the kind (for
    /// example a unique-constraint hit) they wrap a `MarketError` inside.
    /// Anything else is an unexpected store failure.
    pub fn from_store(err: anyhow::Error) -> Self {
        // ---
        match err.downcast::<MarketError>() {
            Ok(classified) => classified,
            Err(other) => Self::operation(format!("{other:#}")),
        }
    }

    /// True for kinds that indicate a server-side fault rather than a bad request.
    pub fn is_internal(&self) -> bool {
        // ---
        matches!(self, Self::Connection { .. } | Self::Operation { .. })
    }
}
