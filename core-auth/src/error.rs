use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Stored token was rejected by the backend (status {status})")]
    TokenRejected { status: u16 },

    #[error("Registration failed: {reason}")]
    RegistrationFailed { reason: String },

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Unexpected API response (status {status}): {message}")]
    UnexpectedResponse { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] BridgeError),

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, AuthError>;
