//! Secure token persistence.
//!
//! The backend issues exactly one opaque session token per sign-in. It is the
//! only state this module persists: written on login, deleted on logout, read
//! once at process start to decide the initial authenticated state.
//!
//! ## Security
//!
//! - The token lives in the platform secure store (Keychain/Keystore) under a
//!   single fixed key
//! - Token values are never logged or included in error messages
//! - Unreadable stored data is deleted rather than surfaced

use crate::error::{AuthError, Result};
use bridge_traits::storage::SecureStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixed secure-store key holding the session token.
const AUTH_TOKEN_KEY: &str = "auth_token";

/// Secure storage for the backend session token.
#[derive(Clone)]
pub struct TokenStore {
    secure_store: Arc<dyn SecureStore>,
}

impl TokenStore {
    /// Create a new token store over the platform secure store.
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        debug!("Initializing TokenStore");
        Self { secure_store }
    }

    /// Persist the session token, overwriting any previous one.
    pub async fn store(&self, token: &str) -> Result<()> {
        self.secure_store
            .set_secret(AUTH_TOKEN_KEY, token.as_bytes())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store session token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!("Session token stored securely");
        Ok(())
    }

    /// Read the persisted session token, if any.
    ///
    /// A stored value that is not valid UTF-8 is treated as corrupted: it is
    /// deleted and `None` is returned so the caller falls back to signed-out.
    pub async fn load(&self) -> Result<Option<String>> {
        let data = self
            .secure_store
            .get_secret(AUTH_TOKEN_KEY)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to read session token from secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        let Some(data) = data else {
            debug!("No session token found in storage");
            return Ok(None);
        };

        match String::from_utf8(data) {
            Ok(token) => {
                debug!("Session token retrieved");
                Ok(Some(token))
            }
            Err(_) => {
                warn!("Stored session token is corrupted; deleting");
                if let Err(delete_err) = self.secure_store.delete_secret(AUTH_TOKEN_KEY).await {
                    warn!(error = %delete_err, "Failed to delete corrupted token data");
                }
                Ok(None)
            }
        }
    }

    /// Delete the persisted session token. Idempotent.
    pub async fn clear(&self) -> Result<()> {
        self.secure_store
            .delete_secret(AUTH_TOKEN_KEY)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete session token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!("Session token deleted");
        Ok(())
    }

    /// Check whether a token is persisted without reading it.
    pub async fn has_token(&self) -> Result<bool> {
        self.secure_store
            .has_secret(AUTH_TOKEN_KEY)
            .await
            .map_err(|e| AuthError::SecureStorageUnavailable(e.to_string()))
    }
}
