//! Secure credential storage abstraction.
//!
//! Abstracts platform secure storage mechanisms:
//! - iOS: Keychain
//! - Android: Keystore (hardware-backed when available)
//! - Desktop test shells: OS keychain or an in-memory store
//!
//! Implementations MUST encrypt data at rest, use platform-provided secure
//! storage when available, and never log or expose secret values.

use async_trait::async_trait;

use crate::error::Result;

/// Secure credential storage trait.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SecureStore;
///
/// async fn store_token(store: &dyn SecureStore, token: &str) -> Result<()> {
///     store.set_secret("auth_token", token.as_bytes()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Store a secret value, securely overwriting any previous value.
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Retrieve a secret value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a secret. Deleting a missing key is not an error.
    async fn delete_secret(&self, key: &str) -> Result<()>;

    /// Check if a secret exists without retrieving it.
    async fn has_secret(&self, key: &str) -> Result<bool> {
        Ok(self.get_secret(key).await?.is_some())
    }

    /// Clear all secrets.
    ///
    /// Use with caution! This will delete all stored secrets.
    async fn clear_all(&self) -> Result<()>;
}
