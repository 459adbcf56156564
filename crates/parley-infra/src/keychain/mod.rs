//! OS keychain adapter for credential storage.
//!
//! Uses the `keyring` crate to store/retrieve credentials via:
//! - macOS Keychain
//! - Linux Secret Service (GNOME Keyring, KDE Wallet)
//! - Windows Credential Manager

use parley_core::credential::store::CredentialStore;
use parley_types::error::CredentialError;

/// Service name under which entries are filed in the OS keychain.
pub const DEFAULT_SERVICE: &str = "parley";

/// OS keychain credential store using the `keyring` crate.
pub struct KeychainStore {
    service_name: String,
}

impl KeychainStore {
    /// Create a KeychainStore with the default service name "parley".
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Create a KeychainStore with a custom service name (useful for testing).
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(&self.service_name, key)
            .map_err(|e| CredentialError::Backend(format!("keychain entry error: {e}")))
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeychainStore {
    fn name(&self) -> &str {
        "keychain"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let entry = self.entry(key)?;

        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::Backend(format!("keychain get error: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let entry = self.entry(key)?;

        entry
            .set_password(value)
            .map_err(|e| CredentialError::Backend(format!("keychain set error: {e}")))
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialError> {
        let entry = self.entry(key)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(CredentialError::NotFound),
            Err(e) => Err(CredentialError::Backend(format!("keychain delete error: {e}"))),
        }
    }
}
