//! Environment variable credential store.
//!
//! A read-only store that checks environment variables. It is the
//! highest-priority store in the resolution chain: env vars override the
//! keychain.
//!
//! Key resolution: the key uppercased (`gemini_api_key` -> `GEMINI_API_KEY`),
//! then `GOOGLE_API_KEY` as a fallback.

use parley_core::credential::store::CredentialStore;
use parley_types::error::CredentialError;

/// Fallback variable used by Google's own SDKs.
const FALLBACK_VAR: &str = "GOOGLE_API_KEY";

/// Environment variable credential store.
///
/// Read-only: `set()` and `remove()` return `ReadOnly` because environment
/// variables cannot be persistently modified.
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self
    }

    fn read(var: &str) -> Option<String> {
        // Missing, non-Unicode, and blank values all count as absent.
        std::env::var(var).ok().filter(|v| !v.trim().is_empty())
    }
}

impl Default for EnvCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn name(&self) -> &str {
        "env"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(Self::read(&key.to_uppercase()).or_else(|| Self::read(FALLBACK_VAR)))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), CredentialError> {
        Err(CredentialError::ReadOnly("env"))
    }

    async fn remove(&self, _key: &str) -> Result<(), CredentialError> {
        Err(CredentialError::ReadOnly("env"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_store_get_existing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("PARLEY_TEST_KEY_1", "test-value-123") };

        let store = EnvCredentialStore::new();
        let result = store.get("parley_test_key_1").await.unwrap();
        assert_eq!(result, Some("test-value-123".to_string()));

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("PARLEY_TEST_KEY_1") };
    }

    #[tokio::test]
    async fn test_env_store_blank_is_absent() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("PARLEY_TEST_KEY_BLANK", "   ") };

        let store = EnvCredentialStore::new();
        let direct = EnvCredentialStore::read("PARLEY_TEST_KEY_BLANK");
        assert!(direct.is_none());
        assert!(store.set("k", "v").await.is_err());

        // SAFETY: the var was just set above.
        unsafe { std::env::remove_var("PARLEY_TEST_KEY_BLANK") };
    }

    #[tokio::test]
    async fn test_env_store_is_read_only() {
        let store = EnvCredentialStore::new();
        assert!(matches!(
            store.set("KEY", "value").await,
            Err(CredentialError::ReadOnly("env"))
        ));
        assert!(matches!(
            store.remove("KEY").await,
            Err(CredentialError::ReadOnly("env"))
        ));
    }
}
