//! In-process credential store.
//!
//! Used in tests and when the OS keychain is disabled (`--no-keychain`).
//! Values live only as long as the process.

use std::collections::HashMap;
use std::sync::Mutex;

use parley_types::error::CredentialError;

use super::store::CredentialStore;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value (builder style, handy in tests).
    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.lock().insert(key.to_string(), value.to_string());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.values.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialError> {
        match self.lock().remove(key) {
            Some(_) => Ok(()),
            None => Err(CredentialError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get_remove() {
        let store = MemoryCredentialStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_remove_missing_is_not_found() {
        let store = MemoryCredentialStore::new();
        let result = store.remove("missing").await;
        assert!(matches!(result, Err(CredentialError::NotFound)));
    }
}
