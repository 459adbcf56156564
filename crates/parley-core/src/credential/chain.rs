//! CredentialChain -- resolves credentials through stores in priority order.
//!
//! Precedence is the order the stores were given (first match wins), e.g.
//! `[environment, keychain]`.

use tracing::debug;

use parley_types::error::CredentialError;

use super::store::{CredentialStore, DynCredentialStore};

pub struct CredentialChain {
    stores: Vec<DynCredentialStore>,
}

impl CredentialChain {
    /// Stores should be ordered by precedence (highest priority first).
    pub fn new(stores: Vec<DynCredentialStore>) -> Self {
        Self { stores }
    }

    /// Names of the stores in precedence order.
    pub fn store_names(&self) -> Vec<&str> {
        self.stores.iter().map(|s| s.name()).collect()
    }
}

impl CredentialStore for CredentialChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        for store in &self.stores {
            if let Some(value) = store.get_boxed(key).await? {
                debug!(store = store.name(), "Credential resolved");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Writes to the first store that accepts the write. Read-only stores are skipped.
    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        for store in &self.stores {
            match store.set_boxed(key, value).await {
                Ok(()) => {
                    debug!(store = store.name(), "Credential stored");
                    return Ok(());
                }
                Err(_) => continue,
            }
        }

        Err(CredentialError::Backend(
            "no writable credential store available".to_string(),
        ))
    }

    /// Removes from every store that has the key.
    async fn remove(&self, key: &str) -> Result<(), CredentialError> {
        let mut removed = false;

        for store in &self.stores {
            match store.remove_boxed(key).await {
                Ok(()) => removed = true,
                Err(CredentialError::NotFound) => continue,
                Err(_) => continue,
            }
        }

        if !removed {
            return Err(CredentialError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::credential::memory::MemoryCredentialStore;

    /// A store that refuses writes, like the environment store.
    struct ReadOnlyStore {
        value: Option<String>,
    }

    impl CredentialStore for ReadOnlyStore {
        fn name(&self) -> &str {
            "readonly"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, CredentialError> {
            Ok(self.value.clone())
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), CredentialError> {
            Err(CredentialError::ReadOnly("readonly"))
        }

        async fn remove(&self, _key: &str) -> Result<(), CredentialError> {
            Err(CredentialError::ReadOnly("readonly"))
        }
    }

    #[tokio::test]
    async fn test_first_store_wins() {
        let chain = CredentialChain::new(vec![
            Arc::new(ReadOnlyStore {
                value: Some("env-value".to_string()),
            }),
            Arc::new(MemoryCredentialStore::new().with_value("key", "stored-value")),
        ]);

        let value = chain.get("key").await.unwrap();
        assert_eq!(value.as_deref(), Some("env-value"));
    }

    #[tokio::test]
    async fn test_falls_through_to_later_store() {
        let chain = CredentialChain::new(vec![
            Arc::new(ReadOnlyStore { value: None }),
            Arc::new(MemoryCredentialStore::new().with_value("key", "stored-value")),
        ]);

        let value = chain.get("key").await.unwrap();
        assert_eq!(value.as_deref(), Some("stored-value"));
    }

    #[tokio::test]
    async fn test_set_skips_readonly_store() {
        let memory = Arc::new(MemoryCredentialStore::new());
        let chain = CredentialChain::new(vec![
            Arc::new(ReadOnlyStore { value: None }),
            memory.clone(),
        ]);

        chain.set("key", "new-value").await.unwrap();
        assert_eq!(memory.get("key").await.unwrap().as_deref(), Some("new-value"));
    }

    #[tokio::test]
    async fn test_set_fails_without_writable_store() {
        let chain = CredentialChain::new(vec![Arc::new(ReadOnlyStore { value: None })]);
        assert!(chain.set("key", "value").await.is_err());
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let chain = CredentialChain::new(vec![Arc::new(MemoryCredentialStore::new())]);
        let result = chain.remove("key").await;
        assert!(matches!(result, Err(CredentialError::NotFound)));
    }

    #[tokio::test]
    async fn test_store_names_in_order() {
        let chain = CredentialChain::new(vec![
            Arc::new(ReadOnlyStore { value: None }),
            Arc::new(MemoryCredentialStore::new()),
        ]);
        assert_eq!(chain.store_names(), vec!["readonly", "memory"]);
    }
}
