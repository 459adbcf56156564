//! CredentialStore trait definition and its dynamic-dispatch wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parley_types::error::CredentialError;

/// Trait for local key-value credential storage (keychain, environment, memory).
///
/// The session manager only talks to storage through this trait and has no
/// opinion about the backing store.
pub trait CredentialStore: Send + Sync {
    /// Short backend name for logs (e.g., "keychain").
    fn name(&self) -> &str;

    /// Retrieve a value. Returns None if the key does not exist in this store.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, CredentialError>> + Send;

    /// Store a value, replacing any existing one.
    fn set(&self, key: &str, value: &str)
    -> impl Future<Output = Result<(), CredentialError>> + Send;

    /// Remove a value. Returns `NotFound` if the key was absent.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), CredentialError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`CredentialStore`] with boxed futures.
pub trait CredentialStoreDyn: Send + Sync {
    fn name(&self) -> &str;

    fn get_boxed<'a>(&'a self, key: &'a str)
    -> BoxFuture<'a, Result<Option<String>, CredentialError>>;

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), CredentialError>>;

    fn remove_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), CredentialError>>;
}

impl<T: CredentialStore> CredentialStoreDyn for T {
    fn name(&self) -> &str {
        CredentialStore::name(self)
    }

    fn get_boxed<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, CredentialError>> {
        Box::pin(self.get(key))
    }

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), CredentialError>> {
        Box::pin(self.set(key, value))
    }

    fn remove_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), CredentialError>> {
        Box::pin(self.remove(key))
    }
}

/// Shared, type-erased credential store.
pub type DynCredentialStore = Arc<dyn CredentialStoreDyn>;
