//! Credential chain builder -- wires concrete stores in priority order.
//!
//! This module lives in `parley-infra` because it assembles concrete store
//! implementations. The resulting chain is handed to the session manager in
//! `parley-core` as a `DynCredentialStore`.
//!
//! Default chain order: `[EnvCredentialStore, KeychainStore]`

pub mod env;

use std::sync::Arc;

use parley_core::credential::chain::CredentialChain;
use parley_core::credential::memory::MemoryCredentialStore;
use parley_core::credential::store::DynCredentialStore;

use crate::keychain::KeychainStore;

use self::env::EnvCredentialStore;

/// Build the credential resolution chain.
///
/// The chain is ordered by precedence (first match wins):
/// 1. Environment variables (if `include_env` is true)
/// 2. OS keychain if `keychain` is Some, otherwise an in-process store
///
/// The second entry is always writable, so "remember" has somewhere to go
/// even on headless machines without a keychain.
pub fn build_credential_chain(keychain: Option<KeychainStore>, include_env: bool) -> CredentialChain {
    let mut stores: Vec<DynCredentialStore> = Vec::new();

    if include_env {
        stores.push(Arc::new(EnvCredentialStore::new()));
    }

    match keychain {
        Some(kc) => stores.push(Arc::new(kc)),
        None => stores.push(Arc::new(MemoryCredentialStore::new())),
    }

    CredentialChain::new(stores)
}
