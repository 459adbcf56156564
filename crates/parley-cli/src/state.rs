//! Application state wiring config, credential storage, and the Gemini
//! connector together for the CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use parley_core::chat::session::SessionManager;
use parley_core::credential::chain::CredentialChain;
use parley_infra::config::{default_config_path, load_app_config};
use parley_infra::credential::build_credential_chain;
use parley_infra::gemini::GeminiConnector;
use parley_infra::keychain::KeychainStore;
use parley_types::config::AppConfig;

/// Shared application state used by every command.
pub struct AppState {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub credentials: Arc<CredentialChain>,
    pub connector: Arc<GeminiConnector>,
}

impl AppState {
    /// Load the config file and build the credential chain.
    ///
    /// With `use_keychain` false the chain keeps credentials in memory only.
    pub async fn init(config_path: Option<PathBuf>, use_keychain: bool) -> anyhow::Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => default_config_path()?,
        };
        let config = load_app_config(&config_path).await;

        let keychain = use_keychain.then(KeychainStore::new);
        let credentials = Arc::new(build_credential_chain(keychain, true));

        let mut connector = GeminiConnector::new();
        if let Some(base_url) = &config.base_url {
            connector = connector.with_base_url(base_url.clone());
        }

        debug!(
            config = %config_path.display(),
            model = %config.model,
            stores = ?credentials.store_names(),
            "Application state initialized"
        );

        Ok(Self {
            config,
            config_path,
            credentials,
            connector: Arc::new(connector),
        })
    }

    /// A fresh session manager bound to this state's connector and credentials.
    pub fn session_manager(&self, model: &str) -> SessionManager {
        SessionManager::new(self.connector.clone(), self.credentials.clone()).with_model(model)
    }
}
