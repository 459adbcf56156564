//! Configuration types for Parley.
//!
//! `SessionConfig` is the live, per-session model/credential pair owned by the
//! session manager. `AppConfig` is the on-disk `config.toml` that seeds it.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::llm::DEFAULT_MODEL;
use crate::preset::RolePreset;

/// Model identifier and credential used for the next submission.
///
/// Changing either never alters turns already in the transcript.
#[derive(Debug)]
pub struct SessionConfig {
    pub model: String,
    pub credential: Option<SecretString>,
}

impl SessionConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            credential: None,
        }
    }

    /// Whether a non-blank credential is present.
    pub fn has_credential(&self) -> bool {
        self.credential
            .as_ref()
            .is_some_and(|c| !c.expose_secret().trim().is_empty())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

/// Top-level configuration loaded from `config.toml`. All fields have defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the generation API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Print replies as they stream in instead of waiting for the full text.
    #[serde(default = "default_true")]
    pub stream: bool,

    /// Persist the credential to local storage when it is entered.
    #[serde(default = "default_true")]
    pub remember_credential: bool,

    /// Role selected when a chat starts.
    #[serde(default)]
    pub role: RolePreset,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            stream: true,
            remember_credential: true,
            role: RolePreset::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(!config.has_credential());
    }

    #[test]
    fn test_session_config_blank_credential_is_unusable() {
        let mut config = SessionConfig::default();
        config.credential = Some(SecretString::from("   "));
        assert!(!config.has_credential());

        config.credential = Some(SecretString::from("AIza-test"));
        assert!(config.has_credential());
    }

    #[test]
    fn test_session_config_debug_redacts_credential() {
        let mut config = SessionConfig::default();
        config.credential = Some(SecretString::from("AIza-very-secret"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn test_app_config_deserialize_with_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.base_url.is_none());
        assert!(config.stream);
        assert!(config.remember_credential);
        assert_eq!(config.role, RolePreset::CustomerService);
    }

    #[test]
    fn test_app_config_deserialize_with_values() {
        let toml_str = r#"
model = "gemini-2.5-pro"
base_url = "http://localhost:8080/v1beta"
stream = false
remember_credential = false
role = "dinner_advisor"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1beta"));
        assert!(!config.stream);
        assert!(!config.remember_credential);
        assert_eq!(config.role, RolePreset::DinnerAdvisor);
    }
}
