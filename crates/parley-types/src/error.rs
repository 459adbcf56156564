use thiserror::Error;

/// Reasons a submission is rejected before any network call.
///
/// A rejected submission leaves the transcript unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("message is empty")]
    Empty,

    #[error("a request is already in flight")]
    Busy,

    #[error("missing credential: enter a valid Gemini API key first")]
    MissingCredential,
}

/// Errors from credential storage backends.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential not found")]
    NotFound,

    #[error("{0} credential store is read-only")]
    ReadOnly(&'static str),

    #[error("credential backend error: {0}")]
    Backend(String),
}

/// Errors from loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(String),
}
