//! Conversation session manager.
//!
//! Owns the transcript and the session configuration, and runs each user
//! submission through the generation service. A submission is split in two
//! so the remote call can run without borrowing the manager:
//!
//! 1. [`SessionManager::begin`] validates, appends the user turn, and enters
//!    the pending state, returning a [`PendingSubmission`].
//! 2. [`PendingSubmission::run`] (or `run_streaming`) performs the single
//!    remote call.
//! 3. [`SessionManager::complete`] applies the result, unless it belongs to a
//!    session that has since been reset or to another manager.
//!
//! [`SessionManager::submit`] does all three in one call.

use std::sync::Arc;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use parley_types::chat::{EMPTY_REPLY_PLACEHOLDER, SessionId, Transcript, Turn};
use parley_types::config::SessionConfig;
use parley_types::error::SubmitRejection;
use parley_types::llm::{GenerateRequest, GenerateResponse, LlmError, StreamEvent, Usage};

use crate::credential::CREDENTIAL_KEY;
use crate::credential::store::DynCredentialStore;
use crate::llm::box_provider::BoxGenerationService;
use crate::llm::provider::GenerationConnector;

/// Identifies which session and which submission a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    pub session_id: SessionId,
    pub seq: u64,
}

/// An accepted submission whose remote call has not run yet.
///
/// Owns everything the call needs, so it can be moved into a spawned task.
pub struct PendingSubmission {
    ticket: SubmissionTicket,
    client: Arc<BoxGenerationService>,
    request: GenerateRequest,
}

/// The outcome of one remote call, tagged with its ticket.
pub struct SubmissionResult {
    pub ticket: SubmissionTicket,
    pub outcome: Result<GenerateResponse, LlmError>,
}

/// What [`SessionManager::complete`] did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A model turn was appended.
    Replied { text: String, usage: Usage },
    /// The call failed; the message is now the session error.
    Failed { message: String },
    /// The result was for a different or torn-down session and was dropped.
    Stale,
}

impl PendingSubmission {
    pub fn ticket(&self) -> SubmissionTicket {
        self.ticket
    }

    /// Perform the remote call once. No retry.
    pub async fn run(self) -> SubmissionResult {
        debug!(
            service = self.client.name(),
            model = %self.request.model,
            turns = self.request.contents.len(),
            "Sending generate request"
        );
        let outcome = self.client.generate(&self.request).await;
        SubmissionResult {
            ticket: self.ticket,
            outcome,
        }
    }

    /// Perform the remote call once through the streaming endpoint.
    ///
    /// `on_delta` sees each piece of text as it arrives. The pieces are
    /// joined into the final reply; an error at any point fails the call.
    pub async fn run_streaming<F>(self, mut on_delta: F) -> SubmissionResult
    where
        F: FnMut(&str) + Send,
    {
        debug!(
            service = self.client.name(),
            model = %self.request.model,
            turns = self.request.contents.len(),
            "Sending streaming generate request"
        );
        let mut stream = self.client.stream(self.request);
        let mut text = String::new();
        let mut response = GenerateResponse::default();

        let outcome = loop {
            match stream.next().await {
                Some(Ok(StreamEvent::TextDelta { text: delta })) => {
                    on_delta(&delta);
                    text.push_str(&delta);
                }
                Some(Ok(StreamEvent::Finished { reason })) => response.finish_reason = Some(reason),
                Some(Ok(StreamEvent::Usage(usage))) => response.usage = usage,
                Some(Ok(StreamEvent::Done)) | None => {
                    if !text.is_empty() {
                        response.text = Some(text);
                    }
                    break Ok(response);
                }
                Some(Err(e)) => break Err(e),
            }
        };

        SubmissionResult {
            ticket: self.ticket,
            outcome,
        }
    }
}

/// Manages the transcript, configuration, and pending state of one session.
///
/// State machine: `Idle -> Pending -> Idle`. Only one submission may be
/// outstanding; a second `begin` while pending is rejected, not queued.
pub struct SessionManager {
    session_id: SessionId,
    transcript: Transcript,
    config: SessionConfig,
    connector: Arc<dyn GenerationConnector>,
    store: DynCredentialStore,
    client: Option<Arc<BoxGenerationService>>,
    /// Sequence number of the in-flight submission, if any.
    pending: Option<u64>,
    next_seq: u64,
    error: Option<String>,
}

impl SessionManager {
    /// Create an empty session with the default model and no credential.
    pub fn new(connector: Arc<dyn GenerationConnector>, store: DynCredentialStore) -> Self {
        Self {
            session_id: SessionId::new(),
            transcript: Transcript::new(),
            config: SessionConfig::default(),
            connector,
            store,
            client: None,
            pending: None,
            next_seq: 0,
            error: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    // --- Read-only views ---

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The current user-visible error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    // --- Configuration ---

    /// Change the model used by the next submission.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
        info!(session_id = %self.session_id, model = %self.config.model, "Model changed");
    }

    /// Replace the credential and rebuild the service client.
    ///
    /// When `remember` is true the value is also written to the credential
    /// store; a blank value removes the stored one. Storage failures are
    /// logged and do not fail the call.
    pub async fn set_credential(&mut self, value: &str, remember: bool) {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            self.config.credential = None;
            self.client = None;
            if remember {
                self.forget_stored().await;
            }
            return;
        }

        self.install_credential(SecretString::from(trimmed.to_string()));

        if remember {
            if let Err(e) = self.store.set_boxed(CREDENTIAL_KEY, trimmed).await {
                warn!(store = self.store.name(), error = %e, "Failed to store credential");
            }
        }
    }

    /// Apply the "remember on this device" toggle.
    ///
    /// `false` removes the stored credential; `true` stores the current one.
    pub async fn set_remember(&mut self, remember: bool) {
        if !remember {
            self.forget_stored().await;
            return;
        }

        let current = self
            .config
            .credential
            .as_ref()
            .map(|c| c.expose_secret().to_string());
        if let Some(value) = current {
            if let Err(e) = self.store.set_boxed(CREDENTIAL_KEY, &value).await {
                warn!(store = self.store.name(), error = %e, "Failed to store credential");
            }
        }
    }

    /// Install a previously stored credential. Returns whether one was found.
    pub async fn load_saved_credential(&mut self) -> bool {
        match self.store.get_boxed(CREDENTIAL_KEY).await {
            Ok(Some(value)) if !value.trim().is_empty() => {
                self.install_credential(SecretString::from(value.trim().to_string()));
                debug!(store = self.store.name(), "Loaded saved credential");
                self.client.is_some()
            }
            Ok(_) => false,
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Failed to read saved credential");
                false
            }
        }
    }

    fn install_credential(&mut self, credential: SecretString) {
        self.client = match self.connector.connect(&credential) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!(error = %e, "Could not build generation client");
                None
            }
        };
        self.config.credential = Some(credential);
    }

    async fn forget_stored(&self) {
        match self.store.remove_boxed(CREDENTIAL_KEY).await {
            Ok(()) => info!(store = self.store.name(), "Stored credential removed"),
            Err(parley_types::error::CredentialError::NotFound) => {}
            Err(e) => warn!(store = self.store.name(), error = %e, "Failed to remove credential"),
        }
    }

    // --- Submission ---

    /// Validate and accept a submission.
    ///
    /// On success the user turn is already in the transcript and the manager
    /// is pending until the returned submission is completed.
    pub fn begin(&mut self, text: &str) -> Result<PendingSubmission, SubmitRejection> {
        if self.pending.is_some() {
            debug!(session_id = %self.session_id, "Submission rejected: busy");
            return Err(SubmitRejection::Busy);
        }

        let content = text.trim();
        if content.is_empty() {
            return Err(SubmitRejection::Empty);
        }

        let client = match (&self.client, self.config.has_credential()) {
            (Some(client), true) => Arc::clone(client),
            _ => {
                let rejection = SubmitRejection::MissingCredential;
                self.error = Some(rejection.to_string());
                return Err(rejection);
            }
        };

        self.error = None;
        self.transcript.append(Turn::user(content));

        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending = Some(seq);

        info!(
            session_id = %self.session_id,
            turns = self.transcript.len(),
            "Submission accepted"
        );

        Ok(PendingSubmission {
            ticket: SubmissionTicket {
                session_id: self.session_id,
                seq,
            },
            client,
            request: GenerateRequest {
                model: self.config.model.clone(),
                contents: self.transcript.turns().to_vec(),
            },
        })
    }

    /// Apply the result of a remote call and return to idle.
    pub fn complete(&mut self, result: SubmissionResult) -> Completion {
        let SubmissionResult { ticket, outcome } = result;

        if ticket.session_id != self.session_id || self.pending != Some(ticket.seq) {
            debug!(
                session_id = %self.session_id,
                result_session = %ticket.session_id,
                "Dropping stale generation result"
            );
            return Completion::Stale;
        }

        self.pending = None;

        match outcome {
            Ok(response) => {
                let text = response
                    .text
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY_PLACEHOLDER.to_string());
                self.transcript.append(Turn::model(text.clone()));
                info!(
                    session_id = %self.session_id,
                    turns = self.transcript.len(),
                    output_tokens = response.usage.output_tokens,
                    "Reply received"
                );
                Completion::Replied {
                    text,
                    usage: response.usage,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(session_id = %self.session_id, error = %message, "Generation failed");
                self.error = Some(message.clone());
                Completion::Failed { message }
            }
        }
    }

    /// Submit a message and wait for the reply.
    pub async fn submit(&mut self, text: &str) -> Result<Completion, SubmitRejection> {
        let pending = self.begin(text)?;
        let result = pending.run().await;
        Ok(self.complete(result))
    }

    /// Start a fresh session, keeping the model and credential.
    ///
    /// Results from submissions made before the reset complete as `Stale`.
    pub fn reset(&mut self) {
        let previous = self.session_id;
        self.session_id = SessionId::new();
        self.transcript = Transcript::new();
        self.pending = None;
        self.error = None;
        info!(previous = %previous, session_id = %self.session_id, "Session reset");
    }
}
