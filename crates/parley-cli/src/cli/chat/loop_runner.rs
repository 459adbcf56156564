//! Main chat loop orchestration.
//!
//! Each accepted message runs on its own task while the loop keeps reading
//! input through `tokio::select!`. A line typed while a reply is pending is
//! rejected with a notice, not queued. Replies that arrive after `/new` are
//! discarded by the session manager.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Local;
use console::style;
use dialoguer::Password;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline_async::SharedWriter;
use secrecy::ExposeSecret;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use parley_core::chat::session::{
    Completion, PendingSubmission, SessionManager, SubmissionResult, SubmissionTicket,
};
use parley_core::credential::mask_credential;
use parley_types::chat::{SessionId, Speaker, Turn};
use parley_types::error::SubmitRejection;
use parley_types::llm::LlmError;
use parley_types::preset::RolePreset;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Settings for one chat run, after config and flags are merged.
pub struct ChatOptions {
    pub model: String,
    pub role: RolePreset,
    pub stream: bool,
}

/// Bookkeeping for the submission the user is currently waiting on.
struct InFlight {
    started: Instant,
    spinner: Option<ProgressBar>,
    streamed: Arc<AtomicBool>,
}

/// A spawned submission, resolving to its ticket and the task's join result.
type SubmissionTask = BoxFuture<'static, (SubmissionTicket, Result<SubmissionResult, JoinError>)>;

enum Flow {
    Continue,
    Exit,
}

struct ChatLoop<'a> {
    state: &'a AppState,
    manager: SessionManager,
    role: RolePreset,
    stream: bool,
    remember: bool,
    writer: SharedWriter,
    out: ChatRenderer<SharedWriter>,
    /// Current session id, read by streaming callbacks to mute stale replies.
    session_tx: watch::Sender<SessionId>,
    tasks: FuturesUnordered<SubmissionTask>,
    current: Option<InFlight>,
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState, options: ChatOptions) -> anyhow::Result<()> {
    let ChatOptions {
        model,
        role,
        stream,
    } = options;
    let remember = state.config.remember_credential;

    let mut manager = state.session_manager(&model);
    if !manager.load_saved_credential().await {
        prompt_for_key(&mut manager, remember).await;
    }

    info!(
        session_id = %manager.session_id(),
        model = %model,
        role = %role,
        stream,
        "Chat session started"
    );

    print_welcome_banner(&model, role, &manager.session_id().to_string(), stream);

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let (session_tx, _) = watch::channel(manager.session_id());
    let mut chat = ChatLoop {
        state,
        manager,
        role,
        stream,
        remember,
        out: ChatRenderer::new(writer.clone()),
        writer,
        session_tx,
        tasks: FuturesUnordered::new(),
        current: None,
    };

    if let Some(opening) = role.opening_prompt() {
        chat.submit(opening);
    }

    loop {
        tokio::select! {
            Some((ticket, joined)) = chat.tasks.next(), if !chat.tasks.is_empty() => {
                chat.on_joined(settle(ticket, joined));
            }
            event = input.read_line() => match event {
                InputEvent::Eof => break,
                InputEvent::Interrupted => {
                    chat.out.print_notice(style("Press Ctrl+D to exit, or keep chatting.").dim());
                }
                InputEvent::Message(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    if let Some(cmd) = commands::parse(&text) {
                        if let Flow::Exit = chat.handle_command(cmd, &mut input).await {
                            break;
                        }
                        continue;
                    }
                    chat.submit(&text);
                }
            },
        }
    }

    chat.finish_spinner();
    chat.out.blank();
    chat.out.line(style("Session ended.").dim());
    input.flush();

    info!(
        session_id = %chat.manager.session_id(),
        turns = chat.manager.transcript().len(),
        "Chat session ended"
    );

    Ok(())
}

impl ChatLoop<'_> {
    /// Hand `text` to the session manager and spawn the remote call.
    fn submit(&mut self, text: &str) {
        match self.manager.begin(text) {
            Ok(pending) => {
                let streamed = Arc::new(AtomicBool::new(false));
                let spinner = (!self.stream).then(thinking_spinner);
                let ticket = pending.ticket();
                let handle = self.spawn(pending, Arc::clone(&streamed));
                self.tasks.push(handle.map(move |joined| (ticket, joined)).boxed());
                self.current = Some(InFlight {
                    started: Instant::now(),
                    spinner,
                    streamed,
                });
            }
            Err(SubmitRejection::Empty) => {}
            Err(SubmitRejection::Busy) => {
                self.out.print_notice(
                    "Still waiting for the previous reply. Send this again once it arrives.",
                );
            }
            Err(rejection @ SubmitRejection::MissingCredential) => {
                self.out.print_error(&rejection.to_string());
                self.out.print_notice(format!(
                    "Set one with {} or {}",
                    style("/key <value>").yellow(),
                    style("parley key set").yellow()
                ));
            }
        }
    }

    fn spawn(&self, pending: PendingSubmission, streamed: Arc<AtomicBool>) -> JoinHandle<SubmissionResult> {
        if !self.stream {
            return tokio::spawn(pending.run());
        }

        let owner = pending.ticket().session_id;
        let session = self.session_tx.subscribe();
        let mut out = ChatRenderer::new(self.writer.clone());

        tokio::spawn(pending.run_streaming(move |delta| {
            if *session.borrow() != owner {
                return;
            }
            if !streamed.swap(true, Ordering::SeqCst) {
                out.start_streamed_reply();
            }
            let _ = write!(out.writer(), "{}", delta.replace('\n', "\n  "));
        }))
    }

    fn on_joined(&mut self, result: SubmissionResult) {
        match self.manager.complete(result) {
            Completion::Replied { text, usage } => {
                let (elapsed_ms, streamed) = self.take_current();
                if streamed {
                    self.out.blank();
                } else {
                    self.out.print_reply(&text);
                }
                self.out
                    .print_stats_footer(usage.output_tokens, elapsed_ms, &self.manager.config().model);
            }
            Completion::Failed { message } => {
                let (_, streamed) = self.take_current();
                if streamed {
                    self.out.blank();
                }
                self.out.print_error(&message);
            }
            Completion::Stale => {
                debug!("Discarded reply from a previous session");
            }
        }
    }

    async fn handle_command(&mut self, cmd: ChatCommand, input: &mut ChatInput) -> Flow {
        match cmd {
            ChatCommand::Help => {
                let _ = commands::write_help(self.out.writer());
            }
            ChatCommand::Clear => input.clear(),
            ChatCommand::Exit => return Flow::Exit,
            ChatCommand::New => {
                self.start_new_session();
                self.out.print_notice(format!(
                    "Started a new session ({})",
                    style(self.manager.session_id().short()).dim()
                ));
            }
            ChatCommand::History => self.print_history(),
            ChatCommand::Model(None) => {
                self.out
                    .print_notice(format!("Model: {}", style(&self.manager.config().model).cyan()));
            }
            ChatCommand::Model(Some(model)) => {
                self.manager.set_model(model);
                self.out.print_notice(format!(
                    "Model set to {}",
                    style(&self.manager.config().model).cyan()
                ));
            }
            ChatCommand::Role(None) => self.print_roles(),
            ChatCommand::Role(Some(name)) => match name.parse::<RolePreset>() {
                Ok(role) => {
                    self.role = role;
                    self.out.print_notice(format!(
                        "Role set to {} ({})",
                        style(role.label()).cyan(),
                        role.slug()
                    ));
                    if let Some(opening) = role.opening_prompt() {
                        self.submit(opening);
                    }
                }
                Err(e) => self.out.print_error(&e),
            },
            ChatCommand::Key(value) => {
                self.manager.set_credential(&value, self.remember).await;
                let note = if self.remember {
                    "remembered"
                } else {
                    "this session only"
                };
                self.out.print_notice(format!(
                    "Using API key {} ({note})",
                    mask_credential(value.trim())
                ));
            }
            ChatCommand::Forget => {
                self.manager.set_remember(false).await;
                self.remember = false;
                self.out
                    .print_notice("Stored API key forgotten. This session keeps using it.");
            }
            ChatCommand::Remember => {
                self.manager.set_remember(true).await;
                self.remember = true;
                let note = if self.manager.config().has_credential() {
                    "Current API key stored. New keys will be stored too."
                } else {
                    "No API key yet. The next one set with /key will be stored."
                };
                self.out.print_notice(note);
            }
            ChatCommand::Status => self.print_status(),
            ChatCommand::Unknown(name) => {
                self.out.print_notice(format!(
                    "Unknown command: {}. Type /help for available commands.",
                    style(name).dim()
                ));
            }
        }
        Flow::Continue
    }

    /// Reset the manager and mute any reply still streaming for the old session.
    fn start_new_session(&mut self) {
        self.finish_spinner();
        self.current = None;
        self.manager.reset();
        self.session_tx.send_replace(self.manager.session_id());
    }

    fn take_current(&mut self) -> (u64, bool) {
        match self.current.take() {
            Some(current) => {
                if let Some(spinner) = current.spinner {
                    spinner.finish_and_clear();
                }
                (
                    current.started.elapsed().as_millis() as u64,
                    current.streamed.load(Ordering::SeqCst),
                )
            }
            None => (0, false),
        }
    }

    fn finish_spinner(&mut self) {
        if let Some(spinner) = self.current.as_mut().and_then(|c| c.spinner.take()) {
            spinner.finish_and_clear();
        }
    }

    fn print_history(&mut self) {
        let transcript = self.manager.transcript();
        if transcript.is_empty() {
            self.out.print_notice("No messages yet.");
            return;
        }

        let lines: Vec<String> = transcript.iter().map(history_line).collect();

        self.out.blank();
        for line in lines {
            self.out.line(line);
        }
        self.out.blank();
    }

    fn print_roles(&mut self) {
        self.out.blank();
        for role in RolePreset::ALL {
            let marker = if role == self.role { "*" } else { " " };
            self.out.line(format!(
                "{marker} {:<18} {}",
                style(role.slug()).cyan(),
                role.label()
            ));
        }
        self.out.blank();
    }

    fn print_status(&mut self) {
        let manager = &self.manager;
        let credential = manager
            .config()
            .credential
            .as_ref()
            .map(|c| mask_credential(c.expose_secret()))
            .unwrap_or_else(|| "none".to_string());

        let rows = [
            ("Session", manager.session_id().short()),
            ("Model", manager.config().model.clone()),
            ("Role", self.role.slug().to_string()),
            ("Turns", manager.transcript().len().to_string()),
            ("Pending", manager.is_pending().to_string()),
            ("Error", manager.error().unwrap_or("-").to_string()),
            ("API key", credential),
            ("Config", self.state.config_path.display().to_string()),
        ];

        self.out.blank();
        for (name, value) in rows {
            self.out
                .line(format!("{:<9} {}", style(format!("{name}:")).bold(), value));
        }
        self.out.blank();
    }
}

/// Turn a joined task into a result the session manager can apply.
///
/// A task that panicked or was cancelled becomes a failure for its own
/// ticket, so the manager leaves the pending state only if that ticket is
/// still the current one.
fn settle(ticket: SubmissionTicket, joined: Result<SubmissionResult, JoinError>) -> SubmissionResult {
    match joined {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, seq = ticket.seq, "Submission task failed");
            SubmissionResult {
                ticket,
                outcome: Err(LlmError::Provider {
                    message: format!("request task failed: {e}"),
                }),
            }
        }
    }
}

/// One `/history` row: local time, speaker, and a single-line preview.
fn history_line(turn: &Turn) -> String {
    let label = match turn.speaker {
        Speaker::User => style("You").green().bold(),
        Speaker::Model => style("Gemini").cyan().bold(),
    };
    let time = turn.created_at.with_timezone(&Local).format("%H:%M");
    let text = turn.text();
    let preview = if text.chars().count() > 100 {
        format!("{}...", text.chars().take(97).collect::<String>())
    } else {
        text
    };
    format!("{} {label} {}", style(time).dim(), preview.replace('\n', " "))
}

/// Ask for an API key before the chat starts. Skipped keys can be set later with `/key`.
async fn prompt_for_key(manager: &mut SessionManager, remember: bool) {
    println!();
    println!(
        "  {} No Gemini API key found. Paste one below, or press Enter to skip.",
        style("i").blue().bold()
    );

    match Password::new()
        .with_prompt("  Gemini API key")
        .allow_empty_password(true)
        .interact()
    {
        Ok(value) if !value.trim().is_empty() => {
            manager.set_credential(&value, remember).await;
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Could not read API key"),
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> SubmissionTicket {
        SubmissionTicket {
            session_id: SessionId::new(),
            seq: 3,
        }
    }

    #[tokio::test]
    async fn test_settle_turns_panicked_task_into_failure() {
        let ticket = ticket();
        let handle: JoinHandle<SubmissionResult> = tokio::spawn(async { panic!("boom") });

        let result = settle(ticket, handle.await);

        assert_eq!(result.ticket, ticket);
        match result.outcome {
            Err(LlmError::Provider { message }) => {
                assert!(message.starts_with("request task failed"), "{message}");
            }
            other => panic!("expected a provider failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_settle_passes_result_through() {
        let ticket = ticket();
        let handle = tokio::spawn(async move {
            SubmissionResult {
                ticket,
                outcome: Err(LlmError::RateLimited),
            }
        });

        let result = settle(ticket, handle.await);
        assert!(matches!(result.outcome, Err(LlmError::RateLimited)));
    }

    #[test]
    fn test_history_line_shows_time_and_preview() {
        let turn = Turn::user(format!("first line\n{}", "x".repeat(120)));
        let line = console::strip_ansi_codes(&history_line(&turn)).to_string();

        let time = turn.created_at.with_timezone(&Local).format("%H:%M").to_string();
        assert!(line.starts_with(&format!("{time} You first line x")), "{line}");
        assert!(line.ends_with("..."));
        assert!(!line.contains('\n'));
    }
}
