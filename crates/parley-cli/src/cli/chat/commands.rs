//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for the session,
//! model, role, and stored API key.

use std::io::{self, Write};

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Start a new session (empty transcript, same model and key).
    New,
    /// Show the conversation so far.
    History,
    /// Show (`None`) or change the model.
    Model(Option<String>),
    /// List roles (`None`) or switch role.
    Role(Option<String>),
    /// Set the API key for this session.
    Key(String),
    /// Forget the stored API key.
    Forget,
    /// Store the current API key and keep storing new ones.
    Remember,
    /// Show pending state, last error, and turn count.
    Status,
    /// Unknown command, or a known one used wrongly.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, char::is_whitespace).collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts
        .get(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/new" | "/reset" => Some(ChatCommand::New),
        "/history" => Some(ChatCommand::History),
        "/model" => Some(ChatCommand::Model(arg)),
        "/role" => Some(ChatCommand::Role(arg)),
        "/key" => match arg {
            Some(value) => Some(ChatCommand::Key(value)),
            None => Some(ChatCommand::Unknown("/key requires a value".to_string())),
        },
        "/forget" => Some(ChatCommand::Forget),
        "/remember" => Some(ChatCommand::Remember),
        "/status" => Some(ChatCommand::Status),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Write the help text listing all available commands.
pub fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    let rows = [
        ("/help", "Show this help message"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat session"),
        ("/new", "Start a new session"),
        ("/history", "Show conversation history"),
        ("/model [id]", "Show or change the model"),
        ("/role [slug]", "List roles or switch role"),
        ("/key <value>", "Use this API key"),
        ("/forget", "Forget the stored API key"),
        ("/remember", "Store the current API key on this device"),
        ("/status", "Show session status"),
    ];

    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    for (name, help) in rows {
        writeln!(out, "  {:<14} {}", style(name).cyan(), help)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  {} {}",
        style("/key shows the key as you type it. Use").dim(),
        style("parley key set").yellow()
    )?;
    writeln!(out, "  {}", style("to enter it hidden.").dim())?;
    writeln!(
        out,
        "  {}",
        style("Ctrl+D to exit. You can keep typing while a reply is on its way.").dim()
    )?;
    writeln!(out)
}
