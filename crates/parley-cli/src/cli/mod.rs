//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. Subcommands follow a
//! noun-verb pattern where they have actions (e.g., `parley key set`).

pub mod chat;
pub mod key;
pub mod roles;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use parley_types::preset::RolePreset;

/// Chat with Google Gemini from your terminal.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config.toml (defaults to the user config directory).
    #[arg(long, global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keep credentials in memory only; never touch the OS keychain.
    #[arg(long, global = true)]
    pub no_keychain: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Model identifier (e.g., gemini-2.5-flash).
        #[arg(long, short = 'm')]
        model: Option<String>,

        /// Role preset to start with (see `parley roles`).
        #[arg(long, short = 'r')]
        role: Option<RolePreset>,

        /// Wait for the full reply instead of streaming it.
        #[arg(long)]
        no_stream: bool,
    },

    /// Manage the stored Gemini API key.
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },

    /// List the available role presets.
    Roles,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Store an API key (prompts with hidden input when --value is omitted).
    Set {
        /// Key value, for scripts. Prefer the prompt interactively.
        #[arg(long)]
        value: Option<String>,
    },

    /// Show the resolved API key, masked.
    Show,

    /// Remove the stored API key.
    #[command(alias = "rm")]
    Forget,
}
