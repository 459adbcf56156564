//! Parley terminal chat entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration and the credential chain, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, KeyCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise derive the filter from -v / --quiet
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,parley=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.config.clone(), !cli.no_keychain).await?;

    match cli.command {
        Commands::Chat {
            model,
            role,
            no_stream,
        } => {
            let options = cli::chat::loop_runner::ChatOptions {
                model: model.unwrap_or_else(|| state.config.model.clone()),
                role: role.unwrap_or(state.config.role),
                stream: state.config.stream && !no_stream,
            };
            cli::chat::loop_runner::run_chat_loop(&state, options).await?;
        }

        Commands::Key { action } => match action {
            KeyCommand::Set { value } => {
                cli::key::set_key(&state, value.as_deref(), cli.json).await?;
            }
            KeyCommand::Show => {
                cli::key::show_key(&state, cli.json).await?;
            }
            KeyCommand::Forget => {
                cli::key::forget_key(&state, cli.json).await?;
            }
        },

        Commands::Roles => {
            cli::roles::list_roles(cli.json)?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
