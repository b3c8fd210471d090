// src/main.rs
// Context Sentry - transcript-size checkpoint reminders for Claude Code

use anyhow::Result;
use clap::{Parser, Subcommand};
use sentry::config::SentryConfig;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sentry")]
#[command(about = "Transcript-size checkpoint reminders for Claude Code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Claude Code hook handlers
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },

    /// Print the effective configuration and validation report
    Config,
}

#[derive(Subcommand)]
enum HookAction {
    /// Handle PreToolUse hooks
    PreToolUse,
    /// Handle PreCompact hooks
    PreCompact,
}

fn main() -> Result<()> {
    // Load .env files (global first, then project - project overrides)
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".context-sentry/.env"));
    }
    let _ = dotenvy::dotenv(); // Load .env from current directory

    let cli = Cli::parse();
    let config = SentryConfig::from_env();

    // Hooks share stdout with Claude Code, so logging goes to stderr.
    // CONTEXT_SENTRY_DEBUG opens up the diagnostic trace channel.
    let log_level = if config.debug {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Hook { action } => {
            // A hook must never fail the tool call it observes: report
            // problems on the trace channel and exit 0 regardless.
            let result = match action {
                HookAction::PreToolUse => sentry::hooks::pre_tool::run(&config),
                HookAction::PreCompact => sentry::hooks::precompact::run(&config),
            };
            if let Err(e) = result {
                tracing::debug!("hook aborted: {e:#}");
            }
        }
        Commands::Config => {
            println!("{}", config.report());
        }
    }

    Ok(())
}
