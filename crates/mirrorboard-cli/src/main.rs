mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use tracing_subscriber::EnvFilter;

fn init_logging() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("MIRRORBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "mirrorboard", &mut std::io::stdout());
        return Ok(());
    }

    let mut ctx = CliContext::load(cli.config)?;

    match cli.command {
        Commands::Show {
            states,
            reference,
            json,
        } => {
            handlers::board::handle_show(&ctx, &states.states, &reference, json).await?;
        }
        Commands::Entities { states, json } => {
            handlers::board::handle_entities(&states.states, json).await?;
        }
        Commands::Watch { states, reference } => {
            handlers::watch::handle(&ctx, &states.states, &reference).await?;
        }
        Commands::Config { action } => {
            handlers::config::handle(&mut ctx, action).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
