//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use ivx_core::api::InterviewClient;
use ivx_core::config::Config;

mod commands;

#[derive(Parser)]
#[command(name = "ivx")]
#[command(version = "0.1")]
#[command(about = "Terminal client for the multi-round interview service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Job role to interview for (prompted if omitted)
    #[arg(long)]
    role: Option<String>,

    /// Candidate name to attach to the session
    #[arg(long)]
    name: Option<String>,

    /// Override the interview service URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show a session snapshot stored by the service
    Session {
        /// The ID of the session to show
        #[arg(value_name = "SESSION_ID")]
        id: String,
    },
    /// Show the conversation history stored by the service
    History {
        /// The ID of the session to show
        #[arg(value_name = "SESSION_ID")]
        id: String,
    },
    /// Check that the service is reachable
    Health,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    let base_url = match cli.api_url {
        Some(url) => url.trim().trim_end_matches('/').to_string(),
        None => config.resolve_base_url()?,
    };
    let client = InterviewClient::new(base_url);

    // default to interview mode
    let Some(command) = cli.command else {
        let name = cli.name.or_else(|| config.candidate_name.clone());
        return commands::interview::run(&client, cli.role, name).await;
    };

    match command {
        Commands::Session { id } => commands::session::show(&client, &id).await,
        Commands::History { id } => commands::session::history(&client, &id).await,
        Commands::Health => commands::health::run(&client).await,
    }
}
