use clap::{Parser, Subcommand};
use studyplan_core::{ApiClient, Config};

mod commands;

#[derive(Parser)]
#[command(name = "studyplan", version, about = "Studyplan CLI")]
struct Cli {
    /// API base URL (defaults to client.api_url from the config file)
    #[arg(long, global = true, env = "STUDYPLAN_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live Pomodoro timer
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Session ledger and reporting
    Sessions {
        #[command(subcommand)]
        action: commands::sessions::SessionsAction,
    },
    /// Subject management
    Subjects {
        #[command(subcommand)]
        action: commands::subjects::SubjectsAction,
    },
    /// Topic management
    Topics {
        #[command(subcommand)]
        action: commands::topics::TopicsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn api_client(api_url: Option<String>, config: &Config) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let url = api_url.unwrap_or_else(|| config.client.api_url.clone());
    Ok(ApiClient::new(&url)?)
}

/// Load the config and build a client for the configured (or overridden) API.
fn connect(api_url: Option<String>) -> Result<(Config, ApiClient), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let api = api_client(api_url, &config)?;
    tracing::debug!(api_url = api.base_url(), "using API");
    Ok((config, api))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Timer { action } => {
            let (config, api) = connect(cli.api_url)?;
            commands::timer::run(action, api, &config).await
        }
        Commands::Sessions { action } => {
            let (_, api) = connect(cli.api_url)?;
            commands::sessions::run(action, &api).await
        }
        Commands::Subjects { action } => {
            let (_, api) = connect(cli.api_url)?;
            commands::subjects::run(action, &api).await
        }
        Commands::Topics { action } => {
            let (_, api) = connect(cli.api_url)?;
            commands::topics::run(action, &api).await
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
