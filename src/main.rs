//! gemrelay - server-side chat relay for the Gemini API
//!
//! A small proxy that keeps the Gemini API key on the server: the browser
//! client posts chat history here, and the relay forwards it upstream with
//! the key injected from the environment.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gemrelay::config::{ApiKey, Config};

#[derive(Parser)]
#[command(name = "gemrelay")]
#[command(about = "Server-side chat relay that keeps your Gemini API key off the client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the proxy server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration file and key availability
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },
}

/// Default filter directive when RUST_LOG is not set.
///
/// `logging.level` from the config file sets the level for the crate and for
/// tower-http's request traces; RUST_LOG still overrides everything.
fn default_filter(level: &str) -> String {
    format!("gemrelay={level},tower_http={level}")
}

/// Initialize tracing with the configured fallback level.
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config: path, listen } => {
            let mut config = Config::load(&path)?;
            init_tracing(&config.logging.level);
            tracing::info!(config = %path, "Loaded configuration");

            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                config.server.listen = addr;
            }

            gemrelay::proxy::run_server(config).await
        }

        Commands::Check { config: path } => {
            let config = Config::load(&path)?;
            init_tracing(&config.logging.level);
            tracing::info!(config = %path, "Checking configuration");

            println!("config ok");
            println!("  listen:      {}", config.server.listen);
            println!("  endpoint:    {}", config.upstream.endpoint);
            println!("  api_key_env: {}", config.upstream.api_key_env);

            // Report availability only; the key value is never printed.
            match ApiKey::from_env(&config.upstream.api_key_env) {
                Some(_) => println!("  api key:     set"),
                None => println!("  api key:     not set"),
            }

            Ok(())
        }
    }
}
