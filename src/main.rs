//! Command-line front end for the failover inference client.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use inference_failover::config::loader::{apply_env_overrides, apply_overrides, read_config};
use inference_failover::config::validation::validate_config;
use inference_failover::config::{ConfigError, FailoverConfig};
use inference_failover::observability::{logging, metrics};
use inference_failover::{ChatMessage, ChatOptions, Deadline, InferenceClient};

#[derive(Parser)]
#[command(name = "inference-failover")]
#[command(about = "Send chat completions through a failover pair of inference backends", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Primary host ("host:port" or URL); overrides the config file.
    #[arg(long)]
    primary_host: Option<String>,

    /// Secondary host; overrides the config file.
    #[arg(long)]
    secondary_host: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one chat completion and print the provider response
    Chat {
        /// Model name
        #[arg(short, long)]
        model: String,

        /// Optional system prompt
        #[arg(short, long)]
        system: Option<String>,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Give up after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// User message
        message: String,
    },
    /// Probe every backend and print its health
    Status,
}

fn resolve_config(cli: &Cli) -> Result<FailoverConfig, ConfigError> {
    // File, then environment, then flags
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => FailoverConfig::default(),
    };
    apply_env_overrides(&mut config);
    apply_overrides(&mut config, cli.primary_host.clone(), cli.secondary_host.clone());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Err(e) = logging::init_logging(&config.observability.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    tracing::info!(
        primary_host = %config.backends.primary_host,
        secondary_host = ?config.backends.secondary_host,
        max_retries_per_backend = config.retries.max_retries_per_backend,
        health_check_interval_secs = config.health_check.interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = InferenceClient::from_config(&config)?;

    match cli.command {
        Commands::Chat {
            model,
            system,
            temperature,
            deadline_secs,
            message,
        } => {
            let mut messages = Vec::new();
            if let Some(system) = system {
                messages.push(ChatMessage::system(system));
            }
            messages.push(ChatMessage::user(message));

            let mut options = ChatOptions::new();
            if let Some(temperature) = temperature {
                options.insert("temperature".to_string(), temperature.into());
            }

            let response = match deadline_secs {
                Some(secs) => {
                    let deadline = Deadline::after(Duration::from_secs(secs));
                    client.chat_completion_until(&model, &messages, &options, deadline).await?
                }
                None => client.chat_completion(&model, &messages, &options).await?,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Status => {
            let status = client.probe_all().await;
            let report = serde_json::json!({
                "current": client.current_backend_name(),
                "current_host": client.get_current_host(),
                "backends": status,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
