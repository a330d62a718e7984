mod config;
mod email;
mod error;
mod handlers;
mod registration;
mod server;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::Duration;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use circurent_auth::SessionIssuer;
use circurent_store_memory::MemoryUserStore;
use circurent_verification::{MemoryCodeStore, Sweeper, DEFAULT_SWEEP_INTERVAL};

use config::ServerConfig;
use server::{app, AppState, EmailSender};

#[derive(Parser)]
#[command(name = "circurent-server")]
#[command(about = "CircuRent registration and verification server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API server
    Serve {
        /// Server address
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { addr } => serve(&addr).await,
    }
}

async fn serve(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let email = match &config.email {
        Some(email_config) => {
            let provider = email::create_provider(email_config)?;
            tracing::info!(from = %email_config.from_address, "email provider configured");
            Some(EmailSender {
                provider: Arc::from(provider),
                from_address: email_config.from_address.clone(),
                from_name: email_config.from_name.clone(),
            })
        }
        None => {
            tracing::warn!("no email provider configured; verification emails will fail");
            None
        }
    };

    let sessions = Arc::new(SessionIssuer::new(
        config.session.secret.as_bytes().to_vec(),
        Duration::days(config.session.ttl_days),
    ));

    let codes = Arc::new(MemoryCodeStore::new());
    let mut sweeper = Sweeper::start(codes.clone(), DEFAULT_SWEEP_INTERVAL);

    let state = AppState {
        users: Arc::new(MemoryUserStore::new()),
        codes,
        email,
        sessions,
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(state)).await?;

    sweeper.stop();
    Ok(())
}
