//! # sumd — Binary Entry Point
//!
//! `sumd serve` runs the verification service; `sumd keygen` writes a new
//! identity file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sumd_api::config::{LogFormat, ServeArgs};
use sumd_api::state::AppState;
use sumd_crypto::FullIdentity;
use sumd_record_client::IdentityVerifier;
use tracing_subscriber::EnvFilter;

/// Release integrity verification and secure download service.
#[derive(Parser, Debug)]
#[command(name = "sumd", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve(ServeArgs),

    /// Generate a fresh identity file.
    Keygen(KeygenArgs),
}

#[derive(Args, Debug)]
struct KeygenArgs {
    /// Where to write the identity. Never overwrites an existing file.
    #[arg(long, default_value = "identity.json")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => {
            init_tracing(args.log_format);
            serve(args).await
        }
        Command::Keygen(args) => {
            init_tracing(LogFormat::Text);
            keygen(&args)
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.app_config()?;
    let store_config = args.record_store_config()?;

    let identity = FullIdentity::load(&args.identity)
        .with_context(|| format!("loading identity from {}", args.identity.display()))?;
    tracing::info!(public_key = %identity.public_key(), "identity loaded");

    let verifier = IdentityVerifier::connect(store_config, Arc::new(identity))
        .await
        .context("resolving record store identity")?;

    let sweep_interval = config.sweep_interval;
    let state = AppState::new(config, verifier);
    let sweeper = state.tokens.spawn_sweeper(sweep_interval);

    let addr = args.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, reldir = %args.reldir.display(), "sumd listening");

    axum::serve(listener, sumd_api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.abort();
    tracing::info!("shutdown complete");
    Ok(())
}

fn keygen(args: &KeygenArgs) -> anyhow::Result<()> {
    let identity = FullIdentity::generate();
    identity
        .save(&args.out)
        .with_context(|| format!("writing identity to {}", args.out.display()))?;
    tracing::info!(path = %args.out.display(), "identity written");
    println!("{}", identity.public_key());
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
