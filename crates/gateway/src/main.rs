//! bucketgate - hands browsers single-object S3 upload credentials
//!
//! Loads the server configuration, builds the AWS clients and serves the
//! upload page plus the `/token` and `/burner` endpoints until Ctrl-C.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use service::http::Config;
use service::{ConfigError, ServerConfig, ServiceState};

/// bucketgate - scoped, short-lived S3 upload credentials for browsers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON config file; a missing file is fine
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Port to listen on, overriding the config file
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory holding the css/ and js/ assets
    #[arg(long, default_value = "public")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();

    tracing::info!("Starting bucketgate");

    let server_config = match load_server_config(&args, |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            // return rather than exit so `_guard` flushes the line above
            return Err(e.into());
        }
    };
    server_config.log_summary();

    let listen_addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let http_config = Config::new(listen_addr, args.static_dir).with_log_level(log_level);
    let state = ServiceState::from_config(server_config);

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received shutdown signal"),
            Err(e) => tracing::error!("Failed to listen for ctrl+c: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    service::http::run(http_config, state, shutdown_rx).await?;

    tracing::info!("bucketgate shutdown complete");
    Ok(())
}

/// Config file and environment, then the `--port` override.
fn load_server_config<F>(args: &Args, env: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ServerConfig::load(&args.config, env)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    Ok(config)
}
