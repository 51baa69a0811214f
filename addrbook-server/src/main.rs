//! addrbook-server - Address book HTTP service
//!
//! Startup sequence:
//! 1. Tracing (info level until the config is read)
//! 2. Build identification
//! 3. Configuration: CLI > environment > TOML > compiled defaults
//! 4. Database open/create and schema creation
//! 5. Router with CORS and request tracing, served until Ctrl+C / SIGTERM

use addrbook_common::config::{resolve_database_path, TomlConfig, CONFIG_ENV_VAR};
use addrbook_common::db::init_database;
use addrbook_server::store::SqliteAddressRepository;
use addrbook_server::{build_router, cors_layer, AppState, ListPolicy};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for addrbook-server
#[derive(Parser, Debug)]
#[command(name = "addrbook-server")]
#[command(about = "Address book HTTP service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides ADDRBOOK_DATABASE and the config file)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:8000
    #[arg(short, long, env = "ADDRBOOK_BIND")]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "ADDRBOOK_LOG_LEVEL")]
    log_level: Option<String>,
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http={}", level, level)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Reloadable so the configured level can take over once the config is read
    let (filter, filter_handle) = reload::Layer::new(env_filter("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Address Book (addrbook-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    filter_handle
        .reload(env_filter(&config.logging.level.to_ascii_lowercase()))
        .context("Failed to apply log level")?;

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let list_policy = ListPolicy::from_config(&config.api);
    if list_policy == ListPolicy::EmptyIsNotFound {
        info!("GET /address answers 404 when the store is empty");
    }

    let state = AppState::new(Arc::new(SqliteAddressRepository::new(pool)), list_policy);
    let app = build_router(state).layer(cors_layer(&config.server.cors_origins)?);

    let addr = config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("addrbook-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
