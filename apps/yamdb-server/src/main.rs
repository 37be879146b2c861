//! YaMDb HTTP server.
//!
//! Loads configuration, prepares the database, optionally bootstraps a
//! superuser and serves the catalog API until interrupted.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use catalog::{CatalogModule, LogMailSender};
use clap::Parser;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, DatabaseConfig, LoggingConfig, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "yamdb-server", version, about = "YaMDb catalog and review API")]
struct Cli {
    /// YAML configuration file. `YAMDB__SECTION__KEY` variables override it.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Create a superuser admin (or promote an existing user) before serving.
    #[arg(long, num_args = 2, value_names = ["USERNAME", "EMAIL"])]
    create_admin: Option<Vec<String>>,

    /// Apply migrations and exit without serving.
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    let db = connect(&config.database).await?;
    let module = CatalogModule::new(
        db,
        &config.auth,
        &config.mail,
        &config.catalog,
        Arc::new(LogMailSender),
    )?;
    module.migrate().await.context("failed to apply migrations")?;

    if let Some([username, email]) = cli.create_admin.as_deref() {
        let admin = module
            .services()
            .users
            .bootstrap_superuser(username, email)
            .await
            .context("failed to create admin")?;
        info!(username = %admin.username, "Superuser ready");
    }

    if cli.migrate_only {
        return Ok(());
    }

    serve(&config.server, module.router()).await
}

fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .with_context(|| format!("invalid log level '{}'", cfg.level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if cfg.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }
    Ok(())
}

async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    if cfg.is_in_memory() {
        // Each pooled connection would open its own empty database.
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(cfg.max_conns);
    }
    opts.sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .context("failed to connect to database")?;
    info!(in_memory = cfg.is_in_memory(), "Connected to database");
    Ok(db)
}

async fn serve(cfg: &ServerConfig, router: Router) -> anyhow::Result<()> {
    let app = router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes)),
    );

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    info!(addr = %cfg.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
