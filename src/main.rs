use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::time::Duration;

use premium_ledger::config::Config;
use premium_ledger::db::{AppState, create_pool, init_db, queries};
use premium_ledger::handlers;
use premium_ledger::payments::CheckoutProvider;

/// Audit trail purge interval
const CLEANUP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Parser, Debug)]
#[command(name = "premium-ledger")]
#[command(about = "Order and entitlement ledger for selling premium reports")]
struct Cli {
    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Spawns a background task that trims the webhook audit trail.
/// Only started when EVENT_RETENTION_DAYS is set.
fn spawn_cleanup_task(state: AppState, retention_days: i64) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(CLEANUP_INTERVAL).await;

            match state.db.get() {
                Ok(conn) => match queries::purge_old_order_events(&conn, retention_days) {
                    Ok(count) if count > 0 => {
                        tracing::debug!("Purged {} order events older than {} days", count, retention_days);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Failed to purge order events: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to get db connection for cleanup: {}", e);
                }
            }
        }
    });

    tracing::info!("Background cleanup task started (runs every 6 hours)");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "premium_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let checkout = CheckoutProvider::from_config(&config).expect("Failed to create Stripe client");
    match &checkout {
        CheckoutProvider::Stripe(client) if !client.has_webhook_secret() => {
            tracing::warn!("STRIPE_WEBHOOK_SECRET not set: /webhook/stripe will reject every event");
        }
        CheckoutProvider::Stripe(_) => tracing::info!("Checkout via Stripe"),
        CheckoutProvider::Stub => {
            tracing::info!("STRIPE_SECRET_KEY not set: checkout uses the local stub page");
        }
    }
    if config.allow_simulated_webhooks {
        tracing::warn!("Simulated webhooks enabled: POST /webhook/simulate marks orders paid without a provider");
    }

    let state = AppState {
        db: db_pool,
        base_url: config.base_url.clone(),
        server_secret: config.server_secret.clone(),
        checkout,
        validity: config.validity.clone(),
        allow_simulated_webhooks: config.allow_simulated_webhooks,
    };

    if config.event_retention_days > 0 {
        let conn = state.db.get().expect("Failed to get connection for purge");
        match queries::purge_old_order_events(&conn, config.event_retention_days) {
            Ok(count) if count > 0 => {
                tracing::info!(
                    "Purged {} order events older than {} days",
                    count,
                    config.event_retention_days
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to purge old order events: {}", e);
            }
        }
        spawn_cleanup_task(state.clone(), config.event_retention_days);
    }

    let app = handlers::app(state).layer(TraceLayer::new_for_http());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();
    if cli.ephemeral && !config.dev_mode {
        tracing::warn!("--ephemeral ignored: not in dev mode (set APP_ENV=dev)");
    }
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Premium ledger listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
