use std::sync::Arc;

use clap::Parser;
use cropguru_core::{CropguruConfig, DocumentStore, MemoryStore, OsRandom, PgStore};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use cropguru_server::http::{self, HttpState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "cropguru.toml")]
    config: String,

    /// Ping the database and exit
    #[arg(long)]
    health: bool,

    /// Serve from an in-process store instead of PostgreSQL
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match CropguruConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Connect to the store before any route exists; one attempt, no retry
    let store: Arc<dyn DocumentStore> = if args.memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = match cropguru_core::db::create_pool(&config.database).await {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to connect to database: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = cropguru_core::db::ensure_schema(&pool).await {
            eprintln!("Failed to prepare database schema: {}", e);
            std::process::exit(1);
        }
        tracing::info!(
            "Connected to PostgreSQL: {} DB: {}",
            config.database.url,
            config.database.name
        );
        Arc::new(PgStore::new(pool))
    };

    if args.health {
        match store.ping().await {
            Ok(v) => println!("✅ Store connected: {}", v),
            Err(e) => {
                println!("❌ Store check failed: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();
    tokio::spawn(async move {
        http::shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(HttpState {
        store,
        random: Arc::new(OsRandom),
        forecast_max_days: config.forecast.max_days,
    });

    http::start_http_server(state, &config.http.addr(), tx.subscribe()).await?;

    Ok(())
}
