//! SplitLedger API Server
//!
//! Main entry point for the SplitLedger backend service.

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use splitledger_api::{AppState, create_router};
use splitledger_core::storage::{ReceiptStorage, StorageConfig};
use splitledger_db::{connect_with, migrate};
use splitledger_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "splitledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");
    migrate(&db).await?;

    let storage = match ReceiptStorage::from_config(StorageConfig::from(&config.storage)) {
        Ok(storage) => {
            info!(
                receipts_dir = %config.storage.receipts_dir,
                max_file_size = config.storage.max_file_size,
                "Receipt storage configured"
            );
            Some(storage)
        }
        Err(e) => {
            warn!(error = %e, "Receipt storage unavailable, receipt routes will return 503");
            None
        }
    };

    let app = create_router(AppState::new(db, storage));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
