//! EPC Rating Predictor API Server
//!
//! Usage:
//!   cargo run --bin epc_api
//!
//! Environment:
//!   JWT_SECRET      - Token signing secret (required)
//!   JWT_ALGORITHM   - HS256 | HS384 | HS512 (default: HS256)
//!   EPC_HOST        - Server host (default: 0.0.0.0)
//!   PORT / EPC_PORT - Server port (default: 8000)
//!   EPC_MODELS_DIR  - Model artifact directory (default: models)
//!   EPC_LOOKUP_PATH - Feature lookup CSV (default: models/epc_feature_lookup.csv)
//!   RUST_LOG        - Log filter (default: info)
//!
//! Variables may also be set in a `.env` file in the working directory;
//! the process environment wins over the file.

use epc_predictor::utils::constants::{APP_NAME, APP_VERSION, DOTENV_FILE};
use epc_predictor::{create_router, AppConfig, AppState};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("⚡ {} v{}", APP_NAME, APP_VERSION);

    // Missing JWT_SECRET (in the environment or .env) stops the process here
    let config = AppConfig::from_env_and_file(Path::new(DOTENV_FILE))?;
    info!("⚙️  Config: {:?}", config);

    let state = Arc::new(AppState::new(&config)?);

    for entry in state.registry.catalog() {
        if entry.available {
            info!("   📦 {} -> {}", entry.name, entry.file);
        } else {
            warn!("   ⚠️ {} -> {} (missing)", entry.name, entry.file);
        }
    }

    let app = create_router(state);
    let addr: SocketAddr = config.bind_addr().parse()?;

    info!("🚀 EPC Prediction API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /login               - Issue a bearer token (form: username, password)");
    info!("  POST /select_model        - Load a model by name");
    info!("  GET  /models              - Registered models and the active one");
    info!("  POST /predict/by-lmk      - Predict rating by LMK_KEY");
    info!("  POST /predict/by-address  - Predict rating by property address");
    info!("  GET  /health              - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 EPC Prediction API shutdown complete");

    Ok(())
}
