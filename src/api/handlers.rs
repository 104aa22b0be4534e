//! API Request Handlers

use axum::{
    extract::{Extension, Form, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::middleware::{AuthenticatedUser, RequestId};
use super::types::*;
use crate::core::auth::{CredentialStore, TokenService};
use crate::core::lookup::LookupTable;
use crate::core::prediction::{PredictionError, PredictionResult, PredictionService};
use crate::core::registry::ModelRegistry;
use crate::models::config::AppConfig;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{APP_VERSION, TOKEN_TYPE};

/// Shared application state
pub struct AppState {
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub lookup: Arc<LookupTable>,
    pub registry: Arc<ModelRegistry>,
    pub predictor: PredictionService,
    pub start_time: Instant,
}

impl AppState {
    /// Build state from configuration, loading the lookup table from disk
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let lookup = LookupTable::from_path(&config.lookup_path)?;
        Ok(Self::with_lookup(config, lookup))
    }

    /// Build state around an already-loaded lookup table
    pub fn with_lookup(config: &AppConfig, lookup: LookupTable) -> Self {
        let lookup = Arc::new(lookup);
        let registry = Arc::new(ModelRegistry::new(config.models_dir.clone()));
        let predictor = PredictionService::new(lookup.clone(), registry.clone());

        Self {
            tokens: TokenService::new(&config.jwt_secret, config.jwt_algorithm),
            credentials: CredentialStore::default(),
            lookup,
            registry,
            predictor,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Error responses
// ============================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorDetail::new(self.message))).into_response()
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthData>, AppError> {
    // the registry lock is held for the length of a model load
    let registry = state.registry.clone();
    let active_model =
        run_blocking("Health check", move || registry.active().map(|handle| handle.name)).await?;

    Ok(Json(HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        lookup_rows: state.lookup.len(),
        active_model,
    }))
}

// ============================================
// Login
// ============================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    if !state.credentials.verify(&form.username, &form.password) {
        warn!(username = %form.username, "🔒 Login rejected");
        return Err(AppError::invalid_credentials());
    }

    let access_token = state.tokens.issue(&form.username)?;
    info!(username = %form.username, "🔑 Token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    }))
}

// ============================================
// Model Selection
// ============================================

pub async fn select_model(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<ModelRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    info!(user = %user.0, model = %req.model_name, "📦 Model selection requested");

    let registry = state.registry.clone();
    let name = req.model_name.clone();
    run_blocking("Model loading", move || registry.select(&name)).await??;

    Ok(Json(MessageResponse {
        message: format!("Model '{}' loaded successfully", req.model_name),
    }))
}

pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelCatalogData>, AppError> {
    let registry = state.registry.clone();
    let (models, active) = run_blocking("Model listing", move || {
        (registry.catalog(), registry.active_summary())
    })
    .await?;

    Ok(Json(ModelCatalogData {
        models,
        active,
        features: state.lookup.feature_names().to_vec(),
    }))
}

// ============================================
// Prediction
// ============================================

pub async fn predict_by_lmk(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<LmkPredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let lmk_key = text_input(&req.lmk_key).to_string();
    let predictor = state.predictor.clone();
    let result = run_blocking("Prediction", move || predictor.predict_by_identifier(&lmk_key)).await?;
    log_outcome(&request_id, &user, &result);
    Ok(Json(result.into()))
}

pub async fn predict_by_address(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Extension(request_id): Extension<RequestId>,
    Json(req): Json<AddressPredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let address = text_input(&req.address).to_string();
    let predictor = state.predictor.clone();
    let result = run_blocking("Prediction", move || predictor.predict_by_address(&address)).await?;
    log_outcome(&request_id, &user, &result);
    Ok(Json(result.into()))
}

// ============================================
// Helper Functions
// ============================================

/// Anything touching the registry lock, the disk or a model runs on the
/// blocking pool; a model load holds the lock for its whole duration.
async fn run_blocking<T, F>(task: &'static str, job: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(job).await.map_err(|e| {
        error!("❌ {} task failed: {}", task, e);
        AppError::internal(format!("{} task failed: {}", task, e))
    })
}

fn log_outcome(
    request_id: &RequestId,
    user: &AuthenticatedUser,
    result: &Result<PredictionResult, PredictionError>,
) {
    match result {
        Ok(prediction) => info!(
            request_id = %request_id.0,
            user = %user.0,
            model = %prediction.model_name,
            lmk_key = %prediction.lmk_key,
            rating = %prediction.rating.letter,
            "✅ Prediction served"
        ),
        Err(err) => warn!(
            request_id = %request_id.0,
            user = %user.0,
            kind = err.kind(),
            "⚠️ Prediction refused: {}",
            err
        ),
    }
}
