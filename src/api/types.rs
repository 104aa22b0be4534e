//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::core::prediction::{PredictionError, PredictionResult};
use crate::core::registry::{ActiveSummary, CatalogEntry};
use crate::models::types::RatingLetter;

/// Transport-level error body (`{"detail": "..."}`)
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

// ============================================
// Login
// ============================================

/// Form-encoded login body
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ============================================
// Model Selection
// ============================================

#[derive(Debug, Deserialize)]
pub struct ModelRequest {
    pub model_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ModelCatalogData {
    pub models: Vec<CatalogEntry>,
    pub active: Option<ActiveSummary>,
    /// Feature columns fed to the model, in order
    pub features: Vec<String>,
}

// ============================================
// Prediction
// ============================================

/// Non-string values are accepted here and treated as invalid input by
/// the prediction service.
#[derive(Debug, Deserialize)]
pub struct LmkPredictionRequest {
    #[serde(default)]
    pub lmk_key: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct AddressPredictionRequest {
    #[serde(default)]
    pub address: serde_json::Value,
}

/// String payload, or empty for anything else
pub fn text_input(value: &serde_json::Value) -> &str {
    value.as_str().unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct PredictionData {
    pub lmk_key: String,
    pub property_address: String,
    pub predicted_potential_energy_rating: i64,
    pub predicted_rating_letter: RatingLetter,
}

impl From<PredictionResult> for PredictionData {
    fn from(result: PredictionResult) -> Self {
        Self {
            lmk_key: result.lmk_key,
            property_address: result.address,
            predicted_potential_energy_rating: result.rating.code,
            predicted_rating_letter: result.rating.letter,
        }
    }
}

/// Domain-level failures still answer 200; callers check for `error`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Success(PredictionData),
    Failure { error: String },
}

impl From<Result<PredictionResult, PredictionError>> for PredictionResponse {
    fn from(result: Result<PredictionResult, PredictionError>) -> Self {
        match result {
            Ok(result) => Self::Success(result.into()),
            Err(err) => Self::Failure {
                error: err.to_string(),
            },
        }
    }
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub lookup_rows: usize,
    pub active_model: Option<String>,
}
