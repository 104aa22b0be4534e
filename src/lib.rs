//! EPC Rating Predictor Library
//!
//! JWT-secured HTTP API that predicts a property's potential EPC energy
//! rating (A-G) from pre-trained classifiers:
//! - Login issues a one-hour bearer token
//! - One named model is loaded from disk and held as the active model
//! - Properties are looked up by LMK_KEY or address in a CSV feature table

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::api::{create_router, AppState};
pub use crate::core::{
    Classifier, CredentialStore, InferenceError, LookupRow, LookupTable, ModelArtifact,
    ModelRegistry, PredictionError, PredictionResult, PredictionService, TokenService,
};
pub use crate::models::{AppConfig, AppError, AppResult, ErrorCode, ModelKind, Rating, RatingLetter};
