//! Core Module - Business Logic
//!
//! Token issue/verify, the feature lookup table, classifier artifacts,
//! the model registry and the prediction service.

pub mod auth;
pub mod classifier;
pub mod lookup;
pub mod prediction;
pub mod registry;

pub use auth::*;
pub use classifier::{Classifier, InferenceError, ModelArtifact};
pub use lookup::*;
pub use prediction::*;
pub use registry::*;
