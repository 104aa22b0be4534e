//! Prediction Service - lookup, inference and rating mapping
//!
//! Every failure comes back as a [`PredictionError`]; nothing a model does
//! can fail the request itself.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::classifier::InferenceError;
use crate::core::lookup::{LookupRow, LookupTable};
use crate::core::registry::ModelRegistry;
use crate::models::types::Rating;

/// Successful prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub lmk_key: String,
    pub address: String,
    pub rating: Rating,
    /// Registered name of the model that produced the rating
    pub model_name: String,
}

/// Which input the caller searched by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    Identifier,
    Address,
}

/// Domain-level prediction failure
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Empty (or non-string) input
    InvalidInput(SearchKey),
    /// No model selected yet, or the last selection failed
    NoModelLoaded,
    /// Nothing in the lookup table matches
    NotFound { key: SearchKey, value: String },
    /// The model raised an error
    InferenceFailed(InferenceError),
    /// The model returned something that is not a rating code
    MalformedOutput(String),
}

impl PredictionError {
    /// Stable tag for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NoModelLoaded => "no_model_loaded",
            Self::NotFound { .. } => "not_found",
            Self::InferenceFailed(_) => "inference_failed",
            Self::MalformedOutput(_) => "malformed_output",
        }
    }
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(SearchKey::Identifier) => {
                f.write_str("Invalid LMK_KEY. Please provide a valid property identifier.")
            }
            Self::InvalidInput(SearchKey::Address) => {
                f.write_str("Invalid property address. Please provide a valid address.")
            }
            Self::NoModelLoaded => f.write_str("No model loaded. Please select a model first."),
            Self::NotFound {
                key: SearchKey::Identifier,
                value,
            } => write!(f, "LMK_KEY '{}' not found in dataset.", value),
            Self::NotFound {
                key: SearchKey::Address,
                value,
            } => write!(f, "Address '{}' not found in dataset.", value),
            Self::InferenceFailed(err) => write!(f, "Prediction failed: {}", err),
            Self::MalformedOutput(msg) => write!(f, "Prediction failed: {}", msg),
        }
    }
}

impl std::error::Error for PredictionError {}

/// Resolves features and runs the active model
#[derive(Clone)]
pub struct PredictionService {
    lookup: Arc<LookupTable>,
    registry: Arc<ModelRegistry>,
}

impl PredictionService {
    pub fn new(lookup: Arc<LookupTable>, registry: Arc<ModelRegistry>) -> Self {
        Self { lookup, registry }
    }

    pub fn predict_by_identifier(&self, lmk_key: &str) -> Result<PredictionResult, PredictionError> {
        self.predict(SearchKey::Identifier, lmk_key, |table| {
            table.by_identifier(lmk_key)
        })
    }

    pub fn predict_by_address(&self, address: &str) -> Result<PredictionResult, PredictionError> {
        self.predict(SearchKey::Address, address, |table| table.by_address(address))
    }

    fn predict<'a, F>(
        &'a self,
        key: SearchKey,
        input: &str,
        find: F,
    ) -> Result<PredictionResult, PredictionError>
    where
        F: FnOnce(&'a LookupTable) -> Option<&'a LookupRow>,
    {
        if input.is_empty() {
            return Err(PredictionError::InvalidInput(key));
        }

        let active = self
            .registry
            .active()
            .ok_or(PredictionError::NoModelLoaded)?;

        let row = find(self.lookup.as_ref()).ok_or_else(|| PredictionError::NotFound {
            key,
            value: input.to_string(),
        })?;

        let predictions = active
            .model
            .predict(std::slice::from_ref(&row.features))
            .map_err(|err| {
                warn!(model = %active.name, lmk_key = %row.lmk_key, "⚠️ Inference failed: {}", err);
                PredictionError::InferenceFailed(err)
            })?;

        let code = rating_code(&predictions)?;
        let rating = Rating::from_code(code);
        debug!(
            model = %active.name,
            lmk_key = %row.lmk_key,
            code = rating.code,
            letter = %rating.letter,
            "Prediction complete"
        );

        Ok(PredictionResult {
            lmk_key: row.lmk_key.clone(),
            address: row.address.clone(),
            rating,
            model_name: active.name,
        })
    }
}

/// First predicted label as an integer code, truncating toward zero
fn rating_code(predictions: &[f64]) -> Result<i64, PredictionError> {
    let first = predictions
        .first()
        .ok_or_else(|| PredictionError::MalformedOutput("model returned no predictions".to_string()))?;
    if !first.is_finite() {
        return Err(PredictionError::MalformedOutput(format!(
            "model returned non-numeric label {}",
            first
        )));
    }
    // saturates at the i64 bounds; such codes map to Unknown anyway
    Ok(first.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::Classifier;
    use crate::models::types::RatingLetter;

    const SAMPLE: &str = "\
LMK_KEY,PROPERTY_ADDRESS,CURRENT_ENERGY_EFFICIENCY
K1,\"36, Lea Hall Green, B20 2AW\",72
K2,\"7 Mill Lane, York, YO1 7HH\",40
";

    /// Returns a fixed output regardless of input
    struct Fixed(Result<Vec<f64>, InferenceError>);

    impl Classifier for Fixed {
        fn predict(&self, _rows: &[Vec<f64>]) -> Result<Vec<f64>, InferenceError> {
            self.0.clone()
        }

        fn family(&self) -> &'static str {
            "fixed"
        }
    }

    /// Echoes the first feature divided by ten
    struct Echo;

    impl Classifier for Echo {
        fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, InferenceError> {
            Ok(rows.iter().map(|r| r[0] / 10.0).collect())
        }

        fn family(&self) -> &'static str {
            "echo"
        }
    }

    fn service() -> (PredictionService, Arc<ModelRegistry>) {
        let lookup = Arc::new(LookupTable::from_reader(SAMPLE.as_bytes()).unwrap());
        let registry = Arc::new(ModelRegistry::new("unused"));
        (PredictionService::new(lookup, registry.clone()), registry)
    }

    #[test]
    fn test_predict_by_identifier() {
        let (service, registry) = service();
        registry.install("Echo", Arc::new(Echo));

        let result = service.predict_by_identifier("K1").unwrap();
        assert_eq!(result.lmk_key, "K1");
        assert_eq!(result.address, "36, Lea Hall Green, B20 2AW");
        // 72 / 10 = 7.2 -> 7 -> outside the table
        assert_eq!(result.rating.code, 7);
        assert_eq!(result.rating.letter, RatingLetter::Unknown);
        assert_eq!(result.model_name, "Echo");

        let result = service.predict_by_identifier("K2").unwrap();
        assert_eq!(result.rating.code, 4);
        assert_eq!(result.rating.letter, RatingLetter::E);
    }

    #[test]
    fn test_predict_by_address_ignores_case() {
        let (service, registry) = service();
        registry.install("Echo", Arc::new(Echo));

        let a = service.predict_by_address("36, Lea Hall Green, B20 2AW").unwrap();
        let b = service.predict_by_address("36, LEA HALL GREEN, b20 2aw").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.lmk_key, "K1");
    }

    #[test]
    fn test_empty_input_checked_before_model() {
        let (service, _) = service();
        let err = service.predict_by_identifier("").unwrap_err();
        assert_eq!(err, PredictionError::InvalidInput(SearchKey::Identifier));
        assert_eq!(
            err.to_string(),
            "Invalid LMK_KEY. Please provide a valid property identifier."
        );

        let err = service.predict_by_address("").unwrap_err();
        assert_eq!(err, PredictionError::InvalidInput(SearchKey::Address));
    }

    #[test]
    fn test_no_model_loaded() {
        let (service, _) = service();
        let err = service.predict_by_identifier("K1").unwrap_err();
        assert_eq!(err, PredictionError::NoModelLoaded);
        assert_eq!(err.to_string(), "No model loaded. Please select a model first.");
    }

    #[test]
    fn test_not_found_messages() {
        let (service, registry) = service();
        registry.install("Echo", Arc::new(Echo));

        let err = service.predict_by_identifier("K404").unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.to_string(), "LMK_KEY 'K404' not found in dataset.");

        let err = service.predict_by_address("1 Nowhere Road").unwrap_err();
        assert_eq!(err.to_string(), "Address '1 Nowhere Road' not found in dataset.");
    }

    #[test]
    fn test_model_failure_is_contained() {
        let (service, registry) = service();
        registry.install(
            "Broken",
            Arc::new(Fixed(Err(InferenceError::FeatureCount { expected: 9, got: 1 }))),
        );

        let err = service.predict_by_identifier("K1").unwrap_err();
        assert_eq!(err.kind(), "inference_failed");
        assert!(err.to_string().starts_with("Prediction failed: "));
        assert!(err.to_string().contains("expecting 9 features"));
    }

    #[test]
    fn test_malformed_output() {
        let (service, registry) = service();

        registry.install("Empty", Arc::new(Fixed(Ok(vec![]))));
        let err = service.predict_by_identifier("K1").unwrap_err();
        assert_eq!(err.kind(), "malformed_output");

        registry.install("NaN", Arc::new(Fixed(Ok(vec![f64::NAN]))));
        let err = service.predict_by_identifier("K1").unwrap_err();
        assert_eq!(err.kind(), "malformed_output");
    }

    #[test]
    fn test_huge_label_saturates_to_unknown() {
        let (service, registry) = service();
        registry.install("Huge", Arc::new(Fixed(Ok(vec![1e300]))));
        let result = service.predict_by_identifier("K1").unwrap();
        assert_eq!(result.rating.code, i64::MAX);
        assert_eq!(result.rating.letter, RatingLetter::Unknown);

        registry.install("Negative", Arc::new(Fixed(Ok(vec![-2.9]))));
        let result = service.predict_by_identifier("K1").unwrap();
        assert_eq!(result.rating.code, -2);
        assert_eq!(result.rating.letter, RatingLetter::Unknown);
    }

    #[test]
    fn test_first_prediction_used() {
        let (service, registry) = service();
        registry.install("Fixed", Arc::new(Fixed(Ok(vec![3.0, 6.0]))));
        let result = service.predict_by_identifier("K1").unwrap();
        assert_eq!(result.rating.letter, RatingLetter::D);
    }
}
