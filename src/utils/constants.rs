//! Constants Module - Single Source of Truth
//!
//! Model file map, lookup column names, rating table and config defaults.
//! Other modules read these rather than hardcoding their own copies.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "EPC Rating Predictor";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// AUTH CONSTANTS
// ============================================

/// Token lifetime (seconds)
pub const TOKEN_TTL_SECS: i64 = 3600;

/// `token_type` returned by /login
pub const TOKEN_TYPE: &str = "bearer";

/// Demo user store. Exact-match, unhashed.
pub const DEFAULT_USERS: [(&str, &str); 1] = [("admin", "pass123")];

// ============================================
// MODEL REGISTRY
// ============================================

/// Display name -> artifact file under the models directory
pub const MODEL_FILE_MAP: [(&str, &str); 4] = [
    ("Random Forest", "rf_model.json"),
    ("XGBoost", "xgb_model.json"),
    ("Logistic Regression", "log_model.json"),
    ("MLPClassifier", "mlp_model.json"),
];

/// Resolve a display name to its artifact file
pub fn model_file_for(name: &str) -> Option<&'static str> {
    MODEL_FILE_MAP
        .iter()
        .find(|(display, _)| *display == name)
        .map(|(_, file)| *file)
}

// ============================================
// LOOKUP TABLE
// ============================================

/// Primary key column
pub const COL_LMK_KEY: &str = "LMK_KEY";

/// Display address column
pub const COL_PROPERTY_ADDRESS: &str = "PROPERTY_ADDRESS";

/// Derived lowercase address column (never a feature)
pub const COL_ADDRESS_LOWER: &str = "ADDRESS_LOWER";

/// Columns that are never passed to a model
pub const RESERVED_COLUMNS: [&str; 3] = [COL_LMK_KEY, COL_PROPERTY_ADDRESS, COL_ADDRESS_LOWER];

// ============================================
// RATINGS
// ============================================

/// Rating code -> letter, A (best) to G (worst)
pub const RATING_LETTERS: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];

/// Sentinel for codes outside 0..=6
pub const RATING_UNKNOWN: &str = "Unknown";

// ============================================
// CONFIG DEFAULTS
// ============================================

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8000;

/// Default signing algorithm
pub const DEFAULT_JWT_ALGORITHM: &str = "HS256";

/// Default model artifact directory
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Optional dotenv file read at startup
pub const DOTENV_FILE: &str = ".env";

/// Default lookup table path
pub const DEFAULT_LOOKUP_PATH: &str = "models/epc_feature_lookup.csv";
