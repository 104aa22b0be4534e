//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so it can be grepped in logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - AUTH_xxx: Login and token errors
//! - MODEL_xxx: Model selection / artifact errors
//! - LOOKUP_xxx: Feature table errors
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;
use std::path::Path;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Auth Errors (1xx)
    // ============================================
    /// Username/password pair not registered
    AuthInvalidCredentials,
    /// Bearer token missing, malformed, badly signed or expired
    AuthInvalidToken,
    /// Token could not be signed
    AuthSigningFailed,

    // ============================================
    // Model Errors (2xx)
    // ============================================
    /// Name not present in the model file map
    ModelUnknownName,
    /// Mapped artifact file is absent
    ModelFileNotFound,
    /// Artifact exists but could not be read or decoded
    ModelDecodeFailed,

    // ============================================
    // Lookup Errors (3xx)
    // ============================================
    /// Feature table could not be loaded
    LookupLoadFailed,

    // ============================================
    // API Errors (4xx)
    // ============================================
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors (5xx)
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Auth Errors
            Self::AuthInvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::AuthInvalidToken => "AUTH_INVALID_TOKEN",
            Self::AuthSigningFailed => "AUTH_SIGNING_FAILED",

            // Model Errors
            Self::ModelUnknownName => "MODEL_UNKNOWN_NAME",
            Self::ModelFileNotFound => "MODEL_FILE_NOT_FOUND",
            Self::ModelDecodeFailed => "MODEL_DECODE_FAILED",

            // Lookup Errors
            Self::LookupLoadFailed => "LOOKUP_LOAD_FAILED",

            // API Errors
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            // Configuration Errors
            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            // Generic
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ModelUnknownName
            | Self::ModelFileNotFound
            | Self::ModelDecodeFailed => 400,
            Self::AuthInvalidCredentials => 401,
            Self::AuthInvalidToken => 403,
            _ => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Login rejected
    pub fn invalid_credentials() -> Self {
        Self::new(
            ErrorCode::AuthInvalidCredentials,
            "Invalid username or password",
        )
    }

    /// Protected route hit without a usable bearer token
    pub fn invalid_token() -> Self {
        Self::new(ErrorCode::AuthInvalidToken, "Invalid or expired JWT token.")
    }

    /// Model name not in the file map
    pub fn unknown_model(name: &str) -> Self {
        Self::new(
            ErrorCode::ModelUnknownName,
            format!("Unknown model name: '{}'", name),
        )
    }

    /// Model artifact missing on disk
    pub fn model_file_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::ModelFileNotFound,
            format!("Model file not found at path: {}", path.display()),
        )
    }

    /// Model artifact unreadable
    pub fn model_decode_failed(
        path: &Path,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        let message = format!("Failed to load model from {}: {}", path.display(), source);
        Self::with_source(ErrorCode::ModelDecodeFailed, message, source)
    }

    /// Lookup table unreadable
    pub fn lookup_load_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::LookupLoadFailed, msg)
    }

    /// Missing environment variable
    pub fn missing_env(key: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("{} is not set in the environment or the .env file", key),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ModelDecodeFailed, "JSON parse error", err)
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        let message = format!("CSV error: {}", err);
        Self::with_source(ErrorCode::LookupLoadFailed, message, err)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::with_source(ErrorCode::AuthSigningFailed, "JWT signing failed", err)
    }
}
