//! Configuration module for the EPC prediction API
//!
//! Everything comes from the environment, with a `.env` file filling in
//! unset keys. `JWT_SECRET` is a hard startup precondition: the process
//! refuses to start without it.

use jsonwebtoken::Algorithm;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_HOST, DEFAULT_JWT_ALGORITHM, DEFAULT_LOOKUP_PATH, DEFAULT_MODELS_DIR, DEFAULT_PORT,
};

/// Runtime configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// HMAC signing secret (never logged)
    pub jwt_secret: String,
    /// Signing algorithm, HMAC family only
    pub jwt_algorithm: Algorithm,
    /// Directory holding the model artifacts
    pub models_dir: PathBuf,
    /// Feature lookup CSV
    pub lookup_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<hidden>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("models_dir", &self.models_dir)
            .field("lookup_path", &self.lookup_path)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from process environment, filling unset keys from
    /// a `.env`-style file. A missing file is not an error.
    pub fn from_env_and_file(path: &Path) -> AppResult<Self> {
        let file = read_env_file(path)?;
        if !file.is_empty() {
            info!("📄 Read {} entries from {}", file.len(), path.display());
        }
        Self::from_source(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source<F>(get: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::missing_env("JWT_SECRET"))?;
        info!("🔑 JWT_SECRET configured (value hidden)");

        let algorithm_name =
            get("JWT_ALGORITHM").unwrap_or_else(|| DEFAULT_JWT_ALGORITHM.to_string());
        let jwt_algorithm = parse_hmac_algorithm(&algorithm_name)?;

        let host = get("EPC_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        // Hosting platforms inject PORT; EPC_PORT is for local runs
        let port = match get("PORT").or_else(|| get("EPC_PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::invalid_config(format!("Invalid port: '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        let models_dir = get("EPC_MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_DIR));
        let lookup_path = get("EPC_LOOKUP_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOOKUP_PATH));

        Ok(Self {
            host,
            port,
            jwt_secret,
            jwt_algorithm,
            models_dir,
            lookup_path,
        })
    }

    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `KEY=value` pairs from a dotenv file, empty when the file does not exist
fn read_env_file(path: &Path) -> AppResult<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => {
            return Err(AppError::invalid_config(format!(
                "Cannot read {}: {}",
                path.display(),
                e
            )))
        }
    };
    entries
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(|e| AppError::invalid_config(format!("Cannot parse {}: {}", path.display(), e)))
}

/// Only shared-secret algorithms make sense with a string secret
fn parse_hmac_algorithm(name: &str) -> AppResult<Algorithm> {
    let algorithm = Algorithm::from_str(name)
        .map_err(|_| AppError::invalid_config(format!("Unknown JWT_ALGORITHM: '{}'", name)))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(AppError::invalid_config(format!(
            "JWT_ALGORITHM {:?} needs a key pair; only HS256, HS384 and HS512 are supported",
            other
        ))),
    }
}
