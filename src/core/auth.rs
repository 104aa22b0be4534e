//! Auth Module - credential check and JWT issue/verify
//!
//! Tokens are self-contained: `{sub, iat, exp}` signed with the process
//! secret. There is no server-side session state and no early revocation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::models::errors::AppResult;
use crate::utils::constants::{DEFAULT_USERS, TOKEN_TTL_SECS};

/// Signed claims set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Why a token was refused. Callers outside this module see one merged
/// "invalid" outcome; the split only feeds logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Expired,
    Invalid,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => f.write_str("token expired"),
            Self::Invalid => f.write_str("token invalid"),
        }
    }
}

/// Issues and verifies bearer tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl: Duration::seconds(TOKEN_TTL_SECS),
        }
    }

    /// Issue a token for `username`, valid for one hour from now
    pub fn issue(&self, username: &str) -> AppResult<String> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if the clock read `now`
    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Username carried by a valid token, `None` for expired or invalid ones
    pub fn verify(&self, token: &str) -> Option<String> {
        self.validate(token).ok()
    }

    /// Like [`verify`](Self::verify) but keeps the rejection reason
    pub fn validate(&self, token: &str) -> Result<String, TokenRejection> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(TokenRejection::Expired),
                _ => Err(TokenRejection::Invalid),
            },
        }
    }
}

/// Fixed in-memory username/password set
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }

    /// Exact match, no hashing
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|expected| expected == password)
            .unwrap_or(false)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_USERS)
    }
}
