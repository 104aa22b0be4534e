//! API Middleware (Bearer Auth, Logging)

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::handlers::AppState;
use crate::models::errors::AppError;

/// Username of the verified bearer token, placed in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// Bearer token authentication for protected routes.
///
/// Missing header, wrong scheme, bad signature and expiry all answer the
/// same 403; only the log line tells them apart.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let token = match bearer_token(request.headers()) {
        Some(token) => token,
        None => {
            warn!(path = %path, "🔒 Missing or malformed Authorization header");
            return Err(AppError::invalid_token());
        }
    };

    match state.tokens.validate(token) {
        Ok(username) => {
            request.extensions_mut().insert(AuthenticatedUser(username));
            Ok(next.run(request).await)
        }
        Err(reason) => {
            warn!(path = %path, reason = %reason, "🔒 Bearer token rejected");
            Err(AppError::invalid_token())
        }
    }
}

/// Token from `Authorization: Bearer <token>` (scheme is case-insensitive)
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Request logging middleware
pub async fn logging_middleware(mut request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = uuid::Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}

/// Per-request correlation id, echoed in `x-request-id` and the
/// prediction log lines
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic YWRtaW46cGFzcw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
