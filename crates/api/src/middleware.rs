use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use workforce_auth::{JwtValidator, RbacRegistry};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub registry: Arc<RbacRegistry>,
}

/// Bearer token -> validated claims -> principal resolved from the registry.
///
/// The token carries identity only; the role comes from the registry so a
/// reassignment takes effect on the next request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(reason) => return unauthenticated(reason),
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "token rejected");
            return unauthenticated("invalid or expired token");
        }
    };

    let principal = match state.registry.resolve_principal(claims.sub) {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "authenticated user holds no role");
            return unauthenticated("no role assigned");
        }
        Err(e) => return errors::rbac_error_to_response(e),
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));

    next.run(req).await
}

/// Runs every request inside a span carrying a fresh UUIDv7 `request_id`,
/// echoed back as `x-request-id`.
pub async fn request_span(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

fn unauthenticated(reason: &'static str) -> Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", reason)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing authorization header")?;

    let header = header.to_str().map_err(|_| "malformed authorization header")?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or("authorization scheme must be Bearer")?
        .trim();

    if token.is_empty() {
        return Err("empty bearer token");
    }

    Ok(token)
}
