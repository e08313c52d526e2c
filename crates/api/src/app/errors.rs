use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use workforce_auth::{AuthzError, ErrorClass, RbacError};

use crate::app::task_board::TaskBoardError;

/// Map a registry error by class.
///
/// Validation reasons go back verbatim; integrity failures are logged and
/// answered with a generic message.
pub fn rbac_error_to_response(err: RbacError) -> axum::response::Response {
    match err.class() {
        ErrorClass::Validation => json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string()),
        ErrorClass::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ErrorClass::Integrity => {
            tracing::error!(error = %err, "authorization integrity failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}

pub fn task_board_error_to_response(err: TaskBoardError) -> axum::response::Response {
    tracing::error!(error = %err, "task board failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required")
        }
        AuthzError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "access denied"),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn invalid_id(what: &str) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
}
