use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use workforce_auth::codes::ROLE_VIEW;
use workforce_auth::{NewPermission, PermissionCode, PermissionPatch, Requirement};
use workforce_core::{PermissionId, RoleId};

use crate::app::routes::common::OpAuth;
use crate::app::routes::roles;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route("/all", get(list_grouped))
        .route("/my-permissions", get(my_permissions))
        .route("/check", post(check_permission))
        .route("/role/:role_id", get(role_permissions))
        .route("/:id", get(get_permission).put(update_permission))
}

/// GET /permissions/all - active permissions grouped by module
pub async fn list_grouped(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.registry.list_permissions_by_module() {
        Ok(grouped) => (StatusCode::OK, Json(dto::grouped_permissions_to_json(grouped))).into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}

/// GET /permissions?module=X
pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::PermissionListQuery>,
) -> axum::response::Response {
    match services.registry.list_permissions(query.module.as_deref()) {
        Ok(permissions) => {
            (StatusCode::OK, Json(serde_json::json!({ "permissions": permissions }))).into_response()
        }
        Err(e) => errors::rbac_error_to_response(e),
    }
}

pub async fn get_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PermissionId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("permission"),
    };

    match services.registry.get_permission_by_id(id) {
        Ok(permission) => (StatusCode::OK, Json(permission)).into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}

/// POST /permissions - superuser only
pub async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreatePermissionRequest>,
) -> axum::response::Response {
    let op_auth = OpAuth::require(Requirement::superuser());
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let code = match PermissionCode::new(body.code) {
        Ok(code) => code,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
    };

    let new = NewPermission {
        code,
        name: body.name,
        module: body.module,
        description: body.description,
    };

    match services.registry.register_permission(new) {
        Ok(permission) => (StatusCode::CREATED, Json(permission)).into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}

/// PUT /permissions/:id - superuser only; the code itself never changes
pub async fn update_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<PermissionPatch>,
) -> axum::response::Response {
    let op_auth = OpAuth::require(Requirement::superuser());
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let id: PermissionId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("permission"),
    };

    match services.registry.update_permission(id, body) {
        Ok(permission) => (StatusCode::OK, Json(permission)).into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}

/// GET /permissions/my-permissions - effective set of the caller
pub async fn my_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let effective = match services.registry.effective_permissions(principal.principal()) {
        Ok(effective) => effective,
        Err(e) => return errors::rbac_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user_id": principal.user_id(),
            "role_code": principal.role_code().as_str(),
            "grant": effective.grant(),
            "permissions": effective.to_sorted_vec(),
        })),
    )
        .into_response()
}

/// POST /permissions/check?permission_code=X - does the caller hold X?
pub async fn check_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::CheckPermissionQuery>,
) -> axum::response::Response {
    let code = match PermissionCode::new(query.permission_code) {
        Ok(code) => code,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
    };

    let decision = match services
        .registry
        .check(principal.principal(), &Requirement::single(code.clone()))
    {
        Ok(decision) => decision,
        Err(e) => return errors::rbac_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "permission_code": code,
            "has_permission": decision.is_allowed(),
        })),
    )
        .into_response()
}

/// GET /permissions/role/:role_id - permissions behind a role
pub async fn role_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(role_id): Path<String>,
) -> axum::response::Response {
    let op_auth = OpAuth::require(Requirement::single(ROLE_VIEW));
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let role_id: RoleId = match role_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("role"),
    };

    if let Err(resp) = roles::visible_role(&services, &principal, role_id) {
        return resp;
    }

    match services.registry.role_permissions(role_id) {
        Ok(permissions) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "role_id": role_id,
                "permissions": permissions,
            })),
        )
            .into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}
