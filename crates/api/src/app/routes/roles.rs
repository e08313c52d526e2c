use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use workforce_auth::codes::{ROLE_CREATE, ROLE_DELETE, ROLE_EDIT, ROLE_VIEW};
use workforce_auth::{AuthzError, NewRole, RbacError, Requirement, Role, RoleUpdate};
use workforce_core::RoleId;

use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:id", get(get_role).put(update_role).delete(delete_role))
        .route("/:id/permissions", put(update_role_permissions))
}

fn parse_role_id(id: &str) -> Result<RoleId, axum::response::Response> {
    id.parse().map_err(|_| errors::invalid_id("role"))
}

/// Load a role, hiding roles of other companies behind the same 404 as a
/// missing one. Global roles are visible to everyone.
pub(crate) fn visible_role(
    services: &AppServices,
    principal: &PrincipalContext,
    id: RoleId,
) -> Result<Role, axum::response::Response> {
    let role = services
        .registry
        .get_role(id)
        .map_err(errors::rbac_error_to_response)?;
    if role.company_id.is_some() && !principal.can_see_company(role.company_id) {
        return Err(errors::rbac_error_to_response(RbacError::RoleNotFound(id)));
    }
    Ok(role)
}

/// GET /roles?include_inactive=true - active roles unless asked otherwise
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::RoleListQuery>,
) -> axum::response::Response {
    let op_auth = OpAuth::require(Requirement::single(ROLE_VIEW));
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    match services.registry.list_roles() {
        Ok(roles) => {
            let visible: Vec<_> = roles
                .into_iter()
                .filter(|r| r.company_id.is_none() || principal.can_see_company(r.company_id))
                .filter(|r| r.is_active || query.include_inactive)
                .collect();
            (StatusCode::OK, Json(serde_json::json!({ "roles": visible }))).into_response()
        }
        Err(e) => errors::rbac_error_to_response(e),
    }
}

/// GET /roles/:id - role with its permissions
pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let op_auth = OpAuth::require(Requirement::single(ROLE_VIEW));
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let id = match parse_role_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let role = match visible_role(&services, &principal, id) {
        Ok(role) => role,
        Err(resp) => return resp,
    };
    let permissions = match services.registry.role_permissions(id) {
        Ok(permissions) => permissions,
        Err(e) => return errors::rbac_error_to_response(e),
    };

    (StatusCode::OK, Json(dto::role_to_json(&role, &permissions))).into_response()
}

/// POST /roles - custom, company-scoped role
pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(mut body): Json<NewRole>,
) -> axum::response::Response {
    // Omitted company defaults to the caller's own.
    if body.company_id.is_none() {
        body.company_id = principal.company_id();
    }
    if !principal.can_see_company(body.company_id) {
        return errors::authz_error_to_response(AuthzError::Forbidden);
    }

    let op_auth = OpAuth {
        inner: body,
        requirement: Requirement::single(ROLE_CREATE),
    };
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    match services.registry.create_role(op_auth.inner) {
        Ok(role) => (StatusCode::CREATED, Json(role)).into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}

/// PUT /roles/:id
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<RoleUpdate>,
) -> axum::response::Response {
    let op_auth = OpAuth {
        inner: body,
        requirement: Requirement::single(ROLE_EDIT),
    };
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let id = match parse_role_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Err(resp) = visible_role(&services, &principal, id) {
        return resp;
    }

    match services.registry.update_role(id, op_auth.inner) {
        Ok(role) => (StatusCode::OK, Json(role)).into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}

/// PUT /roles/:id/permissions - bulk add/remove by permission id
pub async fn update_role_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateRolePermissionsRequest>,
) -> axum::response::Response {
    let op_auth = OpAuth {
        inner: body,
        requirement: Requirement::single(ROLE_EDIT),
    };
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let id = match parse_role_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Err(resp) = visible_role(&services, &principal, id) {
        return resp;
    }

    let change = op_auth.inner;
    let role = match services.registry.update_role_permission_ids(
        id,
        &change.add_permission_ids,
        &change.remove_permission_ids,
    ) {
        Ok(role) => role,
        Err(e) => return errors::rbac_error_to_response(e),
    };
    let permissions = match services.registry.role_permissions(id) {
        Ok(permissions) => permissions,
        Err(e) => return errors::rbac_error_to_response(e),
    };

    (StatusCode::OK, Json(dto::role_to_json(&role, &permissions))).into_response()
}

/// DELETE /roles/:id - system roles and roles in use are refused
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let op_auth = OpAuth::require(Requirement::single(ROLE_DELETE));
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let id = match parse_role_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Err(resp) = visible_role(&services, &principal, id) {
        return resp;
    }

    match services.registry.delete_role(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}
