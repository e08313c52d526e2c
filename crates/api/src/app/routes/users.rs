use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::put,
    Json, Router,
};

use workforce_auth::codes::{ROLE_VIEW, USER_EDIT};
use workforce_auth::{Requirement, SystemRole};
use workforce_core::{RoleId, UserId};

use crate::app::routes::common::OpAuth;
use crate::app::routes::roles;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/:id/role", put(assign_role).delete(unassign_role))
}

fn role_admin() -> Requirement {
    Requirement::all([USER_EDIT, ROLE_VIEW])
}

/// Both the user's current role and the target role must be visible to the
/// caller. Granting or revoking SUPER_ADMIN takes a superuser.
fn guard_assignment(
    services: &AppServices,
    principal: &PrincipalContext,
    user: UserId,
    target: Option<RoleId>,
) -> Result<(), axum::response::Response> {
    let current = services
        .registry
        .role_of(user)
        .map_err(errors::rbac_error_to_response)?;

    let mut touches_superuser = false;
    for role_id in current.into_iter().chain(target) {
        let role = roles::visible_role(services, principal, role_id)?;
        touches_superuser |= role.system_role() == Some(SystemRole::SuperAdmin);
    }

    if touches_superuser {
        let op_auth = OpAuth::require(Requirement::superuser());
        authz::authorize_operation(services, principal, &op_auth).map_err(IntoResponse::into_response)?;
    }
    Ok(())
}

/// PUT /users/:id/role - replace the user's single role
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AssignRoleRequest>,
) -> axum::response::Response {
    let op_auth = OpAuth {
        inner: body,
        requirement: role_admin(),
    };
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let user: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("user"),
    };

    if let Err(resp) = guard_assignment(&services, &principal, user, Some(op_auth.inner.role_id)) {
        return resp;
    }

    match services.registry.assign_role(user, op_auth.inner.role_id) {
        Ok(previous) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "user_id": user,
                "role_id": op_auth.inner.role_id,
                "previous_role_id": previous,
            })),
        )
            .into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}

/// DELETE /users/:id/role
pub async fn unassign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let op_auth = OpAuth::require(role_admin());
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    let user: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("user"),
    };

    if let Err(resp) = guard_assignment(&services, &principal, user, None) {
        return resp;
    }

    match services.registry.unassign_role(user) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::rbac_error_to_response(e),
    }
}
