use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use workforce_auth::codes::TASK_CREATE;
use workforce_auth::ownership::actions;
use workforce_auth::Requirement;
use workforce_core::TaskId;

use crate::app::routes::common::OpAuth;
use crate::app::services::AppServices;
use crate::app::task_board::{NewTask, Task, TaskStatus};
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_task))
        .route("/:id", get(get_task))
        .route("/:id/status", patch(update_status))
}

/// Look a task up, hiding tasks of other companies behind a 404.
fn visible_task(
    services: &AppServices,
    principal: &PrincipalContext,
    id: &str,
) -> Result<Task, axum::response::Response> {
    let id: TaskId = id.parse().map_err(|_| errors::invalid_id("task"))?;
    services
        .tasks
        .get(id)
        .map_err(errors::task_board_error_to_response)?
        .filter(|task| principal.can_see_company(task.company_id))
        .ok_or_else(|| errors::json_error(StatusCode::NOT_FOUND, "not_found", "task not found"))
}

/// POST /tasks
pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewTask>,
) -> axum::response::Response {
    let op_auth = OpAuth {
        inner: body,
        requirement: Requirement::single(TASK_CREATE),
    };
    if let Err(e) = authz::authorize_operation(&services, &principal, &op_auth) {
        return e.into_response();
    }

    if op_auth.inner.title.trim().is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "title must not be empty");
    }

    match services
        .tasks
        .create(op_auth.inner, principal.user_id(), principal.company_id())
    {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => errors::task_board_error_to_response(e),
    }
}

/// GET /tasks/:id - `task.view_all` OR assignee
pub async fn get_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let task = match visible_task(&services, &principal, &id) {
        Ok(task) => task,
        Err(resp) => return resp,
    };

    if let Err(e) = authz::authorize_owned(&services, &principal, actions::TASK_READ, &task.facts()) {
        return e.into_response();
    }

    (StatusCode::OK, Json(task)).into_response()
}

/// PATCH /tasks/:id/status?new_status=X - `task.edit` OR assignee
pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<dto::UpdateTaskStatusQuery>,
) -> axum::response::Response {
    let status: TaskStatus = match query.new_status.parse() {
        Ok(status) => status,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
    };

    let task = match visible_task(&services, &principal, &id) {
        Ok(task) => task,
        Err(resp) => return resp,
    };

    if let Err(e) = authz::authorize_owned(
        &services,
        &principal,
        actions::TASK_UPDATE_STATUS,
        &task.facts(),
    ) {
        return e.into_response();
    }

    match services.tasks.set_status(task.id, status) {
        Ok(Some(task)) => (StatusCode::OK, Json(task)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "task not found"),
        Err(e) => errors::task_board_error_to_response(e),
    }
}
