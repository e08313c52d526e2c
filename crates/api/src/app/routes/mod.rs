use axum::{routing::get, Router};

pub mod common;
pub mod permissions;
pub mod roles;
pub mod system;
pub mod tasks;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/permissions", permissions::router())
        .nest("/roles", roles::router())
        .nest("/users", users::router())
        .nest("/tasks", tasks::router())
}
