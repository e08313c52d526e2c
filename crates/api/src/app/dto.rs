//! Request/response DTOs and JSON mapping helpers.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Value};

use workforce_auth::{Permission, Role};
use workforce_core::{PermissionId, RoleId};

#[derive(Debug, Deserialize)]
pub struct PermissionListQuery {
    pub module: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckPermissionQuery {
    pub permission_code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRolePermissionsRequest {
    #[serde(default)]
    pub add_permission_ids: Vec<PermissionId>,
    #[serde(default)]
    pub remove_permission_ids: Vec<PermissionId>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: RoleId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskStatusQuery {
    pub new_status: String,
}

pub fn grouped_permissions_to_json(grouped: BTreeMap<String, Vec<Permission>>) -> Value {
    let total: usize = grouped.values().map(Vec::len).sum();
    json!({
        "modules": grouped,
        "total": total,
    })
}

pub fn role_to_json(role: &Role, permissions: &[Permission]) -> Value {
    json!({
        "id": role.id,
        "name": role.name,
        "code": role.code,
        "description": role.description,
        "scope": role.scope,
        "company_id": role.company_id,
        "is_system": role.is_system,
        "is_active": role.is_active,
        "permissions": permissions,
        "created_at": role.created_at,
        "updated_at": role.updated_at,
    })
}
