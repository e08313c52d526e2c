//! Registry error model.

use thiserror::Error;

use workforce_core::{DomainError, PermissionId, RoleId};

/// How a registry error must be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller input was rejected; the reason may be returned verbatim.
    Validation,
    /// A role/permission addressed by the caller does not exist.
    NotFound,
    /// Internal inconsistency; log/alert and return a generic server error.
    Integrity,
}

/// Errors raised by the permission catalog and role registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RbacError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("permission code '{0}' already exists")]
    DuplicatePermissionCode(String),

    #[error("role code '{0}' already exists")]
    DuplicateRoleCode(String),

    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("role {0} not found")]
    RoleNotFound(RoleId),

    #[error("permission '{0}' not found")]
    PermissionNotFound(String),

    #[error("permission {0} not found")]
    PermissionIdNotFound(PermissionId),

    #[error("unknown permission code(s): {0}")]
    UnknownPermissionCode(String),

    #[error("unknown permission id(s): {0}")]
    UnknownPermissionId(String),

    #[error("system role '{0}' cannot change its code, scope or active flag")]
    SystemRoleImmutable(String),

    #[error("system role '{0}' cannot be deleted")]
    SystemRoleProtected(String),

    #[error("role '{code}' is assigned to {users} user(s); reassign them first")]
    RoleInUse { code: String, users: usize },

    #[error("role '{0}' derives its grant from the catalog; its permission set cannot be edited")]
    ComputedRoleGrant(String),

    #[error("permission '{0}' is held only through the SUPER_ADMIN role")]
    ReservedPermission(String),

    #[error("permission '{0}' cannot be deactivated")]
    PermissionPinned(String),

    #[error("role '{0}' is inactive")]
    RoleInactive(String),

    #[error("no ownership rule registered for action '{0}'")]
    UnknownGuardedAction(String),

    #[error("integrity violation: {0}")]
    Integrity(String),
}

impl RbacError {
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            RbacError::RoleNotFound(_)
            | RbacError::PermissionNotFound(_)
            | RbacError::PermissionIdNotFound(_) => ErrorClass::NotFound,
            RbacError::UnknownGuardedAction(_) | RbacError::Integrity(_) => ErrorClass::Integrity,
            _ => ErrorClass::Validation,
        }
    }
}

pub(crate) fn join_display<T: core::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
