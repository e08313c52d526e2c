//! API-side authorization guards.
//!
//! Enforces a declared requirement (and, where registered, an ownership rule)
//! before a handler touches any data.

use axum::response::{IntoResponse, Response};

use workforce_auth::{
    authorize, AuthzError, Decision, EffectivePermissions, OperationAuthorization, RbacError,
    ResourceFacts,
};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Why a request did not pass authorization.
#[derive(Debug)]
pub enum AccessError {
    Denied(AuthzError),
    Registry(RbacError),
}

impl From<AuthzError> for AccessError {
    fn from(value: AuthzError) -> Self {
        Self::Denied(value)
    }
}

impl From<RbacError> for AccessError {
    fn from(value: RbacError) -> Self {
        Self::Registry(value)
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        match self {
            AccessError::Denied(e) => errors::authz_error_to_response(e),
            AccessError::Registry(e) => errors::rbac_error_to_response(e),
        }
    }
}

/// Check an operation's requirement for the current principal.
///
/// Returns the effective set so handlers can run further checks without
/// resolving twice.
pub fn authorize_operation<O: OperationAuthorization>(
    services: &AppServices,
    principal: &PrincipalContext,
    operation: &O,
) -> Result<EffectivePermissions, AccessError> {
    let effective = services.registry.effective_permissions(principal.principal())?;
    authorize(&effective, &operation.requirement())?;
    Ok(effective)
}

/// Run the ownership rule registered for `action`: blanket code OR ownership.
pub fn authorize_owned(
    services: &AppServices,
    principal: &PrincipalContext,
    action: &str,
    facts: &ResourceFacts,
) -> Result<(), AccessError> {
    let effective = services.registry.effective_permissions(principal.principal())?;
    match services
        .ownership
        .evaluate(action, &effective, principal.principal(), facts)?
    {
        Decision::Allow => Ok(()),
        Decision::Deny { .. } => Err(AccessError::Denied(AuthzError::Forbidden)),
    }
}
