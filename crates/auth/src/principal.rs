use serde::Serialize;

use workforce_core::{CompanyId, RoleId, UserId};

use crate::roles::RoleCode;

/// A fully resolved principal for authorization decisions.
///
/// Built by [`crate::RbacRegistry::resolve_principal`] from an authenticated
/// user id; transport and token handling stay outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub role_code: RoleCode,
    /// Inherited from the role. `None` for globally scoped roles.
    ///
    /// Handlers filter returned data by this company; permission codes never
    /// encode a company.
    pub company_id: Option<CompanyId>,
}
