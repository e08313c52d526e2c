use workforce_auth::{Principal, RoleCode};
use workforce_core::{CompanyId, RoleId, UserId};

/// Principal context for a request (authenticated user + resolved role).
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn role_id(&self) -> RoleId {
        self.principal.role_id
    }

    pub fn role_code(&self) -> &RoleCode {
        &self.principal.role_code
    }

    /// `None` for globally scoped principals, which see every company.
    pub fn company_id(&self) -> Option<CompanyId> {
        self.principal.company_id
    }

    /// Whether data owned by `company` is visible to this principal.
    pub fn can_see_company(&self, company: Option<CompanyId>) -> bool {
        match self.principal.company_id {
            None => true,
            Some(own) => company == Some(own),
        }
    }
}
