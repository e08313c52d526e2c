use std::borrow::Cow;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use workforce_core::{CompanyId, DomainError, Entity, PermissionId, RoleId, ValueObject};

use crate::PermissionCode;
use crate::codes::*;

/// Role code used for RBAC (`SUPER_ADMIN`, `HR`, `SITE_LEAD`, ...).
///
/// Codes are unique across the registry and are ASCII uppercase letters,
/// digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleCode(Cow<'static, str>);

impl RoleCode {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Result<Self, DomainError> {
        let code = code.into();
        let valid = code
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(DomainError::validation(format!(
                "role code '{code}' must be uppercase ascii ([A-Z][A-Z0-9_]*)"
            )));
        }
        Ok(Self(code))
    }

    const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for RoleCode {}

impl TryFrom<String> for RoleCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleCode> for String {
    fn from(value: RoleCode) -> Self {
        value.0.into_owned()
    }
}

impl core::fmt::Display for RoleCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// System-wide; carries no company.
    Global,
    /// Tenant-restricted; carries the owning company.
    Company,
}

/// The six seeded, deletion-protected roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemRole {
    SuperAdmin,
    Admin,
    Manager,
    Hr,
    Employee,
    Client,
}

const EMPLOYEE_GRANTS: &[PermissionCode] = &[
    DASHBOARD_VIEW,
    PROJECT_VIEW,
    TASK_VIEW,
    TASK_CREATE,
    ATTENDANCE_VIEW,
    ATTENDANCE_MARK,
    LEAVE_VIEW,
    LEAVE_APPLY,
    SETTINGS_VIEW,
    EMPLOYEE_VIEW,
];

const MANAGER_GRANTS: &[PermissionCode] = &[
    PROJECT_VIEW_ALL,
    PROJECT_CREATE,
    PROJECT_EDIT,
    PROJECT_DELETE,
    TASK_VIEW_ALL,
    TASK_EDIT,
    TASK_DELETE,
    TASK_ASSIGN,
    ATTENDANCE_VIEW_ALL,
    ATTENDANCE_APPROVE,
    ATTENDANCE_EDIT,
    LEAVE_VIEW_ALL,
    LEAVE_APPROVE,
    LEAVE_CANCEL,
    EMPLOYEE_VIEW_ALL,
    REPORT_VIEW,
    REPORT_CREATE,
    REPORT_EXPORT,
    CLIENT_VIEW,
    CLIENT_CREATE,
    CLIENT_EDIT,
    LEAD_VIEW,
    LEAD_CREATE,
    LEAD_EDIT,
    INVOICE_VIEW,
    INVOICE_CREATE,
    INVOICE_EDIT,
];

const HR_GRANTS: &[PermissionCode] = &[
    EMPLOYEE_VIEW_ALL,
    EMPLOYEE_CREATE,
    EMPLOYEE_EDIT,
    ATTENDANCE_VIEW_ALL,
    ATTENDANCE_APPROVE,
    ATTENDANCE_EDIT,
    LEAVE_VIEW_ALL,
    LEAVE_APPROVE,
    LEAVE_CANCEL,
    HOLIDAY_VIEW,
    HOLIDAY_MANAGE,
    SHIFT_VIEW,
    SHIFT_MANAGE,
    PAYROLL_VIEW,
    PAYROLL_VIEW_ALL,
    PAYROLL_MANAGE,
    SALARY_VIEW,
    SALARY_VIEW_ALL,
    SALARY_CREATE,
    SALARY_EDIT,
    SALARY_APPROVE,
    DEPARTMENT_VIEW,
    DEPARTMENT_CREATE,
    DEPARTMENT_EDIT,
    DESIGNATION_VIEW,
    DESIGNATION_CREATE,
    DESIGNATION_EDIT,
];

const CLIENT_GRANTS: &[PermissionCode] = &[
    DASHBOARD_VIEW,
    PROJECT_VIEW_OWN,
    INVOICE_VIEW_OWN,
    CLIENT_VIEW_OWN,
    LEAD_VIEW,
    TASK_VIEW,
];

impl SystemRole {
    pub const ALL: [SystemRole; 6] = [
        SystemRole::SuperAdmin,
        SystemRole::Admin,
        SystemRole::Manager,
        SystemRole::Hr,
        SystemRole::Employee,
        SystemRole::Client,
    ];

    pub const fn code_str(self) -> &'static str {
        match self {
            SystemRole::SuperAdmin => "SUPER_ADMIN",
            SystemRole::Admin => "ADMIN",
            SystemRole::Manager => "MANAGER",
            SystemRole::Hr => "HR",
            SystemRole::Employee => "EMPLOYEE",
            SystemRole::Client => "CLIENT",
        }
    }

    pub const fn code(self) -> RoleCode {
        RoleCode::from_static(self.code_str())
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            SystemRole::SuperAdmin => "Super Admin",
            SystemRole::Admin => "Admin",
            SystemRole::Manager => "Manager",
            SystemRole::Hr => "HR Manager",
            SystemRole::Employee => "Employee",
            SystemRole::Client => "Client",
        }
    }

    pub const fn scope(self) -> RoleScope {
        match self {
            SystemRole::SuperAdmin => RoleScope::Global,
            _ => RoleScope::Company,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code_str() == code)
    }

    /// Whether the grant is derived from the catalog instead of stored.
    pub const fn has_computed_grant(self) -> bool {
        matches!(self, SystemRole::SuperAdmin | SystemRole::Admin)
    }

    /// Bootstrap grant for roles with an explicit permission set.
    pub fn seed_grants(self) -> Vec<PermissionCode> {
        match self {
            SystemRole::SuperAdmin | SystemRole::Admin => Vec::new(),
            SystemRole::Employee => EMPLOYEE_GRANTS.to_vec(),
            SystemRole::Manager => EMPLOYEE_GRANTS.iter().chain(MANAGER_GRANTS).cloned().collect(),
            SystemRole::Hr => EMPLOYEE_GRANTS.iter().chain(HR_GRANTS).cloned().collect(),
            SystemRole::Client => CLIENT_GRANTS.to_vec(),
        }
    }
}

/// A named bundle of permission ids plus a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub code: RoleCode,
    pub description: Option<String>,
    pub scope: RoleScope,
    pub company_id: Option<CompanyId>,
    pub is_system: bool,
    pub is_active: bool,
    /// Stored associations. Inactive permissions stay here; the resolver
    /// filters them out.
    pub permission_ids: BTreeSet<PermissionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn system_role(&self) -> Option<SystemRole> {
        if self.is_system {
            SystemRole::from_code(self.code.as_str())
        } else {
            None
        }
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> RoleId {
        self.id
    }
}

/// Input for creating a custom role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_scope")]
    pub scope: RoleScope,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

fn default_scope() -> RoleScope {
    RoleScope::Company
}

/// Partial role update. `code` and `scope` may only change on custom roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub scope: Option<RoleScope>,
}

/// Validate the scope/company pairing of a role.
pub(crate) fn check_scope(
    scope: RoleScope,
    company_id: Option<CompanyId>,
) -> Result<(), crate::RbacError> {
    match (scope, company_id) {
        (RoleScope::Global, Some(company)) => Err(crate::RbacError::InvalidScope(format!(
            "global role cannot belong to company {company}"
        ))),
        (RoleScope::Company, None) => Err(crate::RbacError::InvalidScope(
            "company role requires a company_id".into(),
        )),
        _ => Ok(()),
    }
}
