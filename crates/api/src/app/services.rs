//! Shared application state handed to every handler.

use std::sync::Arc;

use workforce_auth::{OwnershipRules, RbacError, RbacRegistry, SystemRole};
use workforce_core::{CompanyId, UserId};

use crate::app::task_board::TaskBoard;

#[derive(Debug)]
pub struct AppServices {
    pub registry: Arc<RbacRegistry>,
    pub ownership: OwnershipRules,
    pub tasks: TaskBoard,
}

impl AppServices {
    pub fn new(registry: Arc<RbacRegistry>) -> Self {
        Self {
            registry,
            ownership: OwnershipRules::with_defaults(),
            tasks: TaskBoard::new(),
        }
    }

    /// Seeded catalog and system roles; company roles belong to `default_company`.
    pub fn seeded(default_company: CompanyId) -> Self {
        Self::new(Arc::new(RbacRegistry::seeded(default_company)))
    }

    /// Give `user` the SUPER_ADMIN role.
    pub fn bootstrap_super_admin(&self, user: UserId) -> Result<(), RbacError> {
        let role = self
            .registry
            .get_role_by_code(SystemRole::SuperAdmin.code_str())?
            .ok_or_else(|| RbacError::integrity("SUPER_ADMIN role is not seeded"))?;
        self.registry.assign_role(user, role.id)?;
        tracing::info!(user_id = %user, "bootstrap super admin assigned");
        Ok(())
    }
}
