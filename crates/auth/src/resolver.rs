//! Effective-permission resolution.
//!
//! Resolution is a pure function of `(catalog, role)`. The grant kind is
//! decided once per role by [`Grant::for_role`]; nothing downstream compares
//! role codes again.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::PermissionCatalog;
use crate::codes::SUPER_ADMIN;
use crate::roles::{Role, SystemRole};
use crate::PermissionCode;

/// How a role's effective set is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// Every active catalog entry, including ones added after the role.
    FullCatalog,
    /// Every active catalog entry except the super-admin code.
    AllExceptSuperuser,
    /// The role's stored permission ids, filtered to active entries.
    Explicit,
}

impl Grant {
    pub fn for_role(role: &Role) -> Self {
        match role.system_role() {
            Some(SystemRole::SuperAdmin) => Grant::FullCatalog,
            Some(SystemRole::Admin) => Grant::AllExceptSuperuser,
            _ => Grant::Explicit,
        }
    }

    pub const fn is_computed(self) -> bool {
        !matches!(self, Grant::Explicit)
    }
}

/// The concrete set of codes a principal currently holds.
///
/// Cheap to clone; the code set is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissions {
    grant: Grant,
    codes: Arc<HashSet<PermissionCode>>,
    version: u64,
}

impl EffectivePermissions {
    pub fn new(grant: Grant, codes: HashSet<PermissionCode>, version: u64) -> Self {
        Self {
            grant,
            codes: Arc::new(codes),
            version,
        }
    }

    /// Effective set built directly from codes (tests, fixtures).
    pub fn from_codes<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = PermissionCode>,
    {
        Self::new(Grant::Explicit, codes.into_iter().collect(), 0)
    }

    pub fn grant(&self) -> Grant {
        self.grant
    }

    /// Registry version the set was computed against.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &HashSet<PermissionCode> {
        &self.codes
    }

    pub fn to_sorted_vec(&self) -> Vec<PermissionCode> {
        let mut codes: Vec<PermissionCode> = self.codes.iter().cloned().collect();
        codes.sort();
        codes
    }
}

/// Compute the effective set of `role` against the live `catalog`.
///
/// Inactive catalog entries are never granted. An inactive role grants
/// nothing. Stored ids that no longer resolve are skipped and reported.
pub fn resolve(catalog: &PermissionCatalog, role: &Role, version: u64) -> EffectivePermissions {
    let grant = Grant::for_role(role);

    if !role.is_active {
        return EffectivePermissions::new(grant, HashSet::new(), version);
    }

    let codes: HashSet<PermissionCode> = match grant {
        Grant::FullCatalog => catalog.active().map(|p| p.code.clone()).collect(),
        Grant::AllExceptSuperuser => catalog
            .active()
            .filter(|p| p.code != SUPER_ADMIN)
            .map(|p| p.code.clone())
            .collect(),
        Grant::Explicit => role
            .permission_ids
            .iter()
            .filter_map(|id| {
                let permission = catalog.get_by_id(*id);
                if permission.is_none() {
                    tracing::warn!(role = %role.code, permission_id = %id, "role references unknown permission id");
                }
                permission
            })
            .filter(|p| p.active)
            .map(|p| p.code.clone())
            .collect(),
    };

    EffectivePermissions::new(grant, codes, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use chrono::Utc;
    use workforce_core::{CompanyId, PermissionId, RoleId};

    use crate::codes;
    use crate::roles::{RoleCode, RoleScope};
    use crate::{NewPermission, PermissionPatch};

    fn role(code: &str, is_system: bool, ids: &[i64]) -> Role {
        let now = Utc::now();
        Role {
            id: RoleId::new(1),
            name: code.to_string(),
            code: RoleCode::new(code.to_string()).unwrap(),
            description: None,
            scope: RoleScope::Company,
            company_id: Some(CompanyId::new(1)),
            is_system,
            is_active: true,
            permission_ids: ids.iter().copied().map(PermissionId::new).collect::<BTreeSet<_>>(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn super_admin_sees_permissions_added_later() {
        let mut catalog = PermissionCatalog::seeded();
        let super_admin = role("SUPER_ADMIN", true, &[]);

        let before = resolve(&catalog, &super_admin, 0);
        assert_eq!(before.grant(), Grant::FullCatalog);
        assert_eq!(before.len(), catalog.len());

        catalog
            .register(NewPermission {
                code: "ticket.view".parse().unwrap(),
                name: "View Tickets".into(),
                module: None,
                description: None,
            })
            .unwrap();

        let after = resolve(&catalog, &super_admin, 1);
        assert!(after.contains("ticket.view"));
        assert_eq!(after.len(), catalog.len());
    }

    #[test]
    fn admin_is_catalog_minus_superuser() {
        let catalog = PermissionCatalog::seeded();
        let admin = resolve(&catalog, &role("ADMIN", true, &[]), 0);

        assert_eq!(admin.grant(), Grant::AllExceptSuperuser);
        assert!(!admin.contains(codes::SUPER_ADMIN.as_str()));
        assert_eq!(admin.len(), catalog.len() - 1);
    }

    #[test]
    fn custom_role_named_like_admin_is_not_computed() {
        let catalog = PermissionCatalog::seeded();
        let impostor = resolve(&catalog, &role("ADMIN", false, &[2]), 0);

        assert_eq!(impostor.grant(), Grant::Explicit);
        assert_eq!(impostor.to_sorted_vec(), vec![codes::DASHBOARD_VIEW]);
    }

    #[test]
    fn inactive_permissions_are_filtered_but_association_survives() {
        let mut catalog = PermissionCatalog::seeded();
        let edit = catalog.id_of("task.edit").unwrap();
        let view = catalog.id_of("task.view").unwrap();
        let lead = role("SITE_LEAD", false, &[edit.get(), view.get()]);

        catalog
            .update(
                edit,
                PermissionPatch {
                    active: Some(false),
                    ..PermissionPatch::default()
                },
            )
            .unwrap();

        let effective = resolve(&catalog, &lead, 0);
        assert!(!effective.contains("task.edit"));
        assert!(effective.contains("task.view"));
        assert!(lead.permission_ids.contains(&edit));

        let super_admin = resolve(&catalog, &role("SUPER_ADMIN", true, &[]), 0);
        assert!(!super_admin.contains("task.edit"));
    }

    #[test]
    fn dangling_ids_are_skipped() {
        let catalog = PermissionCatalog::seeded();
        let effective = resolve(&catalog, &role("SITE_LEAD", false, &[2, 9_999]), 0);
        assert_eq!(effective.len(), 1);
    }

    #[test]
    fn inactive_role_grants_nothing() {
        let catalog = PermissionCatalog::seeded();
        let mut lead = role("SITE_LEAD", false, &[2, 3]);
        lead.is_active = false;
        assert!(resolve(&catalog, &lead, 0).is_empty());
    }
}
