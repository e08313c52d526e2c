//! Role registry: roles, user assignments and the catalog behind one lock.
//!
//! The registry is an explicit value; construct one per process (or per test)
//! and share it behind an `Arc`. Reads take the state lock shared; every
//! mutation takes it exclusively, bumps the version and clears the resolver
//! memo before releasing it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use workforce_core::{CompanyId, DomainError, PermissionId, RoleId, UserId};

use crate::authorize::{evaluate, Decision, Requirement};
use crate::catalog::PermissionCatalog;
use crate::codes::SUPER_ADMIN;
use crate::error::{join_display, RbacError};
use crate::resolver::{resolve, EffectivePermissions, Grant};
use crate::roles::{check_scope, NewRole, Role, RoleCode, RoleScope, RoleUpdate, SystemRole};
use crate::{NewPermission, Permission, PermissionCode, PermissionPatch, Principal};

#[derive(Debug, Default)]
struct RegistryState {
    catalog: PermissionCatalog,
    roles: BTreeMap<RoleId, Role>,
    assignments: HashMap<UserId, RoleId>,
    next_role_id: i64,
    version: u64,
}

impl RegistryState {
    fn role(&self, id: RoleId) -> Result<&Role, RbacError> {
        self.roles.get(&id).ok_or(RbacError::RoleNotFound(id))
    }

    fn code_taken(&self, code: &str, except: Option<RoleId>) -> bool {
        self.roles
            .values()
            .any(|r| r.code.as_str() == code && Some(r.id) != except)
    }

    fn assigned_user_count(&self, id: RoleId) -> usize {
        self.assignments.values().filter(|r| **r == id).count()
    }

    fn next_role_id(&mut self) -> RoleId {
        let id = RoleId::new(self.next_role_id);
        self.next_role_id += 1;
        id
    }

    fn unknown_ids(&self, ids: &[PermissionId]) -> Vec<PermissionId> {
        ids.iter()
            .filter(|id| self.catalog.get_by_id(**id).is_none())
            .copied()
            .collect()
    }

    /// The super-admin code comes only from the computed SUPER_ADMIN grant.
    fn reject_reserved(&self, ids: &[PermissionId]) -> Result<(), RbacError> {
        match self.catalog.id_of(SUPER_ADMIN.as_str()) {
            Some(reserved) if ids.contains(&reserved) => {
                Err(RbacError::ReservedPermission(SUPER_ADMIN.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Validate the whole change, then apply `(old \ remove) ∪ add`.
    fn change_permissions(
        &mut self,
        id: RoleId,
        add: &[PermissionId],
        remove: &[PermissionId],
    ) -> Result<Role, RbacError> {
        let role = self.role(id)?;
        if Grant::for_role(role).is_computed() {
            return Err(RbacError::ComputedRoleGrant(role.code.to_string()));
        }

        let mut unknown = self.unknown_ids(add);
        unknown.extend(self.unknown_ids(remove));
        if !unknown.is_empty() {
            unknown.sort();
            unknown.dedup();
            return Err(RbacError::UnknownPermissionId(join_display(&unknown)));
        }
        self.reject_reserved(add)?;

        let role = self.roles.get_mut(&id).ok_or(RbacError::RoleNotFound(id))?;
        for permission in remove {
            role.permission_ids.remove(permission);
        }
        role.permission_ids.extend(add.iter().copied());
        role.updated_at = Utc::now();
        Ok(role.clone())
    }
}

#[derive(Debug)]
pub struct RbacRegistry {
    state: RwLock<RegistryState>,
    /// `role_id -> effective set`, tagged with the registry version.
    cache: RwLock<HashMap<RoleId, EffectivePermissions>>,
}

fn poisoned() -> RbacError {
    RbacError::integrity("registry lock poisoned")
}

impl RbacRegistry {
    /// Registry over `catalog` with no roles.
    pub fn new(catalog: PermissionCatalog) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                catalog,
                next_role_id: 1,
                ..RegistryState::default()
            }),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Seeded catalog plus the six system roles.
    ///
    /// Company-scoped system roles belong to `default_company`. Role ids follow
    /// [`SystemRole::ALL`], starting at 1.
    pub fn seeded(default_company: CompanyId) -> Self {
        let registry = Self::new(PermissionCatalog::seeded());
        if let Ok(mut state) = registry.state.write() {
            let now = Utc::now();
            for system in SystemRole::ALL {
                let id = state.next_role_id();
                let permission_ids: BTreeSet<PermissionId> = system
                    .seed_grants()
                    .iter()
                    .filter_map(|code| state.catalog.id_of(code.as_str()))
                    .collect();
                let company_id = match system.scope() {
                    RoleScope::Global => None,
                    RoleScope::Company => Some(default_company),
                };
                state.roles.insert(
                    id,
                    Role {
                        id,
                        name: system.display_name().to_string(),
                        code: system.code(),
                        description: None,
                        scope: system.scope(),
                        company_id,
                        is_system: true,
                        is_active: true,
                        permission_ids,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        registry
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryState>, RbacError> {
        self.state.read().map_err(|_| poisoned())
    }

    /// Run a mutation under the exclusive lock.
    ///
    /// On success the version is bumped and the memo cleared before the lock
    /// is released. A failed mutation must leave the state untouched.
    fn write<T>(
        &self,
        mutate: impl FnOnce(&mut RegistryState) -> Result<T, RbacError>,
    ) -> Result<T, RbacError> {
        let mut state: RwLockWriteGuard<'_, RegistryState> =
            self.state.write().map_err(|_| poisoned())?;
        let out = mutate(&mut state)?;
        state.version += 1;
        self.cache.write().map_err(|_| poisoned())?.clear();
        Ok(out)
    }

    pub fn version(&self) -> Result<u64, RbacError> {
        Ok(self.read()?.version)
    }

    // ─── Catalog ───

    pub fn get_permission(&self, code: &str) -> Result<Permission, RbacError> {
        self.read()?
            .catalog
            .get(code)
            .cloned()
            .ok_or_else(|| RbacError::PermissionNotFound(code.to_string()))
    }

    pub fn get_permission_by_id(&self, id: PermissionId) -> Result<Permission, RbacError> {
        self.read()?
            .catalog
            .get_by_id(id)
            .cloned()
            .ok_or(RbacError::PermissionIdNotFound(id))
    }

    pub fn list_permissions(&self, module: Option<&str>) -> Result<Vec<Permission>, RbacError> {
        Ok(self.read()?.catalog.list(module))
    }

    pub fn list_permissions_by_module(&self) -> Result<BTreeMap<String, Vec<Permission>>, RbacError> {
        Ok(self.read()?.catalog.list_by_module())
    }

    pub fn register_permission(&self, new: NewPermission) -> Result<Permission, RbacError> {
        let created = self.write(|state| state.catalog.register(new))?;
        tracing::info!(permission_id = %created.id, code = %created.code, "permission registered");
        Ok(created)
    }

    pub fn update_permission(
        &self,
        id: PermissionId,
        patch: PermissionPatch,
    ) -> Result<Permission, RbacError> {
        let updated = self.write(|state| state.catalog.update(id, patch))?;
        tracing::info!(
            permission_id = %updated.id,
            code = %updated.code,
            active = updated.active,
            "permission updated"
        );
        Ok(updated)
    }

    // ─── Roles ───

    pub fn list_roles(&self) -> Result<Vec<Role>, RbacError> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    pub fn get_role(&self, id: RoleId) -> Result<Role, RbacError> {
        self.read()?.role(id).cloned()
    }

    pub fn get_role_by_code(&self, code: &str) -> Result<Option<Role>, RbacError> {
        Ok(self
            .read()?
            .roles
            .values()
            .find(|r| r.code.as_str() == code)
            .cloned())
    }

    /// Create a custom (non-system, company-scoped) role.
    pub fn create_role(&self, new: NewRole) -> Result<Role, RbacError> {
        let code = RoleCode::new(new.code)?;
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("role name must not be empty").into());
        }
        if new.scope != RoleScope::Company {
            return Err(RbacError::InvalidScope(
                "custom roles must be company scoped".into(),
            ));
        }
        check_scope(new.scope, new.company_id)?;

        let created = self.write(|state| {
            if state.code_taken(code.as_str(), None) {
                return Err(RbacError::DuplicateRoleCode(code.to_string()));
            }
            let unknown = state.unknown_ids(&new.permission_ids);
            if !unknown.is_empty() {
                return Err(RbacError::UnknownPermissionId(join_display(&unknown)));
            }
            state.reject_reserved(&new.permission_ids)?;

            let id = state.next_role_id();
            let now = Utc::now();
            let role = Role {
                id,
                name,
                code,
                description: new.description,
                scope: new.scope,
                company_id: new.company_id,
                is_system: false,
                is_active: true,
                permission_ids: new.permission_ids.into_iter().collect(),
                created_at: now,
                updated_at: now,
            };
            state.roles.insert(id, role.clone());
            Ok(role)
        })?;

        tracing::info!(role_id = %created.id, code = %created.code, "role created");
        Ok(created)
    }

    /// Update role attributes.
    ///
    /// System roles keep their code, scope and active flag; only the name and
    /// description may change.
    pub fn update_role(&self, id: RoleId, update: RoleUpdate) -> Result<Role, RbacError> {
        let new_code = update.code.map(RoleCode::new).transpose()?;
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("role name must not be empty").into());
            }
        }

        let updated = self.write(|state| {
            let role = state.role(id)?;

            if role.is_system {
                let code_changed = new_code.as_ref().is_some_and(|c| *c != role.code);
                let scope_changed = update.scope.is_some_and(|s| s != role.scope);
                let deactivated = update.is_active == Some(false);
                if code_changed || scope_changed || deactivated {
                    return Err(RbacError::SystemRoleImmutable(role.code.to_string()));
                }
            } else {
                if let Some(code) = &new_code {
                    if state.code_taken(code.as_str(), Some(id)) {
                        return Err(RbacError::DuplicateRoleCode(code.to_string()));
                    }
                }
                if update.scope.is_some_and(|s| s != RoleScope::Company) {
                    return Err(RbacError::InvalidScope(
                        "custom roles must be company scoped".into(),
                    ));
                }
            }

            let role = state.roles.get_mut(&id).ok_or(RbacError::RoleNotFound(id))?;
            if let Some(name) = update.name {
                role.name = name.trim().to_string();
            }
            if let Some(description) = update.description {
                role.description = Some(description);
            }
            if let Some(active) = update.is_active {
                role.is_active = active;
            }
            if let Some(code) = new_code {
                role.code = code;
            }
            role.updated_at = Utc::now();
            Ok(role.clone())
        })?;

        tracing::info!(role_id = %updated.id, code = %updated.code, "role updated");
        Ok(updated)
    }

    /// Add and remove permissions by code as one atomic change.
    pub fn update_role_permissions(
        &self,
        id: RoleId,
        add: &[PermissionCode],
        remove: &[PermissionCode],
    ) -> Result<Role, RbacError> {
        let updated = self.write(|state| {
            let role = state.role(id)?;
            if Grant::for_role(role).is_computed() {
                return Err(RbacError::ComputedRoleGrant(role.code.to_string()));
            }

            let mut unknown: Vec<PermissionCode> = Vec::new();
            let mut lookup = |codes: &[PermissionCode]| -> Vec<PermissionId> {
                codes
                    .iter()
                    .filter_map(|code| {
                        let id = state.catalog.id_of(code.as_str());
                        if id.is_none() {
                            unknown.push(code.clone());
                        }
                        id
                    })
                    .collect()
            };
            let add_ids = lookup(add);
            let remove_ids = lookup(remove);
            if !unknown.is_empty() {
                return Err(RbacError::UnknownPermissionCode(join_display(&unknown)));
            }

            state.change_permissions(id, &add_ids, &remove_ids)
        })?;

        tracing::info!(
            role_id = %updated.id,
            added = add.len(),
            removed = remove.len(),
            "role permissions updated"
        );
        Ok(updated)
    }

    /// Add and remove permissions by id as one atomic change.
    pub fn update_role_permission_ids(
        &self,
        id: RoleId,
        add: &[PermissionId],
        remove: &[PermissionId],
    ) -> Result<Role, RbacError> {
        let updated = self.write(|state| state.change_permissions(id, add, remove))?;
        tracing::info!(
            role_id = %updated.id,
            added = add.len(),
            removed = remove.len(),
            "role permissions updated"
        );
        Ok(updated)
    }

    pub fn delete_role(&self, id: RoleId) -> Result<(), RbacError> {
        let deleted = self.write(|state| {
            let role = state.role(id)?;
            if role.is_system {
                return Err(RbacError::SystemRoleProtected(role.code.to_string()));
            }
            let users = state.assigned_user_count(id);
            if users > 0 {
                return Err(RbacError::RoleInUse {
                    code: role.code.to_string(),
                    users,
                });
            }
            state.roles.remove(&id).ok_or(RbacError::RoleNotFound(id))
        })?;

        tracing::info!(role_id = %deleted.id, code = %deleted.code, "role deleted");
        Ok(())
    }

    /// Catalog entries behind a role, in id order.
    ///
    /// Explicit roles list their stored associations, inactive entries
    /// included. Computed roles list their current effective grant.
    pub fn role_permissions(&self, id: RoleId) -> Result<Vec<Permission>, RbacError> {
        let state = self.read()?;
        let role = state.role(id)?;

        let permissions = match Grant::for_role(role) {
            Grant::Explicit => role
                .permission_ids
                .iter()
                .filter_map(|pid| state.catalog.get_by_id(*pid))
                .cloned()
                .collect(),
            _ => {
                let effective = resolve(&state.catalog, role, state.version);
                state
                    .catalog
                    .iter()
                    .filter(|p| effective.contains(p.code.as_str()))
                    .cloned()
                    .collect()
            }
        };
        Ok(permissions)
    }

    // ─── Assignments ───

    /// Give `user` exactly one role, replacing any previous assignment.
    pub fn assign_role(&self, user: UserId, role_id: RoleId) -> Result<Option<RoleId>, RbacError> {
        let previous = self.write(|state| {
            let role = state.role(role_id)?;
            if !role.is_active {
                return Err(RbacError::RoleInactive(role.code.to_string()));
            }
            Ok(state.assignments.insert(user, role_id))
        })?;

        tracing::info!(user_id = %user, role_id = %role_id, previous = ?previous, "role assigned");
        Ok(previous)
    }

    pub fn unassign_role(&self, user: UserId) -> Result<Option<RoleId>, RbacError> {
        let previous = self.write(|state| Ok(state.assignments.remove(&user)))?;
        if let Some(role_id) = previous {
            tracing::info!(user_id = %user, role_id = %role_id, "role unassigned");
        }
        Ok(previous)
    }

    pub fn role_of(&self, user: UserId) -> Result<Option<RoleId>, RbacError> {
        Ok(self.read()?.assignments.get(&user).copied())
    }

    pub fn assigned_user_count(&self, role_id: RoleId) -> Result<usize, RbacError> {
        Ok(self.read()?.assigned_user_count(role_id))
    }

    // ─── Resolution ───

    /// Principal for an authenticated user, or `None` when the user holds no
    /// role. A dangling assignment is an integrity failure.
    pub fn resolve_principal(&self, user: UserId) -> Result<Option<Principal>, RbacError> {
        let state = self.read()?;
        let Some(role_id) = state.assignments.get(&user).copied() else {
            return Ok(None);
        };
        let role = state.roles.get(&role_id).ok_or_else(|| {
            tracing::error!(user_id = %user, role_id = %role_id, "assignment references missing role");
            RbacError::integrity(format!("user {user} is assigned to missing role {role_id}"))
        })?;

        Ok(Some(Principal {
            user_id: user,
            role_id,
            role_code: role.code.clone(),
            company_id: role.company_id,
        }))
    }

    /// Effective set of a role, memoized per registry version.
    pub fn effective_for_role(&self, role_id: RoleId) -> Result<EffectivePermissions, RbacError> {
        let state = self.read()?;

        if let Some(hit) = self.cache.read().map_err(|_| poisoned())?.get(&role_id) {
            if hit.version() == state.version {
                return Ok(hit.clone());
            }
        }

        let role = state.role(role_id)?;
        let effective = resolve(&state.catalog, role, state.version);
        self.cache
            .write()
            .map_err(|_| poisoned())?
            .insert(role_id, effective.clone());
        Ok(effective)
    }

    /// Effective set of an authenticated principal.
    ///
    /// The principal's role must exist; a missing role is an integrity
    /// failure, never a deny.
    pub fn effective_permissions(&self, principal: &Principal) -> Result<EffectivePermissions, RbacError> {
        self.effective_for_role(principal.role_id).map_err(|err| match err {
            RbacError::RoleNotFound(id) => {
                tracing::error!(user_id = %principal.user_id, role_id = %id, "principal role missing");
                RbacError::integrity(format!("role {id} of user {} not found", principal.user_id))
            }
            other => other,
        })
    }

    pub fn check(&self, principal: &Principal, requirement: &Requirement) -> Result<Decision, RbacError> {
        let effective = self.effective_permissions(principal)?;
        Ok(evaluate(&effective, requirement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;

    fn registry() -> RbacRegistry {
        RbacRegistry::seeded(CompanyId::new(1))
    }

    fn role_id(registry: &RbacRegistry, code: &str) -> RoleId {
        registry.get_role_by_code(code).unwrap().unwrap().id
    }

    fn principal(registry: &RbacRegistry, user: i64, role: &str) -> Principal {
        let user = UserId::new(user);
        registry.assign_role(user, role_id(registry, role)).unwrap();
        registry.resolve_principal(user).unwrap().unwrap()
    }

    fn custom(code: &str, ids: &[i64]) -> NewRole {
        NewRole {
            name: code.to_lowercase(),
            code: code.to_string(),
            description: None,
            scope: RoleScope::Company,
            company_id: Some(CompanyId::new(1)),
            permission_ids: ids.iter().copied().map(PermissionId::new).collect(),
        }
    }

    fn ticket_view() -> NewPermission {
        NewPermission {
            code: "ticket.view".parse().unwrap(),
            name: "View Tickets".into(),
            module: None,
            description: None,
        }
    }

    #[test]
    fn seeds_six_system_roles_in_order() {
        let registry = registry();
        let roles = registry.list_roles().unwrap();
        let codes: Vec<&str> = roles.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["SUPER_ADMIN", "ADMIN", "MANAGER", "HR", "EMPLOYEE", "CLIENT"]
        );
        assert!(roles.iter().all(|r| r.is_system));
        assert_eq!(roles[0].company_id, None);
        assert_eq!(roles[1].company_id, Some(CompanyId::new(1)));
    }

    #[test]
    fn super_admin_tracks_the_live_catalog() {
        let registry = registry();
        let root = principal(&registry, 1, "SUPER_ADMIN");

        let before = registry.effective_permissions(&root).unwrap();
        assert!(!before.contains("ticket.view"));

        registry.register_permission(ticket_view()).unwrap();

        let after = registry.effective_permissions(&root).unwrap();
        assert!(after.contains("ticket.view"));
        assert_eq!(after.len(), registry.list_permissions(None).unwrap().len());
    }

    #[test]
    fn admin_is_catalog_minus_superuser_after_catalog_growth() {
        let registry = registry();
        let admin = principal(&registry, 2, "ADMIN");
        registry.register_permission(ticket_view()).unwrap();

        let effective = registry.effective_permissions(&admin).unwrap();
        let catalog = registry.list_permissions(None).unwrap();
        assert_eq!(effective.len(), catalog.len() - 1);
        assert!(effective.contains("ticket.view"));
        assert!(!effective.contains(SUPER_ADMIN.as_str()));
    }

    #[test]
    fn deactivation_revokes_everywhere_but_keeps_associations() {
        let registry = registry();
        let employee = principal(&registry, 3, "EMPLOYEE");
        let root = principal(&registry, 4, "SUPER_ADMIN");
        assert!(registry.effective_permissions(&employee).unwrap().contains("leave.apply"));

        let apply = registry.get_permission("leave.apply").unwrap().id;
        registry
            .update_permission(
                apply,
                PermissionPatch {
                    active: Some(false),
                    ..PermissionPatch::default()
                },
            )
            .unwrap();

        assert!(!registry.effective_permissions(&employee).unwrap().contains("leave.apply"));
        assert!(!registry.effective_permissions(&root).unwrap().contains("leave.apply"));
        assert!(
            registry
                .get_role(employee.role_id)
                .unwrap()
                .permission_ids
                .contains(&apply)
        );
    }

    #[test]
    fn system_roles_cannot_be_deleted() {
        let registry = registry();
        for system in SystemRole::ALL {
            let id = role_id(&registry, system.code_str());
            let err = registry.delete_role(id).unwrap_err();
            assert_eq!(err, RbacError::SystemRoleProtected(system.code_str().into()));
        }
    }

    #[test]
    fn roles_in_use_cannot_be_deleted_until_unassigned() {
        let registry = registry();
        let lead = registry.create_role(custom("SITE_LEAD", &[2])).unwrap();
        let user = UserId::new(10);
        registry.assign_role(user, lead.id).unwrap();

        let err = registry.delete_role(lead.id).unwrap_err();
        assert_eq!(
            err,
            RbacError::RoleInUse {
                code: "SITE_LEAD".into(),
                users: 1
            }
        );

        registry.unassign_role(user).unwrap();
        registry.delete_role(lead.id).unwrap();
        assert_eq!(
            registry.get_role(lead.id).unwrap_err(),
            RbacError::RoleNotFound(lead.id)
        );
    }

    #[test]
    fn bulk_permission_update_is_remove_then_add() {
        let registry = registry();
        let role = registry.create_role(custom("SITE_LEAD", &[3, 5])).unwrap();
        assert_eq!(role.id, RoleId::new(7));

        let updated = registry
            .update_role_permission_ids(
                role.id,
                &[PermissionId::new(20), PermissionId::new(21)],
                &[PermissionId::new(3)],
            )
            .unwrap();
        let ids: Vec<i64> = updated.permission_ids.iter().map(|p| p.get()).collect();
        assert_eq!(ids, vec![5, 20, 21]);
    }

    #[test]
    fn unknown_ids_reject_the_whole_change() {
        let registry = registry();
        let role = registry.create_role(custom("SITE_LEAD", &[3])).unwrap();
        let version = registry.version().unwrap();

        let err = registry
            .update_role_permission_ids(
                role.id,
                &[PermissionId::new(20), PermissionId::new(9_999)],
                &[PermissionId::new(3)],
            )
            .unwrap_err();
        assert_eq!(err, RbacError::UnknownPermissionId("9999".into()));

        let unchanged = registry.get_role(role.id).unwrap();
        assert_eq!(unchanged.permission_ids, role.permission_ids);
        assert_eq!(registry.version().unwrap(), version);
    }

    #[test]
    fn update_by_code_reports_unknown_codes() {
        let registry = registry();
        let manager = role_id(&registry, "MANAGER");
        let ghost: PermissionCode = "ghost.view".parse().unwrap();

        let err = registry
            .update_role_permissions(manager, &[EMPLOYEE_CREATE, ghost], &[])
            .unwrap_err();
        assert_eq!(err, RbacError::UnknownPermissionCode("ghost.view".into()));

        let updated = registry
            .update_role_permissions(manager, &[EMPLOYEE_CREATE], &[PROJECT_DELETE])
            .unwrap();
        let codes = registry.role_permissions(updated.id).unwrap();
        assert!(codes.iter().any(|p| p.code == EMPLOYEE_CREATE));
        assert!(!codes.iter().any(|p| p.code == PROJECT_DELETE));
    }

    #[test]
    fn super_admin_code_cannot_be_granted_explicitly() {
        let registry = registry();
        let reserved = registry.get_permission("admin.super_admin").unwrap().id;
        let expected = RbacError::ReservedPermission("admin.super_admin".into());

        let err = registry
            .create_role(custom("ROOTISH", &[2, reserved.get()]))
            .unwrap_err();
        assert_eq!(err, expected);
        assert_eq!(err.class(), crate::ErrorClass::Validation);
        assert_eq!(registry.get_role_by_code("ROOTISH").unwrap(), None);

        let lead = registry.create_role(custom("SITE_LEAD", &[2])).unwrap();
        let version = registry.version().unwrap();

        let err = registry
            .update_role_permission_ids(lead.id, &[PermissionId::new(3), reserved], &[])
            .unwrap_err();
        assert_eq!(err, expected);

        let err = registry
            .update_role_permissions(lead.id, &[TASK_VIEW, SUPER_ADMIN], &[])
            .unwrap_err();
        assert_eq!(err, expected);

        let employee = role_id(&registry, "EMPLOYEE");
        let err = registry
            .update_role_permissions(employee, &[SUPER_ADMIN], &[])
            .unwrap_err();
        assert_eq!(err, expected);

        assert_eq!(registry.get_role(lead.id).unwrap().permission_ids, lead.permission_ids);
        assert_eq!(registry.version().unwrap(), version);

        // Removing it is always allowed.
        registry
            .update_role_permission_ids(lead.id, &[], &[reserved])
            .unwrap();
    }

    #[test]
    fn super_admin_keeps_superuser_through_permission_updates() {
        let registry = registry();
        let root = principal(&registry, 1, "SUPER_ADMIN");
        let reserved = registry.get_permission("admin.super_admin").unwrap().id;

        let err = registry
            .update_permission(
                reserved,
                PermissionPatch {
                    active: Some(false),
                    ..PermissionPatch::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, RbacError::PermissionPinned("admin.super_admin".into()));

        assert!(registry.check(&root, &Requirement::superuser()).unwrap().is_allowed());
    }

    #[test]
    fn computed_grants_reject_explicit_edits() {
        let registry = registry();
        let admin = role_id(&registry, "ADMIN");
        let err = registry
            .update_role_permission_ids(admin, &[PermissionId::new(1)], &[])
            .unwrap_err();
        assert_eq!(err, RbacError::ComputedRoleGrant("ADMIN".into()));
    }

    #[test]
    fn system_role_structure_is_fixed() {
        let registry = registry();
        let hr = role_id(&registry, "HR");

        let err = registry
            .update_role(
                hr,
                RoleUpdate {
                    code: Some("PEOPLE".into()),
                    ..RoleUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, RbacError::SystemRoleImmutable("HR".into()));

        let err = registry
            .update_role(
                hr,
                RoleUpdate {
                    scope: Some(RoleScope::Global),
                    ..RoleUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, RbacError::SystemRoleImmutable("HR".into()));

        let renamed = registry
            .update_role(
                hr,
                RoleUpdate {
                    name: Some("People Ops".into()),
                    code: Some("HR".into()),
                    ..RoleUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "People Ops");
    }

    #[test]
    fn create_role_validates_code_and_scope() {
        let registry = registry();

        let err = registry.create_role(custom("MANAGER", &[])).unwrap_err();
        assert_eq!(err, RbacError::DuplicateRoleCode("MANAGER".into()));

        let mut no_company = custom("SITE_LEAD", &[]);
        no_company.company_id = None;
        assert!(matches!(
            registry.create_role(no_company).unwrap_err(),
            RbacError::InvalidScope(_)
        ));

        let mut global = custom("SITE_LEAD", &[]);
        global.scope = RoleScope::Global;
        global.company_id = None;
        assert!(matches!(
            registry.create_role(global).unwrap_err(),
            RbacError::InvalidScope(_)
        ));

        assert!(matches!(
            registry.create_role(custom("site_lead", &[])).unwrap_err(),
            RbacError::Invalid(_)
        ));
    }

    #[test]
    fn principal_inherits_company_from_role() {
        let registry = registry();
        assert_eq!(registry.resolve_principal(UserId::new(99)).unwrap(), None);

        let root = principal(&registry, 1, "SUPER_ADMIN");
        assert_eq!(root.company_id, None);

        let employee = principal(&registry, 2, "EMPLOYEE");
        assert_eq!(employee.company_id, Some(CompanyId::new(1)));
        assert_eq!(employee.role_code.as_str(), "EMPLOYEE");
    }

    #[test]
    fn inactive_roles_cannot_be_assigned() {
        let registry = registry();
        let lead = registry.create_role(custom("SITE_LEAD", &[])).unwrap();
        registry
            .update_role(
                lead.id,
                RoleUpdate {
                    is_active: Some(false),
                    ..RoleUpdate::default()
                },
            )
            .unwrap();

        let err = registry.assign_role(UserId::new(5), lead.id).unwrap_err();
        assert_eq!(err, RbacError::RoleInactive("SITE_LEAD".into()));
    }

    #[test]
    fn manager_scenario() {
        let registry = registry();
        let lead = registry
            .create_role(custom("PROJECT_LEAD", &[]))
            .unwrap();
        registry
            .update_role_permissions(lead.id, &[PROJECT_VIEW_ALL, TASK_CREATE], &[])
            .unwrap();
        registry.assign_role(UserId::new(7), lead.id).unwrap();
        let who = registry.resolve_principal(UserId::new(7)).unwrap().unwrap();

        let any = Requirement::any([PROJECT_VIEW, PROJECT_VIEW_ALL]);
        assert_eq!(registry.check(&who, &any).unwrap(), Decision::Allow);

        let all = Requirement::all([EMPLOYEE_CREATE]);
        assert!(!registry.check(&who, &all).unwrap().is_allowed());
    }

    #[test]
    fn memo_is_invalidated_by_the_mutating_call() {
        let registry = registry();
        let employee = principal(&registry, 3, "EMPLOYEE");

        let first = registry.effective_permissions(&employee).unwrap();
        let again = registry.effective_permissions(&employee).unwrap();
        assert_eq!(first.version(), again.version());

        registry
            .update_role_permissions(employee.role_id, &[], &[LEAVE_APPLY])
            .unwrap();

        let after = registry.effective_permissions(&employee).unwrap();
        assert!(after.version() > first.version());
        assert!(!after.contains("leave.apply"));
    }

    #[test]
    fn missing_principal_role_is_an_integrity_error() {
        let registry = registry();
        let ghost = Principal {
            user_id: UserId::new(1),
            role_id: RoleId::new(404),
            role_code: RoleCode::new("GHOST").unwrap(),
            company_id: None,
        };
        let err = registry.effective_permissions(&ghost).unwrap_err();
        assert_eq!(err.class(), crate::ErrorClass::Integrity);
    }

    #[test]
    fn concurrent_readers_never_see_a_partial_update() {
        let registry = registry();
        let lead = registry
            .create_role(custom("SITE_LEAD", &[]))
            .unwrap();
        registry
            .update_role_permissions(lead.id, &[TASK_VIEW], &[])
            .unwrap();

        let old: BTreeSet<&str> = ["task.view"].into();
        let new: BTreeSet<&str> = ["task.edit", "task.assign"].into();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let effective = registry.effective_for_role(lead.id).unwrap();
                        let seen: BTreeSet<&str> =
                            effective.codes().iter().map(|c| c.as_str()).collect();
                        assert!(seen == old || seen == new, "partial state: {seen:?}");
                    }
                });
            }
            scope.spawn(|| {
                registry
                    .update_role_permissions(lead.id, &[TASK_EDIT, TASK_ASSIGN], &[TASK_VIEW])
                    .unwrap();
            });
        });

        let effective = registry.effective_for_role(lead.id).unwrap();
        assert!(effective.contains("task.assign"));
        assert!(!effective.contains("task.view"));
    }
}
