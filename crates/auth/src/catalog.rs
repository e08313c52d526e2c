//! Versioned permission catalog.
//!
//! The catalog is an explicit value owned by [`crate::RbacRegistry`]; tests can
//! build isolated catalogs with [`PermissionCatalog::new`] or
//! [`PermissionCatalog::seeded`].

use std::collections::{BTreeMap, HashMap};

use workforce_core::PermissionId;

use crate::codes;
use crate::error::RbacError;
use crate::{NewPermission, Permission, PermissionCode, PermissionPatch};

#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    entries: BTreeMap<PermissionId, Permission>,
    by_code: HashMap<PermissionCode, PermissionId>,
    next_id: i64,
    version: u64,
}

impl PermissionCatalog {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Catalog holding every compiled-in code from [`crate::codes`].
    pub fn seeded() -> Self {
        let mut catalog = Self::new();
        for (code, name, module) in codes::SEED {
            catalog.insert(
                PermissionCode::from_static(code),
                (*name).to_string(),
                (*module).to_string(),
                Some(format!("Permission to {name}")),
            );
        }
        catalog
    }

    /// Bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Permission> {
        self.by_code.get(code).and_then(|id| self.entries.get(id))
    }

    pub fn get_by_id(&self, id: PermissionId) -> Option<&Permission> {
        self.entries.get(&id)
    }

    pub fn id_of(&self, code: &str) -> Option<PermissionId> {
        self.by_code.get(code).copied()
    }

    /// All entries (active or not) in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.entries.values()
    }

    pub fn active(&self) -> impl Iterator<Item = &Permission> {
        self.entries.values().filter(|p| p.active)
    }

    /// Entries optionally filtered by display module, in id order.
    pub fn list(&self, module: Option<&str>) -> Vec<Permission> {
        self.entries
            .values()
            .filter(|p| module.is_none_or(|m| p.module == m))
            .cloned()
            .collect()
    }

    /// Active entries grouped by display module; each group is in id order.
    pub fn list_by_module(&self) -> BTreeMap<String, Vec<Permission>> {
        let mut grouped: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
        for permission in self.active() {
            grouped
                .entry(permission.module.clone())
                .or_default()
                .push(permission.clone());
        }
        grouped
    }

    pub fn register(&mut self, new: NewPermission) -> Result<Permission, RbacError> {
        if self.by_code.contains_key(new.code.as_str()) {
            return Err(RbacError::DuplicatePermissionCode(new.code.to_string()));
        }

        let module = new
            .module
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| new.code.module().to_string());

        Ok(self.insert(new.code, new.name, module, new.description))
    }

    pub fn update(
        &mut self,
        id: PermissionId,
        patch: PermissionPatch,
    ) -> Result<Permission, RbacError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(RbacError::PermissionIdNotFound(id))?;

        // Without it no principal could pass a superuser check again.
        if entry.code == codes::SUPER_ADMIN && patch.active == Some(false) {
            return Err(RbacError::PermissionPinned(entry.code.to_string()));
        }

        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(description) = patch.description {
            entry.description = Some(description);
        }
        if let Some(active) = patch.active {
            entry.active = active;
        }

        let updated = entry.clone();
        self.version += 1;
        Ok(updated)
    }

    fn insert(
        &mut self,
        code: PermissionCode,
        name: String,
        module: String,
        description: Option<String>,
    ) -> Permission {
        let id = PermissionId::new(self.next_id);
        self.next_id += 1;

        let permission = Permission {
            id,
            code: code.clone(),
            name,
            module,
            description,
            active: true,
        };
        self.by_code.insert(code, id);
        self.entries.insert(id, permission.clone());
        self.version += 1;
        permission
    }
}
