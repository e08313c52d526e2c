//! Ownership guards.
//!
//! Some actions may be performed either by holders of a blanket permission or
//! by the principal who owns (or is assigned to) the resource. The rule table
//! maps each guarded action to its blanket code and ownership predicate, and
//! [`OwnershipRules::evaluate`] composes the two with OR.

use std::collections::HashMap;

use serde::Serialize;

use workforce_core::UserId;

use crate::authorize::{require_single, Decision};
use crate::codes;
use crate::error::RbacError;
use crate::resolver::EffectivePermissions;
use crate::{PermissionCode, Principal};

/// Guarded action names used by the default rule table.
pub mod actions {
    pub const TASK_READ: &str = "task.read";
    pub const TASK_UPDATE_STATUS: &str = "task.update_status";
    pub const PROJECT_READ: &str = "project.read";
    pub const EMPLOYEE_READ_PROFILE: &str = "employee.read_profile";
    pub const LEAVE_READ: &str = "leave.read";
    pub const ATTENDANCE_READ: &str = "attendance.read";
    pub const PAYROLL_READ_PAYSLIP: &str = "payroll.read_payslip";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipPredicate {
    /// The principal is the resource owner.
    Owner,
    /// The principal is one of the resource assignees.
    Assignee,
}

/// Facts about the addressed resource, supplied by the handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFacts {
    pub owner_id: Option<UserId>,
    pub assignee_ids: Vec<UserId>,
}

impl ResourceFacts {
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner_id: Some(owner),
            assignee_ids: Vec::new(),
        }
    }

    pub fn assigned_to(assignees: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            owner_id: None,
            assignee_ids: assignees.into_iter().collect(),
        }
    }
}

impl OwnershipPredicate {
    pub fn holds(self, user: UserId, facts: &ResourceFacts) -> bool {
        match self {
            OwnershipPredicate::Owner => facts.owner_id == Some(user),
            OwnershipPredicate::Assignee => facts.assignee_ids.contains(&user),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnershipRule {
    pub blanket: PermissionCode,
    pub predicate: OwnershipPredicate,
}

#[derive(Debug, Clone, Default)]
pub struct OwnershipRules {
    rules: HashMap<String, OwnershipRule>,
}

impl OwnershipRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule table for the HRMS/PMS resources that have an "own" variant.
    pub fn with_defaults() -> Self {
        let mut rules = Self::new();
        rules.register(actions::TASK_UPDATE_STATUS, codes::TASK_EDIT, OwnershipPredicate::Assignee);
        rules.register(actions::TASK_READ, codes::TASK_VIEW_ALL, OwnershipPredicate::Assignee);
        rules.register(actions::PROJECT_READ, codes::PROJECT_VIEW_ALL, OwnershipPredicate::Assignee);
        rules.register(
            actions::EMPLOYEE_READ_PROFILE,
            codes::EMPLOYEE_VIEW_ALL,
            OwnershipPredicate::Owner,
        );
        rules.register(actions::LEAVE_READ, codes::LEAVE_VIEW_ALL, OwnershipPredicate::Owner);
        rules.register(
            actions::ATTENDANCE_READ,
            codes::ATTENDANCE_VIEW_ALL,
            OwnershipPredicate::Owner,
        );
        rules.register(
            actions::PAYROLL_READ_PAYSLIP,
            codes::PAYROLL_VIEW_ALL,
            OwnershipPredicate::Owner,
        );
        rules
    }

    /// Register (or replace) the rule for `action`.
    pub fn register(
        &mut self,
        action: impl Into<String>,
        blanket: PermissionCode,
        predicate: OwnershipPredicate,
    ) -> &mut Self {
        self.rules
            .insert(action.into(), OwnershipRule { blanket, predicate });
        self
    }

    pub fn rule(&self, action: &str) -> Option<&OwnershipRule> {
        self.rules.get(action)
    }

    /// `blanket permission held OR ownership predicate holds`.
    ///
    /// An action without a rule is a wiring bug, reported as an integrity
    /// error rather than a deny.
    pub fn evaluate(
        &self,
        action: &str,
        effective: &EffectivePermissions,
        principal: &Principal,
        facts: &ResourceFacts,
    ) -> Result<Decision, RbacError> {
        let rule = self
            .rule(action)
            .ok_or_else(|| RbacError::UnknownGuardedAction(action.to_string()))?;

        let ownership = if rule.predicate.holds(principal.user_id, facts) {
            Decision::Allow
        } else {
            Decision::Deny {
                missing: Vec::new(),
            }
        };

        let decision = require_single(effective, &rule.blanket).or(ownership);
        if !decision.is_allowed() {
            tracing::debug!(
                action = %action,
                user_id = %principal.user_id,
                predicate = ?rule.predicate,
                "ownership guard denied"
            );
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleCode;
    use workforce_core::RoleId;

    fn employee(user: i64) -> Principal {
        Principal {
            user_id: UserId::new(user),
            role_id: RoleId::new(5),
            role_code: RoleCode::new("EMPLOYEE").unwrap(),
            company_id: None,
        }
    }

    #[test]
    fn assignee_without_blanket_permission_passes() {
        let rules = OwnershipRules::with_defaults();
        let effective = EffectivePermissions::from_codes([codes::TASK_VIEW]);
        let facts = ResourceFacts::assigned_to([UserId::new(1), UserId::new(2)]);

        let decision = rules
            .evaluate(actions::TASK_UPDATE_STATUS, &effective, &employee(2), &facts)
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn neither_blanket_nor_assignee_fails() {
        let rules = OwnershipRules::with_defaults();
        let effective = EffectivePermissions::from_codes([codes::TASK_VIEW]);
        let facts = ResourceFacts::assigned_to([UserId::new(1)]);

        let decision = rules
            .evaluate(actions::TASK_UPDATE_STATUS, &effective, &employee(2), &facts)
            .unwrap();
        assert_eq!(
            decision,
            Decision::Deny {
                missing: vec![codes::TASK_EDIT]
            }
        );
    }

    #[test]
    fn blanket_permission_passes_without_ownership() {
        let rules = OwnershipRules::with_defaults();
        let effective = EffectivePermissions::from_codes([codes::TASK_EDIT]);

        let decision = rules
            .evaluate(
                actions::TASK_UPDATE_STATUS,
                &effective,
                &employee(2),
                &ResourceFacts::default(),
            )
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn owner_predicate_checks_owner_only() {
        let rules = OwnershipRules::with_defaults();
        let effective = EffectivePermissions::from_codes([]);

        let own = rules
            .evaluate(
                actions::LEAVE_READ,
                &effective,
                &employee(4),
                &ResourceFacts::owned_by(UserId::new(4)),
            )
            .unwrap();
        assert!(own.is_allowed());

        let assigned_only = rules
            .evaluate(
                actions::LEAVE_READ,
                &effective,
                &employee(4),
                &ResourceFacts::assigned_to([UserId::new(4)]),
            )
            .unwrap();
        assert!(!assigned_only.is_allowed());
    }

    #[test]
    fn unknown_action_is_an_integrity_error() {
        let rules = OwnershipRules::with_defaults();
        let err = rules
            .evaluate(
                "invoice.pay",
                &EffectivePermissions::from_codes([]),
                &employee(1),
                &ResourceFacts::default(),
            )
            .unwrap_err();
        assert_eq!(err, RbacError::UnknownGuardedAction("invoice.pay".into()));
        assert_eq!(err.class(), crate::ErrorClass::Integrity);
    }
}
