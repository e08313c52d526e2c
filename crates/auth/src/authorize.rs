use serde::Serialize;
use thiserror::Error;

use crate::codes::SUPER_ADMIN;
use crate::resolver::EffectivePermissions;
use crate::PermissionCode;

/// Declarative permission requirement attached to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "codes", rename_all = "snake_case")]
pub enum Requirement {
    Single(PermissionCode),
    Any(Vec<PermissionCode>),
    All(Vec<PermissionCode>),
    /// Equivalent to `Single(admin.super_admin)`.
    Superuser,
}

impl Requirement {
    pub fn single(code: PermissionCode) -> Self {
        Requirement::Single(code)
    }

    pub fn any(codes: impl IntoIterator<Item = PermissionCode>) -> Self {
        Requirement::Any(codes.into_iter().collect())
    }

    pub fn all(codes: impl IntoIterator<Item = PermissionCode>) -> Self {
        Requirement::All(codes.into_iter().collect())
    }

    pub fn superuser() -> Self {
        Requirement::Superuser
    }
}

/// Outcome of a decision. A deny is a regular value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    /// `missing` is for logs and audit only; never return it to a caller.
    Deny { missing: Vec<PermissionCode> },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// OR-composition of two decisions.
    ///
    /// When both deny, the missing codes of `self` are kept.
    pub fn or(self, other: Decision) -> Decision {
        match (self, other) {
            (Decision::Allow, _) | (_, Decision::Allow) => Decision::Allow,
            (deny, _) => deny,
        }
    }
}

/// Allow iff every required code is held. An empty requirement allows.
pub fn require_all(effective: &EffectivePermissions, required: &[PermissionCode]) -> Decision {
    let missing: Vec<PermissionCode> = required
        .iter()
        .filter(|code| !effective.contains(code.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        Decision::Allow
    } else {
        Decision::Deny { missing }
    }
}

/// Allow iff at least one required code is held. An empty requirement denies.
pub fn require_any(effective: &EffectivePermissions, required: &[PermissionCode]) -> Decision {
    if required.iter().any(|code| effective.contains(code.as_str())) {
        Decision::Allow
    } else {
        Decision::Deny {
            missing: required.to_vec(),
        }
    }
}

pub fn require_single(effective: &EffectivePermissions, code: &PermissionCode) -> Decision {
    require_all(effective, core::slice::from_ref(code))
}

/// Evaluate a requirement. One code path for every role: the super-admin
/// expansion already happened in the resolver.
pub fn evaluate(effective: &EffectivePermissions, requirement: &Requirement) -> Decision {
    match requirement {
        Requirement::Single(code) => require_single(effective, code),
        Requirement::Any(codes) => require_any(effective, codes),
        Requirement::All(codes) => require_all(effective, codes),
        Requirement::Superuser => require_single(effective, &SUPER_ADMIN),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    /// Carries no detail on purpose; see [`Decision::Deny`] for the log-side view.
    #[error("access denied")]
    Forbidden,
}

/// Evaluate and convert a deny into [`AuthzError::Forbidden`].
///
/// Missing codes are logged at debug level and dropped.
pub fn authorize(effective: &EffectivePermissions, requirement: &Requirement) -> Result<(), AuthzError> {
    match evaluate(effective, requirement) {
        Decision::Allow => Ok(()),
        Decision::Deny { missing } => {
            tracing::debug!(?requirement, missing = ?missing, "authorization denied");
            Err(AuthzError::Forbidden)
        }
    }
}

/// Operation-side authorization contract.
///
/// Implement this on operations that require permissions. The API layer
/// enforces the requirement before dispatching.
pub trait OperationAuthorization {
    fn requirement(&self) -> Requirement;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;

    fn manager() -> EffectivePermissions {
        EffectivePermissions::from_codes([PROJECT_VIEW_ALL, TASK_CREATE])
    }

    #[test]
    fn any_allows_when_one_code_is_held() {
        let decision = require_any(&manager(), &[PROJECT_VIEW, PROJECT_VIEW_ALL]);
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn all_denies_and_reports_missing_codes() {
        let decision = require_all(&manager(), &[EMPLOYEE_CREATE]);
        assert_eq!(
            decision,
            Decision::Deny {
                missing: vec![EMPLOYEE_CREATE]
            }
        );

        let decision = require_all(&manager(), &[TASK_CREATE, EMPLOYEE_CREATE, PROJECT_VIEW_ALL]);
        assert_eq!(
            decision,
            Decision::Deny {
                missing: vec![EMPLOYEE_CREATE]
            }
        );
    }

    #[test]
    fn empty_requirements() {
        assert!(require_all(&manager(), &[]).is_allowed());
        assert!(!require_any(&manager(), &[]).is_allowed());
    }

    #[test]
    fn superuser_requires_the_super_admin_code() {
        assert!(!evaluate(&manager(), &Requirement::superuser()).is_allowed());

        let root = EffectivePermissions::from_codes([SUPER_ADMIN]);
        assert!(evaluate(&root, &Requirement::superuser()).is_allowed());
    }

    #[test]
    fn forbidden_carries_no_detail() {
        let err = authorize(&manager(), &Requirement::single(EMPLOYEE_CREATE)).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden);
        assert_eq!(err.to_string(), "access denied");
    }

    #[test]
    fn or_composition_prefers_allow() {
        let deny = Decision::Deny {
            missing: vec![TASK_EDIT],
        };
        assert!(deny.clone().or(Decision::Allow).is_allowed());
        assert!(Decision::Allow.or(deny.clone()).is_allowed());
        assert_eq!(deny.clone().or(deny.clone()), deny);
    }

    struct ApproveLeave;

    impl OperationAuthorization for ApproveLeave {
        fn requirement(&self) -> Requirement {
            Requirement::single(LEAVE_APPROVE)
        }
    }

    #[test]
    fn operations_declare_their_requirement() {
        let hr = EffectivePermissions::from_codes([LEAVE_APPROVE]);
        assert!(authorize(&hr, &ApproveLeave.requirement()).is_ok());
        assert!(authorize(&manager(), &ApproveLeave.requirement()).is_err());
    }

    mod proptest_tests {
        use super::*;
        use crate::codes;
        use proptest::prelude::*;

        fn all_codes() -> Vec<PermissionCode> {
            crate::PermissionCatalog::seeded()
                .iter()
                .map(|p| p.code.clone())
                .collect()
        }

        fn code_index() -> impl Strategy<Value = usize> {
            0..codes::SEED.len()
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: a singleton requireAll is exactly set membership.
            #[test]
            fn singleton_all_is_membership(
                held in proptest::collection::btree_set(code_index(), 0..40),
                asked in code_index(),
            ) {
                let catalog = all_codes();
                let effective = EffectivePermissions::from_codes(held.iter().map(|i| catalog[*i].clone()));
                let code = &catalog[asked];

                prop_assert_eq!(
                    require_all(&effective, core::slice::from_ref(code)).is_allowed(),
                    effective.contains(code.as_str())
                );
                prop_assert_eq!(
                    require_single(&effective, code),
                    require_all(&effective, core::slice::from_ref(code))
                );
            }

            /// Property: requireAll implies requireAny for non-empty requirements.
            #[test]
            fn all_implies_any(
                held in proptest::collection::btree_set(code_index(), 0..40),
                required in proptest::collection::vec(code_index(), 1..6),
            ) {
                let catalog = all_codes();
                let effective = EffectivePermissions::from_codes(held.iter().map(|i| catalog[*i].clone()));
                let required: Vec<PermissionCode> = required.iter().map(|i| catalog[*i].clone()).collect();

                if require_all(&effective, &required).is_allowed() {
                    prop_assert!(require_any(&effective, &required).is_allowed());
                }
                prop_assert_eq!(
                    require_any(&effective, &required).is_allowed(),
                    required.iter().any(|c| held.iter().any(|i| &catalog[*i] == c))
                );
            }
        }
    }
}
