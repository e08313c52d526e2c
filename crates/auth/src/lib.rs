//! `workforce-auth` - permission evaluation core.
//!
//! Catalog, role registry, effective-permission resolution, the decision
//! procedure and ownership guards. Decoupled from HTTP and storage.

pub mod authorize;
pub mod catalog;
pub mod claims;
pub mod codes;
pub mod error;
pub mod ownership;
pub mod permissions;
pub mod principal;
pub mod registry;
pub mod resolver;
pub mod roles;

pub use authorize::{
    authorize, evaluate, require_all, require_any, require_single, AuthzError, Decision,
    OperationAuthorization, Requirement,
};
pub use catalog::PermissionCatalog;
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use error::{ErrorClass, RbacError};
pub use ownership::{OwnershipPredicate, OwnershipRule, OwnershipRules, ResourceFacts};
pub use permissions::{NewPermission, Permission, PermissionCode, PermissionPatch};
pub use principal::Principal;
pub use registry::RbacRegistry;
pub use resolver::{resolve, EffectivePermissions, Grant};
pub use roles::{NewRole, Role, RoleCode, RoleScope, RoleUpdate, SystemRole};
