//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Roles and catalog permissions are entities: two roles with identical
/// permission sets are still different roles.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
