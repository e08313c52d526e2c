//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. A permission
/// code such as `leave.approve` is one: it has no identity beyond its text,
/// and "changing" it means producing a different code.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct PermissionCode(String);
///
/// impl ValueObject for PermissionCode {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
