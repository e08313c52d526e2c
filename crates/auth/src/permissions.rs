use std::borrow::{Borrow, Cow};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use workforce_core::{DomainError, Entity, PermissionId, ValueObject};

/// Permission code: the stable `module.action` wire identifier.
///
/// Codes are persisted in role-permission associations, so the textual form is
/// a contract. Both segments are ASCII lowercase (`[a-z][a-z0-9_]*`) and
/// separated by exactly one dot, e.g. `leave.approve`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionCode(Cow<'static, str>);

impl PermissionCode {
    /// Parse and validate a code.
    pub fn new(code: impl Into<Cow<'static, str>>) -> Result<Self, DomainError> {
        let code = code.into();
        validate(&code)?;
        Ok(Self(code))
    }

    /// Build a code from a literal known to be well-formed.
    ///
    /// Used for the compiled-in constants in [`crate::codes`]; their format is
    /// covered by the catalog tests.
    pub const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn module(&self) -> &str {
        self.0.split_once('.').map_or(&self.0, |(module, _)| module)
    }

    pub fn action(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, action)| action)
    }
}

fn validate(code: &str) -> Result<(), DomainError> {
    let (module, action) = code.split_once('.').ok_or_else(|| {
        DomainError::validation(format!(
            "permission code '{code}' must have the form module.action"
        ))
    })?;

    if !is_segment(module) || !is_segment(action) {
        return Err(DomainError::validation(format!(
            "permission code '{code}' must be lowercase ascii segments ([a-z][a-z0-9_]*)"
        )));
    }
    Ok(())
}

fn is_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl ValueObject for PermissionCode {}

impl FromStr for PermissionCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for PermissionCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.0.into_owned()
    }
}

impl Borrow<str> for PermissionCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry.
///
/// `module` is the display grouping and usually equals `code.module()`, but the
/// catalog allows grouping a code elsewhere (e.g. `feature.manage` lives under
/// `settings`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub code: PermissionCode,
    pub name: String,
    pub module: String,
    pub description: Option<String>,
    /// Inactive permissions stay assigned to roles but are never granted.
    pub active: bool,
}

impl Entity for Permission {
    type Id = PermissionId;

    fn id(&self) -> PermissionId {
        self.id
    }
}

/// Input for registering a new catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPermission {
    pub code: PermissionCode,
    pub name: String,
    /// Defaults to the code's module segment.
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of a catalog entry. The code itself is never renamed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}
