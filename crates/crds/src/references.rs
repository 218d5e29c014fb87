//! Loosely-typed object reference carried by a `Controller`.
//!
//! Unlike `TypedLocalObjectReference`, the target is identified by a full
//! `apiVersion` string (`group/version`, or just `version` for the core group)
//! so any registered kind can be referenced. The namespace is never part of
//! the reference: targets always live next to the referencing object.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to an arbitrary, dynamically-typed object in the same namespace.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ref {
    /// Kind of the referenced object (e.g., "Widget")
    pub kind: String,

    /// Name of the referenced object
    pub name: String,

    /// API version of the referenced object (e.g., "demo/v1")
    pub api_version: String,
}

impl Ref {
    /// Create a new reference
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            api_version: api_version.into(),
        }
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} {}", self.api_version, self.kind, self.name)
    }
}
