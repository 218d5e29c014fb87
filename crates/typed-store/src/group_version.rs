//! Parsing of `apiVersion` strings into group and version.

use crate::error::StoreError;
use kube::core::GroupVersionKind;
use std::fmt;

/// API group and version of a Kubernetes type
///
/// The core group is the empty string, so `"v1"` parses to `("", "v1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl GroupVersion {
    /// Parse `version` or `group/version`.
    ///
    /// More than one `/`, or an empty version component, is rejected.
    pub fn parse(api_version: &str) -> Result<Self, StoreError> {
        let invalid = |reason: &str| StoreError::InvalidGroupVersion {
            api_version: api_version.to_string(),
            reason: reason.to_string(),
        };

        let (group, version) = match api_version.matches('/').count() {
            0 => ("", api_version),
            1 => api_version
                .split_once('/')
                .ok_or_else(|| invalid("unexpected GroupVersion string"))?,
            _ => return Err(invalid("unexpected GroupVersion string")),
        };

        if version.is_empty() {
            return Err(invalid("version must not be empty"));
        }

        Ok(Self {
            group: group.to_string(),
            version: version.to_string(),
        })
    }

    /// Combine with a kind into a full type descriptor key
    pub fn with_kind(&self, kind: &str) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, kind)
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.version)
        } else {
            write!(f, "{}/{}", self.group, self.version)
        }
    }
}
