//! Object store errors

use thiserror::Error;

/// Errors that can occur when reading or patching objects in the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object does not exist
    #[error("{kind} {key} not found")]
    NotFound { kind: String, key: String },

    /// The object changed between read and write (stale resourceVersion)
    #[error("conflict writing {kind} {key}: {message}")]
    Conflict {
        kind: String,
        key: String,
        message: String,
    },

    /// Any other Kubernetes API or transport failure
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// apiVersion is not `version` or `group/version`
    #[error("Invalid apiVersion {api_version:?}: {reason}")]
    InvalidGroupVersion { api_version: String, reason: String },

    /// The object has no status map to merge into
    #[error("{kind} {key} has malformed status: {reason}")]
    MalformedStatus {
        kind: String,
        key: String,
        reason: String,
    },

    /// No type descriptor could be found for the group/version/kind
    #[error("Unknown type {gvk}: {reason}")]
    UnknownType { gvk: String, reason: String },

    /// The object could not be decoded into the requested type
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// Convert a kube error, mapping 404 and 409 onto their dedicated variants
    pub fn from_kube(err: kube::Error, kind: &str, key: &str) -> Self {
        let code = match &err {
            kube::Error::Api(ae) => Some(ae.code),
            _ => None,
        };
        match code {
            Some(404) => Self::NotFound {
                kind: kind.to_string(),
                key: key.to_string(),
            },
            Some(409) => Self::Conflict {
                kind: kind.to_string(),
                key: key.to_string(),
                message: err.to_string(),
            },
            _ => Self::Kube(err),
        }
    }

    /// True for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for `Conflict`
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
