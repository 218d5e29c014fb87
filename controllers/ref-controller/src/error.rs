//! Controller-specific error types.
//!
//! `ReconcileError` is what a single reconciliation pass reports; each variant
//! names the step that failed and carries the store error underneath.
//! `ControllerError` covers bootstrap: configuration, watches and the probe
//! server.

use crds::Ref;
use std::fmt;
use thiserror::Error;
use typed_store::{ObjectKey, StoreError};

/// Step of a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FetchOwner,
    ResolveReference,
    FetchReference,
    PatchStatus,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchOwner => "fetch owner",
            Self::ResolveReference => "resolve reference",
            Self::FetchReference => "fetch referenced object",
            Self::PatchStatus => "patch status",
        })
    }
}

/// How the caller should react to a failed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Store outage or object not there yet: retry with backoff
    Transient,
    /// Invalid input: retrying is futile until the spec changes
    Permanent,
    /// Optimistic-concurrency collision: re-run the whole pass
    Conflict,
    /// Referenced object lacks a status map: needs investigation
    ContractViolation,
    /// Aborted by shutdown
    Cancelled,
}

impl ErrorClass {
    /// Label value used in metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::Conflict => "conflict",
            Self::ContractViolation => "contract_violation",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by a single reconciliation pass
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Owner could not be read (anything but not-found)
    #[error("Failed to retrieve controller object {key}: {source}")]
    OwnerFetch { key: ObjectKey, source: StoreError },

    /// `spec.ref.apiVersion` does not parse
    #[error("Invalid reference in {key}: {source}")]
    InvalidReference { key: ObjectKey, source: StoreError },

    /// Referenced object missing or unreadable
    #[error("Failed to find referenced object {reference} for {key}: {source}")]
    ReferenceFetch {
        key: ObjectKey,
        reference: Ref,
        source: StoreError,
    },

    /// Referenced object has no usable status map
    #[error("Referenced object {reference} for {key} violates the status contract: {source}")]
    StatusContract {
        key: ObjectKey,
        reference: Ref,
        source: StoreError,
    },

    /// Status patch rejected or failed
    #[error("Failed to patch status of {reference} for {key}: {source}")]
    StatusPatch {
        key: ObjectKey,
        reference: Ref,
        source: StoreError,
    },

    /// Cancellation observed before the step could run
    #[error("Reconciliation of {key} cancelled before {step}")]
    Cancelled { key: ObjectKey, step: Step },
}

impl ReconcileError {
    /// Step at which the pass stopped
    pub fn step(&self) -> Step {
        match self {
            Self::OwnerFetch { .. } => Step::FetchOwner,
            Self::InvalidReference { .. } => Step::ResolveReference,
            Self::ReferenceFetch { .. } => Step::FetchReference,
            Self::StatusContract { .. } | Self::StatusPatch { .. } => Step::PatchStatus,
            Self::Cancelled { step, .. } => *step,
        }
    }

    /// Owner the failed pass was reconciling
    pub fn key(&self) -> &ObjectKey {
        match self {
            Self::OwnerFetch { key, .. }
            | Self::InvalidReference { key, .. }
            | Self::ReferenceFetch { key, .. }
            | Self::StatusContract { key, .. }
            | Self::StatusPatch { key, .. }
            | Self::Cancelled { key, .. } => key,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            // An owner that no longer decodes will not fix itself
            Self::OwnerFetch {
                source: StoreError::Decode(_),
                ..
            } => ErrorClass::Permanent,
            Self::OwnerFetch { .. } | Self::ReferenceFetch { .. } => ErrorClass::Transient,
            Self::InvalidReference { .. } => ErrorClass::Permanent,
            Self::StatusContract { .. } => ErrorClass::ContractViolation,
            Self::StatusPatch { source, .. } if source.is_conflict() => ErrorClass::Conflict,
            Self::StatusPatch { .. } => ErrorClass::Transient,
            Self::Cancelled { .. } => ErrorClass::Cancelled,
        }
    }
}

/// Errors that can occur while bootstrapping or running the controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Probe server failed
    #[error("Probe server error: {0}")]
    Server(#[from] std::io::Error),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
