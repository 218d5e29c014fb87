//! Reconciliation logic for `Controller` CRDs.
//!
//! One pass per owner key, strictly sequential:
//! 1. fetch the owning `Controller` (not found means deleted: done)
//! 2. stop if it carries no `spec.ref`
//! 3. resolve `spec.ref` into a type descriptor and a key in the owner's namespace
//! 4. fetch the referenced object
//! 5. merge `controller: true` into its status, conditioned on the read resourceVersion
//!
//! The reconciler holds no state between passes. Retrying is left to the
//! caller; every failure is returned, classified by [`ReconcileError::class`].

pub mod reference;
pub mod status;

use crate::error::{ReconcileError, Step};
use crds::Controller;
use kube_runtime::controller::Action;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use typed_store::{ObjectKey, ObjectStore, TypedObjectStore};

use reference::ResolvedRef;
use status::ClaimError;

/// Reconciles `Controller` resources against the object store.
pub struct Reconciler {
    pub(crate) store: Arc<dyn ObjectStore>,
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Runs one reconciliation pass for the owner at `key`.
    ///
    /// Success always means "no requeue": the loop is level-triggered and the
    /// next pass is started by a watch event, never by this function.
    #[instrument(skip(self, cancel), fields(controller = %key))]
    pub async fn reconcile(
        &self,
        key: &ObjectKey,
        cancel: &CancellationToken,
    ) -> Result<Action, ReconcileError> {
        let owner = guard(cancel, key, Step::FetchOwner, self.store.get_typed::<Controller>(key)).await?;
        let owner = match owner {
            Ok(owner) => owner,
            Err(e) if e.is_not_found() => {
                debug!("Controller {} not found, assuming it was deleted", key);
                return Ok(Action::await_change());
            }
            Err(source) => {
                return Err(ReconcileError::OwnerFetch {
                    key: key.clone(),
                    source,
                });
            }
        };

        let Some(reference) = owner.spec.reference else {
            info!("No reference set for {}, skipping", key);
            return Ok(Action::await_change());
        };

        let target = ResolvedRef::resolve(key, &reference).map_err(|source| {
            ReconcileError::InvalidReference {
                key: key.clone(),
                source,
            }
        })?;

        let object = guard(cancel, key, Step::FetchReference, self.store.get(&target.gvk, &target.key))
            .await?
            .map_err(|source| ReconcileError::ReferenceFetch {
                key: key.clone(),
                reference: reference.clone(),
                source,
            })?;

        // The patch is a single conditional write: once sent it is not abandoned.
        if cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled {
                key: key.clone(),
                step: Step::PatchStatus,
            });
        }

        status::mark_controlled(self.store.as_ref(), &target, &object)
            .await
            .map_err(|e| match e {
                ClaimError::Contract(source) => ReconcileError::StatusContract {
                    key: key.clone(),
                    reference: reference.clone(),
                    source,
                },
                ClaimError::Patch(source) => ReconcileError::StatusPatch {
                    key: key.clone(),
                    reference: reference.clone(),
                    source,
                },
            })?;

        info!("Marked {} as controlled by {}", reference, key);
        Ok(Action::await_change())
    }
}

/// Race a store call against cancellation.
async fn guard<F, T>(
    cancel: &CancellationToken,
    key: &ObjectKey,
    step: Step,
    call: F,
) -> Result<T, ReconcileError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ReconcileError::Cancelled { key: key.clone(), step }),
        out = call => Ok(out),
    }
}
