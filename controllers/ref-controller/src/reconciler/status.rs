//! Status claim on the referenced object.

use super::reference::ResolvedRef;
use tracing::debug;
use typed_store::{DynamicObject, ObjectStore, StatusPatch, StoreError};

/// Status key that marks an object as having a controller
pub const CONTROLLER_STATUS_KEY: &str = "controller";

/// Failure while claiming the referenced object's status
#[derive(Debug)]
pub enum ClaimError {
    /// Status missing or not a map
    Contract(StoreError),
    /// Store rejected or failed the write
    Patch(StoreError),
}

/// Set `status.controller = true` on `object`, keeping every other status key.
///
/// The patch is sent even if the marker is already set; the write is then a
/// no-op for the object's content.
pub async fn mark_controlled(
    store: &dyn ObjectStore,
    target: &ResolvedRef,
    object: &DynamicObject,
) -> Result<DynamicObject, ClaimError> {
    let mut patch = StatusPatch::new(object).map_err(ClaimError::Contract)?;
    patch.set(CONTROLLER_STATUS_KEY, true);

    if patch.is_noop() {
        debug!("{} {} already marked as controlled", target.gvk.kind, target.key);
    }

    store
        .patch_status(&target.gvk, &target.key, &patch)
        .await
        .map_err(ClaimError::Patch)
}
