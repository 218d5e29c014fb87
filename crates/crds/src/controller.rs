//! Controller CRD
//!
//! Points at another object whose status should be marked as claimed by a
//! controller. The resource is a pure pointer holder: it has no status of its
//! own beyond an empty marker.

use crate::references::Ref;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "delivery.controller-e2e-framework",
    version = "v1alpha1",
    kind = "Controller",
    namespaced,
    status = "ControllerStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSpec {
    /// Object this controller claims (inert when absent)
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<Ref>,
}

/// Observed state of a `Controller`. Intentionally empty.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub struct ControllerStatus {}
