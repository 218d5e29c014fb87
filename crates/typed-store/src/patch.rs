//! Status merge-patch helper for dynamically-typed objects.
//!
//! A `StatusPatch` captures the object's `resourceVersion` and its status map
//! at read time. Mutations are applied to a working copy and rendered as a JSON
//! merge patch that touches only the changed keys. The captured
//! `resourceVersion` travels with the patch, so the API server rejects the
//! write with 409 if the object changed since it was read.

use crate::error::StoreError;
use kube::core::DynamicObject;
use serde_json::{Map, Value, json};

/// Pending change to the status map of one object
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPatch {
    resource_version: Option<String>,
    base: Map<String, Value>,
    current: Map<String, Value>,
}

impl StatusPatch {
    /// Capture the base state of `obj`.
    ///
    /// Fails with `MalformedStatus` if `status` is missing or not a map.
    pub fn new(obj: &DynamicObject) -> Result<Self, StoreError> {
        let malformed = |reason: &str| StoreError::MalformedStatus {
            kind: obj
                .types
                .as_ref()
                .map(|t| t.kind.clone())
                .unwrap_or_default(),
            key: format!(
                "{}/{}",
                obj.metadata.namespace.as_deref().unwrap_or_default(),
                obj.metadata.name.as_deref().unwrap_or_default()
            ),
            reason: reason.to_string(),
        };

        let base = match obj.data.get("status") {
            Some(Value::Object(status)) => status.clone(),
            Some(Value::Null) | None => return Err(malformed("status is missing")),
            Some(other) => {
                return Err(malformed(&format!(
                    "status is {}, expected an object",
                    json_type(other)
                )));
            }
        };

        Ok(Self {
            resource_version: obj.metadata.resource_version.clone(),
            current: base.clone(),
            base,
        })
    }

    /// Set one status key, leaving all others untouched
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.current.insert(key.into(), value.into());
        self
    }

    /// Remove one status key
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.current.remove(key);
        self
    }

    /// Status map as it will look after the patch
    pub fn status(&self) -> &Map<String, Value> {
        &self.current
    }

    /// resourceVersion the patch is conditioned on
    pub fn resource_version(&self) -> Option<&str> {
        self.resource_version.as_deref()
    }

    /// True when no status key differs from the captured base
    pub fn is_noop(&self) -> bool {
        self.base == self.current
    }

    /// Render as a JSON merge patch (RFC 7386).
    ///
    /// Only added or changed keys are included; removed keys are sent as `null`.
    pub fn to_merge_patch(&self) -> Value {
        let mut status = Map::new();
        for (key, value) in &self.current {
            if self.base.get(key) != Some(value) {
                status.insert(key.clone(), value.clone());
            }
        }
        for key in self.base.keys() {
            if !self.current.contains_key(key) {
                status.insert(key.clone(), Value::Null);
            }
        }

        let mut patch = json!({ "status": status });
        if let Some(rv) = &self.resource_version {
            patch["metadata"] = json!({ "resourceVersion": rv });
        }
        patch
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
