//! Type descriptor table.
//!
//! Maps a `GroupVersionKind` to the `ApiResource` (plural, api version) needed
//! to build request URLs. The table is assembled once at startup and handed to
//! the store; it is never mutated afterwards.

use kube::Resource;
use kube::core::{ApiResource, GroupVersionKind};
use std::collections::HashMap;

/// Explicit table of type descriptors known at startup
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<GroupVersionKind, ApiResource>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a statically known kind
    #[must_use]
    pub fn register<K: Resource<DynamicType = ()>>(self) -> Self {
        self.register_dynamic(ApiResource::erase::<K>(&()))
    }

    /// Register a kind described at runtime
    #[must_use]
    pub fn register_dynamic(mut self, resource: ApiResource) -> Self {
        let gvk = GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind);
        self.types.insert(gvk, resource);
        self
    }

    /// Look up the descriptor for a type
    pub fn resolve(&self, gvk: &GroupVersionKind) -> Option<&ApiResource> {
        self.types.get(gvk)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
