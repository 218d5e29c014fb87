//! Mock ObjectStore for unit testing
//!
//! Stores objects in memory and mimics the API server behaviour the
//! reconciler depends on: a fresh `resourceVersion` on every write, merge
//! patch semantics on the status map, and 409 on a stale `resourceVersion`.
//! Failures and concurrent writers can be injected for testing different
//! scenarios.

use crate::error::StoreError;
use crate::key::ObjectKey;
use crate::patch::StatusPatch;
use crate::store_trait::ObjectStore;
use kube::Resource;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

type StoreKey = (GroupVersionKind, ObjectKey);

/// Failure to inject into the next matching call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Store unreachable
    Unavailable,
    /// Write rejected as stale
    Conflict,
}

/// Mock ObjectStore for testing
#[derive(Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<StoreKey, DynamicObject>>>,
    next_version: Arc<Mutex<u64>>,
    get_failures: Arc<Mutex<VecDeque<MockFailure>>>,
    patch_failures: Arc<Mutex<VecDeque<MockFailure>>>,
    // Objects that get modified by another writer right after the next read
    racing: Arc<Mutex<HashSet<StoreKey>>>,
    gets: Arc<Mutex<Vec<StoreKey>>>,
    patches: Arc<Mutex<Vec<(StoreKey, Value)>>>,
}

impl MockObjectStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statically typed object (for test setup)
    ///
    /// # Panics
    ///
    /// Panics if the object has no name or namespace.
    pub fn insert<K>(&self, obj: &K) -> DynamicObject
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let resource = ApiResource::erase::<K>(&());
        let mut dynamic: DynamicObject = serde_json::from_value(
            serde_json::to_value(obj).expect("test object must serialize"),
        )
        .expect("test object must decode as DynamicObject");
        dynamic.types = Some(kube::core::TypeMeta {
            api_version: resource.api_version.clone(),
            kind: resource.kind.clone(),
        });
        self.store(gvk_of(&resource), dynamic)
    }

    /// Add a dynamically typed object with the given top-level fields (for test setup)
    ///
    /// `data` is the object body without `apiVersion`, `kind` and `metadata`,
    /// e.g. `json!({"status": {"color": "red"}})`.
    pub fn insert_dynamic(&self, gvk: &GroupVersionKind, key: &ObjectKey, data: Value) -> DynamicObject {
        let resource = ApiResource::from_gvk(gvk);
        let mut obj = DynamicObject::new(&key.name, &resource).within(&key.namespace);
        obj.data = data;
        self.store(gvk.clone(), obj)
    }

    /// Current copy of an object
    pub fn object(&self, gvk: &GroupVersionKind, key: &ObjectKey) -> Option<DynamicObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(gvk.clone(), key.clone()))
            .cloned()
    }

    /// Current status map of an object
    pub fn status(&self, gvk: &GroupVersionKind, key: &ObjectKey) -> Option<Value> {
        self.object(gvk, key)
            .and_then(|obj| obj.data.get("status").cloned())
    }

    /// Simulate another writer updating the object (bumps its resourceVersion)
    pub fn touch(&self, gvk: &GroupVersionKind, key: &ObjectKey) {
        let version = self.bump_version();
        if let Some(obj) = self.objects.lock().unwrap().get_mut(&(gvk.clone(), key.clone())) {
            obj.metadata.resource_version = Some(version);
        }
    }

    /// Touch the object immediately after the next successful read of it
    pub fn race_next_get(&self, gvk: &GroupVersionKind, key: &ObjectKey) {
        self.racing.lock().unwrap().insert((gvk.clone(), key.clone()));
    }

    /// Fail the next `get` call
    pub fn fail_next_get(&self, failure: MockFailure) {
        self.get_failures.lock().unwrap().push_back(failure);
    }

    /// Fail the next `patch_status` call
    pub fn fail_next_patch(&self, failure: MockFailure) {
        self.patch_failures.lock().unwrap().push_back(failure);
    }

    /// Every `get` issued so far, in order
    pub fn gets(&self) -> Vec<(GroupVersionKind, ObjectKey)> {
        self.gets.lock().unwrap().clone()
    }

    /// Every `patch_status` body issued so far, in order
    pub fn patches(&self) -> Vec<(GroupVersionKind, ObjectKey, Value)> {
        self.patches
            .lock()
            .unwrap()
            .iter()
            .map(|((gvk, key), body)| (gvk.clone(), key.clone(), body.clone()))
            .collect()
    }

    fn store(&self, gvk: GroupVersionKind, mut obj: DynamicObject) -> DynamicObject {
        let key = ObjectKey::new(
            obj.metadata.namespace.clone().unwrap_or_default(),
            obj.metadata.name.clone().unwrap_or_default(),
        );
        assert!(!key.name.is_empty(), "mock objects must be named");
        obj.metadata.resource_version = Some(self.bump_version());
        self.objects.lock().unwrap().insert((gvk, key), obj.clone());
        obj
    }

    fn bump_version(&self) -> String {
        let mut version = self.next_version.lock().unwrap();
        *version += 1;
        version.to_string()
    }

    fn injected(
        queue: &Mutex<VecDeque<MockFailure>>,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Option<StoreError> {
        queue.lock().unwrap().pop_front().map(|failure| match failure {
            MockFailure::Unavailable => StoreError::Unavailable("injected failure".to_string()),
            MockFailure::Conflict => StoreError::Conflict {
                kind: gvk.kind.clone(),
                key: key.to_string(),
                message: "injected conflict".to_string(),
            },
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockObjectStore {
    async fn get(&self, gvk: &GroupVersionKind, key: &ObjectKey) -> Result<DynamicObject, StoreError> {
        let store_key = (gvk.clone(), key.clone());
        self.gets.lock().unwrap().push(store_key.clone());

        if let Some(err) = Self::injected(&self.get_failures, gvk, key) {
            return Err(err);
        }

        let obj = self
            .objects
            .lock()
            .unwrap()
            .get(&store_key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: gvk.kind.clone(),
                key: key.to_string(),
            })?;

        if self.racing.lock().unwrap().remove(&store_key) {
            self.touch(gvk, key);
        }

        Ok(obj)
    }

    async fn patch_status(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
        patch: &StatusPatch,
    ) -> Result<DynamicObject, StoreError> {
        let store_key = (gvk.clone(), key.clone());
        let body = patch.to_merge_patch();
        self.patches.lock().unwrap().push((store_key.clone(), body.clone()));

        if let Some(err) = Self::injected(&self.patch_failures, gvk, key) {
            return Err(err);
        }

        let new_version = self.bump_version();
        let mut objects = self.objects.lock().unwrap();
        let obj = objects.get_mut(&store_key).ok_or_else(|| StoreError::NotFound {
            kind: gvk.kind.clone(),
            key: key.to_string(),
        })?;

        if let Some(expected) = patch.resource_version() {
            if obj.metadata.resource_version.as_deref() != Some(expected) {
                return Err(StoreError::Conflict {
                    kind: gvk.kind.clone(),
                    key: key.to_string(),
                    message: format!(
                        "the object has been modified; resourceVersion {} is stale",
                        expected
                    ),
                });
            }
        }

        if obj.data.get("status").is_none() {
            obj.data["status"] = json!({});
        }
        if let Some(status_patch) = body.get("status") {
            json_patch::merge(&mut obj.data["status"], status_patch);
        }
        obj.metadata.resource_version = Some(new_version);
        Ok(obj.clone())
    }
}

fn gvk_of(resource: &ApiResource) -> GroupVersionKind {
    GroupVersionKind::gvk(&resource.group, &resource.version, &resource.kind)
}
