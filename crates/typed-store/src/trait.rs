//! ObjectStore trait for mocking
//!
//! This trait abstracts object access so the reconciler can run against the
//! Kubernetes API in production and against `MockObjectStore` in unit tests.

use crate::error::StoreError;
use crate::key::ObjectKey;
use crate::patch::StatusPatch;
use kube::Resource;
use kube::core::{DynamicObject, GroupVersionKind};
use serde::de::DeserializeOwned;

/// Dynamically-typed get/patch over namespaced objects
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object of any registered type
    async fn get(&self, gvk: &GroupVersionKind, key: &ObjectKey) -> Result<DynamicObject, StoreError>;

    /// Merge-patch the status subresource, conditioned on the patch's resourceVersion
    async fn patch_status(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
        patch: &StatusPatch,
    ) -> Result<DynamicObject, StoreError>;
}

/// Typed accessors for kinds known at compile time
#[async_trait::async_trait]
pub trait TypedObjectStore: ObjectStore {
    async fn get_typed<K>(&self, key: &ObjectKey) -> Result<K, StoreError>
    where
        K: Resource<DynamicType = ()> + DeserializeOwned + Send + 'static;
}

#[async_trait::async_trait]
impl<S: ObjectStore + ?Sized> TypedObjectStore for S {
    async fn get_typed<K>(&self, key: &ObjectKey) -> Result<K, StoreError>
    where
        K: Resource<DynamicType = ()> + DeserializeOwned + Send + 'static,
    {
        let gvk = GroupVersionKind::gvk(&K::group(&()), &K::version(&()), &K::kind(&()));
        let obj = self.get(&gvk, key).await?;
        Ok(serde_json::from_value(serde_json::to_value(obj)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{Controller, ControllerSpec, Ref};
    use kube::core::ApiResource;
    use std::sync::Mutex;

    struct SingleObjectStore {
        object: DynamicObject,
        requested: Mutex<Vec<GroupVersionKind>>,
    }

    #[async_trait::async_trait]
    impl ObjectStore for SingleObjectStore {
        async fn get(&self, gvk: &GroupVersionKind, _key: &ObjectKey) -> Result<DynamicObject, StoreError> {
            self.requested.lock().unwrap().push(gvk.clone());
            Ok(self.object.clone())
        }

        async fn patch_status(
            &self,
            _gvk: &GroupVersionKind,
            _key: &ObjectKey,
            _patch: &StatusPatch,
        ) -> Result<DynamicObject, StoreError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_get_typed_decodes_dynamic_object() {
        let mut owner = Controller::new(
            "o1",
            ControllerSpec {
                reference: Some(Ref::new("Widget", "w1", "demo/v1")),
            },
        );
        owner.metadata.namespace = Some("a".to_string());

        let object: DynamicObject =
            serde_json::from_value(serde_json::to_value(&owner).unwrap()).unwrap();
        let store = SingleObjectStore {
            object,
            requested: Mutex::new(Vec::new()),
        };

        let decoded: Controller = store.get_typed(&ObjectKey::new("a", "o1")).await.unwrap();
        assert_eq!(decoded.spec, owner.spec);

        let requested = store.requested.lock().unwrap();
        assert_eq!(
            requested[0],
            GroupVersionKind::gvk("delivery.controller-e2e-framework", "v1alpha1", "Controller")
        );
    }

    #[tokio::test]
    async fn test_get_typed_reports_decode_errors() {
        let ar = ApiResource::erase::<Controller>(&());
        let mut object = DynamicObject::new("o1", &ar).within("a");
        object.data = serde_json::json!({"spec": {"ref": "not-a-ref"}});
        let store = SingleObjectStore {
            object,
            requested: Mutex::new(Vec::new()),
        };

        let err = store
            .get_typed::<Controller>(&ObjectKey::new("a", "o1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
