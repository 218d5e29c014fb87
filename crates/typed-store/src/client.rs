//! Kubernetes-backed object store

use crate::error::StoreError;
use crate::key::ObjectKey;
use crate::patch::StatusPatch;
use crate::registry::TypeRegistry;
use crate::store_trait::ObjectStore;
use kube::api::{Api, Patch, PatchParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Client, discovery};
use tracing::debug;

/// Object store backed by the Kubernetes API server
///
/// Type descriptors are taken from the injected [`TypeRegistry`]. Kinds that
/// were not registered are resolved through API discovery on every lookup.
#[derive(Clone)]
pub struct KubeObjectStore {
    client: Client,
    registry: TypeRegistry,
}

impl KubeObjectStore {
    pub fn new(client: Client, registry: TypeRegistry) -> Self {
        Self { client, registry }
    }

    async fn api_resource(&self, gvk: &GroupVersionKind) -> Result<ApiResource, StoreError> {
        if let Some(resource) = self.registry.resolve(gvk) {
            return Ok(resource.clone());
        }

        debug!("{}/{} {} not registered, using discovery", gvk.group, gvk.version, gvk.kind);
        match discovery::pinned_kind(&self.client, gvk).await {
            Ok((resource, _caps)) => Ok(resource),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Err(StoreError::UnknownType {
                gvk: format_gvk(gvk),
                reason: "group version is not served".to_string(),
            }),
            Err(kube::Error::Discovery(e)) => Err(StoreError::UnknownType {
                gvk: format_gvk(gvk),
                reason: e.to_string(),
            }),
            Err(e) => Err(StoreError::Kube(e)),
        }
    }

    async fn api(&self, gvk: &GroupVersionKind, key: &ObjectKey) -> Result<Api<DynamicObject>, StoreError> {
        let resource = self.api_resource(gvk).await?;
        Ok(Api::namespaced_with(self.client.clone(), &key.namespace, &resource))
    }
}

#[async_trait::async_trait]
impl ObjectStore for KubeObjectStore {
    async fn get(&self, gvk: &GroupVersionKind, key: &ObjectKey) -> Result<DynamicObject, StoreError> {
        let api = self.api(gvk, key).await?;
        api.get(&key.name)
            .await
            .map_err(|e| StoreError::from_kube(e, &gvk.kind, &key.to_string()))
    }

    async fn patch_status(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
        patch: &StatusPatch,
    ) -> Result<DynamicObject, StoreError> {
        let api = self.api(gvk, key).await?;
        let body = patch.to_merge_patch();
        debug!("Patching {} {} status: {}", gvk.kind, key, body);

        api.patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&body))
            .await
            .map_err(|e| StoreError::from_kube(e, &gvk.kind, &key.to_string()))
    }
}

fn format_gvk(gvk: &GroupVersionKind) -> String {
    if gvk.group.is_empty() {
        format!("{}/{}", gvk.version, gvk.kind)
    } else {
        format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
    }
}
