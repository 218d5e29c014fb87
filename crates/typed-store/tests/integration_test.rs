//! Integration tests for the Kubernetes-backed store
//!
//! These tests require a reachable cluster (current kubeconfig context).
//! Set TEST_NAMESPACE to choose the namespace (default "default").

use kube::Client;
use typed_store::{GroupVersion, KubeObjectStore, ObjectKey, ObjectStore, StoreError, TypeRegistry};

fn namespace() -> String {
    std::env::var("TEST_NAMESPACE").unwrap_or_else(|_| "default".to_string())
}

#[tokio::test]
#[ignore] // Requires running cluster
async fn test_get_missing_core_object_is_not_found() {
    let client = Client::try_default().await.expect("Failed to create client");
    let store = KubeObjectStore::new(client, TypeRegistry::new());

    let gvk = GroupVersion::parse("v1").unwrap().with_kind("ConfigMap");
    let err = store
        .get(&gvk, &ObjectKey::new(namespace(), "typed-store-does-not-exist"))
        .await
        .unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
#[ignore]
async fn test_get_unknown_kind_is_unknown_type() {
    let client = Client::try_default().await.expect("Failed to create client");
    let store = KubeObjectStore::new(client, TypeRegistry::new());

    let gvk = GroupVersion::parse("v1").unwrap().with_kind("NoSuchKind");
    let err = store
        .get(&gvk, &ObjectKey::new(namespace(), "anything"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::UnknownType { .. }), "unexpected error: {err}");
}
