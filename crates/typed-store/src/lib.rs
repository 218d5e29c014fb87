//! Typed Object Store
//!
//! Access to a heterogeneous, versioned collection of namespaced Kubernetes
//! objects. Statically known kinds are read through typed accessors; kinds
//! only known at runtime (from a `{kind, apiVersion}` pair) are read and
//! patched as `DynamicObject`s whose type descriptors come from an explicit
//! [`TypeRegistry`] built at startup.
//!
//! # Example
//!
//! ```no_run
//! use typed_store::{GroupVersion, KubeObjectStore, ObjectKey, ObjectStore, StatusPatch, TypeRegistry};
//!
//! # async fn example(client: kube::Client) -> Result<(), Box<dyn std::error::Error>> {
//! let store = KubeObjectStore::new(client, TypeRegistry::new());
//!
//! let gvk = GroupVersion::parse("demo/v1")?.with_kind("Widget");
//! let key = ObjectKey::new("a", "w1");
//!
//! let widget = store.get(&gvk, &key).await?;
//! let mut patch = StatusPatch::new(&widget)?;
//! patch.set("controller", true);
//! store.patch_status(&gvk, &key, &patch).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod group_version;
pub mod key;
pub mod patch;
pub mod registry;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::KubeObjectStore;
pub use error::StoreError;
pub use group_version::GroupVersion;
pub use key::ObjectKey;
pub use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
pub use patch::StatusPatch;
pub use registry::TypeRegistry;
pub use store_trait::{ObjectStore, TypedObjectStore};
#[cfg(feature = "test-util")]
pub use mock::{MockFailure, MockObjectStore};
