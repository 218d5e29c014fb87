//! Resolution of a loosely-typed `Ref` into a concrete store lookup.

use crds::Ref;
use typed_store::{GroupVersion, GroupVersionKind, ObjectKey, StoreError};

/// Type descriptor and key of a referenced object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub gvk: GroupVersionKind,
    pub key: ObjectKey,
}

impl ResolvedRef {
    /// Resolve `reference` relative to the owner at `owner`.
    ///
    /// The target is always looked up in the owner's namespace; references
    /// cannot cross namespaces.
    pub fn resolve(owner: &ObjectKey, reference: &Ref) -> Result<Self, StoreError> {
        let gv = GroupVersion::parse(&reference.api_version)?;
        Ok(Self {
            gvk: gv.with_kind(&reference.kind),
            key: owner.sibling(&reference.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_in_owner_namespace() {
        let owner = ObjectKey::new("a", "o1");
        let resolved = ResolvedRef::resolve(&owner, &Ref::new("Widget", "w1", "demo/v1")).unwrap();

        assert_eq!(resolved.gvk, GroupVersionKind::gvk("demo", "v1", "Widget"));
        assert_eq!(resolved.key, ObjectKey::new("a", "w1"));
    }

    #[test]
    fn test_resolve_core_group() {
        let owner = ObjectKey::new("b", "o2");
        let resolved = ResolvedRef::resolve(&owner, &Ref::new("ConfigMap", "cm", "v1")).unwrap();

        assert_eq!(resolved.gvk, GroupVersionKind::gvk("", "v1", "ConfigMap"));
        assert_eq!(resolved.key.namespace, "b");
    }

    #[test]
    fn test_resolve_malformed_api_version() {
        let owner = ObjectKey::new("a", "o1");
        let err = ResolvedRef::resolve(&owner, &Ref::new("Widget", "w1", "///bad")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidGroupVersion { .. }));
    }
}
