//! Namespace/name identity of a namespaced object

use kube::Resource;
use std::fmt;

/// Namespace/name pair identifying a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an existing object, `None` if it is unnamed or cluster-scoped
    pub fn from_resource<K: Resource>(obj: &K) -> Option<Self> {
        let meta = obj.meta();
        Some(Self::new(meta.namespace.clone()?, meta.name.clone()?))
    }

    /// Key of another object in the same namespace
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        Self::new(self.namespace.clone(), name)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{Controller, ControllerSpec};

    #[test]
    fn test_display() {
        assert_eq!(ObjectKey::new("a", "o1").to_string(), "a/o1");
    }

    #[test]
    fn test_sibling_keeps_namespace() {
        let owner = ObjectKey::new("a", "o1");
        assert_eq!(owner.sibling("w1"), ObjectKey::new("a", "w1"));
    }

    #[test]
    fn test_from_resource() {
        let mut obj = Controller::new("o1", ControllerSpec::default());
        assert_eq!(ObjectKey::from_resource(&obj), None);

        obj.metadata.namespace = Some("a".to_string());
        assert_eq!(ObjectKey::from_resource(&obj), Some(ObjectKey::new("a", "o1")));
    }
}
