//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crate::reconciler::Reconciler;
use crds::{Controller, ControllerSpec, Ref};
use std::sync::Arc;
use typed_store::{GroupVersionKind, MockObjectStore};

/// Helper to create a test Controller CRD
pub fn create_test_controller(name: &str, namespace: &str, reference: Option<Ref>) -> Controller {
    let mut controller = Controller::new(name, ControllerSpec { reference });
    controller.metadata.namespace = Some(namespace.to_string());
    controller
}

/// Type of the dynamically-typed test target
pub fn widget_gvk() -> GroupVersionKind {
    GroupVersionKind::gvk("demo", "v1", "Widget")
}

/// Reference to a Widget named `name`
pub fn widget_ref(name: &str) -> Ref {
    Ref::new("Widget", name, "demo/v1")
}

/// Reconciler backed by `store`
pub fn create_test_reconciler(store: &MockObjectStore) -> Reconciler {
    Reconciler::new(Arc::new(store.clone()))
}
