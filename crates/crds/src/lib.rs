//! Reference Controller CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the reference controller.

pub mod controller;
pub mod references;

pub use controller::*;
pub use references::*;
