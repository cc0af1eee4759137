//! Automara Provisioning: workflow cloning and lifecycle against the
//! remote engine.

mod locks;
pub mod service;

pub use service::{ActivationOutput, ProvisioningService};
