//! Automara Core - shared domain models, repository traits, and error types.
//!
//! This crate defines:
//! - Domain models for tenants, workflows, activity logs, and stored
//!   credentials ([`models`])
//! - Repository traits implemented by `automara-db` ([`repository`])
//! - The per-request context carried through tenant-scoped operations
//!   ([`context`])
//! - The shared error taxonomy ([`error`])

pub mod context;
pub mod error;
pub mod models;
pub mod repository;

pub use context::{RequestContext, Role};
pub use error::{AutomaraError, AutomaraResult};
