//! SurrealDB repository implementations.

mod activity;
mod credential;
mod tenant;
mod workflow;

pub use activity::SurrealActivityLogRepository;
pub use credential::SurrealCredentialRepository;
pub use tenant::SurrealTenantRepository;
pub use workflow::SurrealWorkflowRepository;
