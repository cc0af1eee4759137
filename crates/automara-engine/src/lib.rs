//! Automara Engine: typed async client for the remote workflow
//! engine's v1 API.

pub mod client;
pub mod error;
pub mod types;

pub use client::{EngineClient, HttpEngineClient};
pub use error::EngineError;
pub use types::{EngineTag, EngineWorkflow, NewEngineWorkflow};
