//! Wire types for the remote workflow engine v1 API.

use serde::{Deserialize, Serialize};

/// A grouping tag on the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineTag {
    pub id: String,
    pub name: String,
}

/// A workflow as the engine reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineWorkflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub nodes: serde_json::Value,
    #[serde(default)]
    pub connections: serde_json::Value,
    #[serde(default)]
    pub settings: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<EngineTag>,
}

/// Payload for creating a workflow on the engine.
///
/// Callers post `active: false`; activation is a separate call.
#[derive(Debug, Clone, Serialize)]
pub struct NewEngineWorkflow {
    pub name: String,
    pub nodes: serde_json::Value,
    pub connections: serde_json::Value,
    pub settings: serde_json::Value,
    pub tags: Vec<String>,
    pub active: bool,
}
