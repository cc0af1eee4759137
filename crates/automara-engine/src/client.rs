//! HTTP client for the remote workflow engine.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::EngineError;
use crate::types::{EngineTag, EngineWorkflow, NewEngineWorkflow};

/// API key header the engine expects on every request.
const API_KEY_HEADER: &str = "X-Api-Key";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Operations the provisioning layer needs from the engine.
///
/// The production implementation is [`HttpEngineClient`]; tests
/// substitute their own.
pub trait EngineClient: Send + Sync {
    fn list_tags(&self) -> impl Future<Output = Result<Vec<EngineTag>, EngineError>> + Send;
    fn create_tag(&self, name: &str)
    -> impl Future<Output = Result<EngineTag, EngineError>> + Send;
    fn get_workflow(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<EngineWorkflow, EngineError>> + Send;
    /// Create a workflow; the engine leaves it inactive.
    fn create_workflow(
        &self,
        workflow: NewEngineWorkflow,
    ) -> impl Future<Output = Result<EngineWorkflow, EngineError>> + Send;
    fn set_workflow_active(
        &self,
        id: &str,
        active: bool,
    ) -> impl Future<Output = Result<EngineWorkflow, EngineError>> + Send;
    fn delete_workflow(&self, id: &str) -> impl Future<Output = Result<(), EngineError>> + Send;
}

/// Production client over the engine's v1 REST API.
#[derive(Clone)]
pub struct HttpEngineClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpEngineClient {
    /// Create a client for the engine at `base_url`.
    pub fn new(base_url: &str, api_key: String) -> Result<Self, EngineError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    // ========== Internal HTTP helpers ==========

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .patch(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// DELETE checks the status only; the engine's 2xx body is empty.
    async fn delete(&self, path: &str) -> Result<(), EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .delete(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(EngineError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, EngineError> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(EngineError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl EngineClient for HttpEngineClient {
    // ========== Tag API ==========

    async fn list_tags(&self) -> Result<Vec<EngineTag>, EngineError> {
        self.get("/api/v1/tags").await
    }

    async fn create_tag(&self, name: &str) -> Result<EngineTag, EngineError> {
        self.post("/api/v1/tags", &json!({ "name": name })).await
    }

    // ========== Workflow API ==========

    async fn get_workflow(&self, id: &str) -> Result<EngineWorkflow, EngineError> {
        self.get(&format!("/api/v1/workflows/{id}")).await
    }

    async fn create_workflow(
        &self,
        workflow: NewEngineWorkflow,
    ) -> Result<EngineWorkflow, EngineError> {
        self.post("/api/v1/workflows", &workflow).await
    }

    async fn set_workflow_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<EngineWorkflow, EngineError> {
        self.patch(&format!("/api/v1/workflows/{id}"), &json!({ "active": active }))
            .await
    }

    async fn delete_workflow(&self, id: &str) -> Result<(), EngineError> {
        self.delete(&format!("/api/v1/workflows/{id}")).await
    }
}
