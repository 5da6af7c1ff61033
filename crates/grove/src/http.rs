//! JSON-over-HTTP transport for the namespace service.
//!
//! Commands map to `POST {base_url}/api/v1/{command}` with a JSON body.
//! Failures are categorized by status code; network faults surface as
//! [`GroveError::Transient`]. No retries happen here.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::{GroveError, Result};
use crate::node::{NodeSnapshot, NodeType};
use crate::path::TreePath;
use crate::service::{CreateOptions, LinkOptions, NamespaceService, RemoveOptions};
use crate::value::AttrValue;

const USER_AGENT: &str = concat!("grove/", env!("CARGO_PKG_VERSION"));

/// [`NamespaceService`] implementation speaking the service's HTTP API.
pub struct HttpNamespaceService {
    client: reqwest::Client,
    config: ClientConfig,
}

#[derive(Deserialize)]
struct ExistsResponse {
    value: bool,
}

#[derive(Deserialize)]
struct ListResponse {
    keys: Vec<String>,
}

impl HttpNamespaceService {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GroveError::Transient(format!("failed to build http client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn execute(&self, command: &str, body: serde_json::Value) -> Result<Vec<u8>> {
        let url = format!("{}/api/v1/{command}", self.config.base_url);
        tracing::debug!("namespace {command}: {body}");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GroveError::Transient(format!("{command} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("namespace {command} failed: {status} {message}");
            return Err(error_for_status(status, command, &message));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GroveError::Transient(format!("{command}: failed to read body: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn command<T: for<'de> Deserialize<'de>>(
        &self,
        command: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let bytes = self.execute(command, body).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| GroveError::Protocol(format!("{command}: undecodable response: {e}")))
    }

    async fn command_unit(&self, command: &str, body: serde_json::Value) -> Result<()> {
        self.execute(command, body).await?;
        Ok(())
    }
}

fn error_for_status(status: StatusCode, command: &str, message: &str) -> GroveError {
    let detail = if message.is_empty() {
        format!("{command}: {status}")
    } else {
        format!("{command}: {status}: {message}")
    };
    match status {
        StatusCode::NOT_FOUND => GroveError::NotFound(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GroveError::PermissionDenied(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            GroveError::Transient(detail)
        }
        status if status.is_server_error() => GroveError::Transient(detail),
        _ => GroveError::Protocol(detail),
    }
}

fn attr_body(value: &AttrValue) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| GroveError::Protocol(format!("unencodable attribute value: {e}")))
}

#[async_trait]
impl NamespaceService for HttpNamespaceService {
    async fn get(&self, path: &TreePath, attributes: &[String]) -> Result<NodeSnapshot> {
        self.command(
            "get",
            json!({
                "path": path,
                "attributes": attributes,
            }),
        )
        .await
    }

    async fn exists(&self, path: &TreePath) -> Result<bool> {
        let response: ExistsResponse = self.command("exists", json!({ "path": path })).await?;
        Ok(response.value)
    }

    async fn list(&self, path: &TreePath) -> Result<Vec<String>> {
        let response: ListResponse = self
            .command(
                "list",
                json!({
                    "path": path,
                    "max_size": self.config.max_list_size,
                }),
            )
            .await?;
        Ok(response.keys)
    }

    async fn set(&self, path: &TreePath, value: AttrValue) -> Result<()> {
        let value = attr_body(&value)?;
        self.command_unit("set", json!({ "path": path, "value": value }))
            .await
    }

    async fn create(
        &self,
        node_type: NodeType,
        path: &TreePath,
        options: &CreateOptions,
    ) -> Result<()> {
        let attributes = serde_json::to_value(&options.attributes)
            .map_err(|e| GroveError::Protocol(format!("unencodable attributes: {e}")))?;
        self.command_unit(
            "create",
            json!({
                "path": path,
                "type": node_type.as_str(),
                "recursive": options.recursive,
                "ignore_existing": options.ignore_existing,
                "attributes": attributes,
            }),
        )
        .await
    }

    async fn remove(&self, path: &TreePath, options: &RemoveOptions) -> Result<()> {
        self.command_unit(
            "remove",
            json!({
                "path": path,
                "recursive": options.recursive,
                "force": options.force,
            }),
        )
        .await
    }

    async fn copy(&self, source: &TreePath, destination: &TreePath) -> Result<()> {
        self.command_unit(
            "copy",
            json!({
                "source_path": source,
                "destination_path": destination,
            }),
        )
        .await
    }

    async fn move_node(&self, source: &TreePath, destination: &TreePath) -> Result<()> {
        self.command_unit(
            "move",
            json!({
                "source_path": source,
                "destination_path": destination,
            }),
        )
        .await
    }

    async fn link(
        &self,
        target: &TreePath,
        link_path: &TreePath,
        options: &LinkOptions,
    ) -> Result<()> {
        self.command_unit(
            "link",
            json!({
                "target_path": target,
                "link_path": link_path,
                "recursive": options.recursive,
                "ignore_existing": options.ignore_existing,
            }),
        )
        .await
    }

    async fn set_attribute(&self, path: &TreePath, name: &str, value: AttrValue) -> Result<()> {
        let value = attr_body(&value)?;
        self.command_unit(
            "set_attribute",
            json!({
                "path": path,
                "attribute": name,
                "value": value,
            }),
        )
        .await
    }
}
