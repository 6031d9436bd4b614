// src/services/backend_client.rs
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::ClientError, message::ChatRequest};

/// Outbound side of the widget: posts one request, returns the decoded body.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn post(&self, request: &ChatRequest) -> Result<Value, ClientError>;
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn post(&self, request: &ChatRequest) -> Result<Value, ClientError> {
        let transport = |source: reqwest::Error| ClientError::Transport { url: self.url.clone(), source };

        // `.json()` sets Content-Type: application/json
        let res = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        // The status is not checked: error bodies carry JSON too.
        let status = res.status();
        let body = res.text().await.map_err(transport)?;
        debug!(%status, bytes = body.len(), url = %self.url, "chat endpoint answered");

        serde_json::from_str(&body).map_err(|e| {
            warn!(%status, error = %e, "chat endpoint returned a non-JSON body");
            ClientError::from(e)
        })
    }
}
