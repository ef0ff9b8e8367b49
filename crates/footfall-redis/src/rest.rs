use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use footfall_core::error::StoreError;
use footfall_core::store::{KvStore, StoreValue};

/// Reply envelope of the REST command endpoint.
///
/// Successful commands carry `result`; rejected commands carry `error`.
#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<StoreValue>,
    #[serde(default)]
    error: Option<String>,
}

/// Authenticated client for an Upstash-style Redis REST endpoint.
///
/// One POST per command: bearer-token auth, the command as a JSON array of
/// string tokens, the decoded `result` back. No retries and no caching;
/// each caller owns its own degradation policy.
pub struct RestStore {
    http: reqwest::Client,
    url: Url,
    token: String,
}

impl RestStore {
    pub fn new(url: &str, token: impl Into<String>) -> Result<Self> {
        let url = Url::parse(url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            url,
            token: token.into(),
        })
    }
}

#[async_trait]
impl KvStore for RestStore {
    async fn execute(&self, command: &[&str]) -> Result<StoreValue> {
        let response = self
            .http
            .post(self.url.clone())
            .bearer_auth(&self.token)
            .json(&command)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Transport(format!("store responded with status {status}")).into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let reply: CommandReply = serde_json::from_slice(&body).map_err(StoreError::Decode)?;
        if let Some(error) = reply.error {
            return Err(StoreError::Rejected(error).into());
        }

        debug!(command = command.first().copied().unwrap_or(""), "store command ok");
        Ok(reply.result.unwrap_or(StoreValue::Nil))
    }
}
