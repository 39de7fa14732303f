use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{HttpMethod, PlatformApi, PlatformAuth, PlatformRequest};
use crate::error::{BrainFlowError, Result};

/// 区域平台服务的 HTTP 客户端，进程内构造一次后共享
#[derive(Clone)]
pub struct HttpPlatformClient {
    client: reqwest::Client,
}

impl HttpPlatformClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BrainFlowError::Config(format!("failed to build platform client: {e}")))?;
        Ok(Self { client })
    }

    fn endpoint(&self, auth: &PlatformAuth, request: &PlatformRequest) -> Result<String> {
        let region = auth.region_host()?;
        Ok(format!(
            "http://{}.{}/api{}",
            request.kind.subdomain(),
            region,
            request.path
        ))
    }
}

fn query_pairs(query: &Value) -> Vec<(String, String)> {
    query
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| {
                    let text = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), text)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated, {} bytes)", &text[..end], text.len())
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    #[instrument(skip(self, auth, request), fields(kind = %request.kind, path = %request.path))]
    async fn send(&self, auth: &PlatformAuth, request: PlatformRequest) -> Result<Value> {
        let url = self.endpoint(auth, &request)?;

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Patch => self.client.patch(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        // 平台以 URI 编码后的 kubeconfig 作为授权头
        builder = builder
            .header("Authorization", urlencoding::encode(auth.kubeconfig()).into_owned())
            .header("Content-Type", "application/json");

        if let Some(query) = &request.query {
            builder = builder.query(&query_pairs(query));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BrainFlowError::Other(anyhow::anyhow!("platform request error: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BrainFlowError::Other(anyhow::anyhow!("failed to read response: {}", e)))?;
        debug!(status = status.as_u16(), bytes = text.len(), "platform response");

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|payload| {
                    payload
                        .get("message")
                        .or_else(|| payload.get("error"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| truncate(&text, 500));
            return Err(BrainFlowError::Platform {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let payload: Value = serde_json::from_str(&text).map_err(|e| {
            BrainFlowError::Serialization(format!(
                "platform response parse error: {}: {}",
                e,
                truncate(&text, 500)
            ))
        })?;

        Ok(match payload {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        })
    }
}
