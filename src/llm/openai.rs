use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;

use super::client::ReasoningClient;
use super::types::ReasoningRequest;
use crate::error::{BrainFlowError, Result};
use crate::message::{Message, MessageRole, ToolCallRequest};

/// OpenAI 兼容的 chat/completions 客户端
///
/// 端点与密钥来自每次请求中的 `ResolvedModel`，同一个客户端可以服务所有对话。
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    parallel_tool_calls: bool,
}

impl OpenAiClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| BrainFlowError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            parallel_tool_calls: true,
        })
    }

    pub fn with_parallel_tool_calls(mut self, enabled: bool) -> Self {
        self.parallel_tool_calls = enabled;
        self
    }

    fn endpoint(base_url: &str) -> String {
        if base_url.contains("/chat/completions") {
            base_url.to_string()
        } else {
            format!("{}/chat/completions", base_url.trim_end_matches('/'))
        }
    }

    fn body(&self, request: &ReasoningRequest) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(wire_message).collect();
        let mut body = json!({
            "model": request.model.model_name,
            "messages": messages,
        });
        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = json!(tools);
            body["parallel_tool_calls"] = json!(self.parallel_tool_calls);
        }
        body
    }
}

fn wire_message(message: &Message) -> Value {
    match message.role {
        MessageRole::System => json!({"role": "system", "content": message.content}),
        MessageRole::User => json!({"role": "user", "content": message.content}),
        MessageRole::Assistant if message.has_tool_calls() => {
            let calls: Vec<Value> = message
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            json!({"role": "assistant", "content": message.content, "tool_calls": calls})
        }
        MessageRole::Assistant => json!({"role": "assistant", "content": message.content}),
        MessageRole::Tool => json!({
            "role": "tool",
            "content": message.content,
            "tool_call_id": message.tool_call_id,
        }),
    }
}

/// 解析 `choices[0].message`；参数不是合法 JSON 时原样保留为字符串，交给 Schema 校验报错
fn parse_reply(payload: &Value) -> Result<Message> {
    let reply = payload["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .filter(|m| m.is_object())
        .ok_or_else(|| BrainFlowError::Reasoning("response has no choices".into()))?;

    let content = reply["content"].as_str().unwrap_or_default();
    let calls: Vec<ToolCallRequest> = reply["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .map(|call| {
                    let function = &call["function"];
                    let raw = function["arguments"].as_str().unwrap_or("{}");
                    let arguments = serde_json::from_str(raw)
                        .unwrap_or_else(|_| Value::String(raw.to_string()));
                    let request = ToolCallRequest::new(
                        function["name"].as_str().unwrap_or_default(),
                        arguments,
                    );
                    match call["id"].as_str() {
                        Some(id) if !id.is_empty() => request.with_id(id),
                        _ => request,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Message::assistant_with_calls(content, calls))
}

#[async_trait]
impl ReasoningClient for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %request.model.model_name, tools = request.tools.len()))]
    async fn invoke(&self, request: ReasoningRequest) -> Result<Message> {
        let url = Self::endpoint(&request.model.base_url);
        let body = self.body(&request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&request.model.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BrainFlowError::Reasoning(format!("HTTP request error: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BrainFlowError::Reasoning(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let snippet: String = text.chars().take(500).collect();
            return Err(BrainFlowError::Reasoning(format!(
                "request failed with status {status}: {snippet}"
            )));
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| BrainFlowError::Reasoning(format!("response parse error: {e}")))?;
        parse_reply(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tool_calls_with_string_arguments() {
        let payload = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "getCluster", "arguments": "{\"databaseName\":\"pg\"}"}
                    }]
                }
            }]
        });
        let message = parse_reply(&payload).unwrap();
        assert_eq!(message.content, "");
        assert_eq!(message.tool_calls[0].id, "call_1");
        assert_eq!(message.tool_calls[0].arguments, json!({"databaseName": "pg"}));
    }

    #[test]
    fn tool_results_carry_their_call_id() {
        let call = ToolCallRequest::new("listClusters", json!({})).with_id("call_9");
        let wire = wire_message(&Message::tool_success(&call, "[]"));
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_9");
    }

    #[test]
    fn endpoint_appends_completions_path() {
        assert_eq!(
            OpenAiClient::endpoint("https://api.example.com/v1/"),
            "https://api.example.com/v1/chat/completions"
        );
    }
}
