use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// 对话中的一条消息
///
/// 消息一经创建即不可变；节点只产出新消息，合并时按 `id` 判断身份。
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// 外部传入时可以省略，反序列化时生成
    #[serde(default = "uuid")]
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ToolResultStatus>,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            status: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        let mut message = Self::with_role(MessageRole::Assistant, content);
        message.tool_calls = calls;
        message
    }

    pub fn tool_success(call: &ToolCallRequest, content: impl Into<String>) -> Self {
        let mut message = Self::with_role(MessageRole::Tool, content);
        message.tool_call_id = Some(call.id.clone());
        message.name = Some(call.name.clone());
        message.status = Some(ToolResultStatus::Success);
        message
    }

    /// 工具失败结果：错误作为数据写入内容，而不是控制流
    pub fn tool_error(call: &ToolCallRequest, error: impl Into<String>) -> Self {
        let payload = json!({
            "error": error.into(),
            "tool": call.name,
        });
        let mut message = Self::with_role(MessageRole::Tool, payload.to_string());
        message.tool_call_id = Some(call.id.clone());
        message.name = Some(call.name.clone());
        message.status = Some(ToolResultStatus::Error);
        message
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn is_error_result(&self) -> bool {
        self.status == Some(ToolResultStatus::Error)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    System,
    Assistant,
    Tool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Success,
    Error,
}

/// 推理步骤发出的工具调用请求 (name, arguments, callId)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: format!("call-{}", uuid()),
            name: name.into(),
            arguments,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

pub fn uuid() -> String {
    ::uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_payload_is_json() {
        let call = ToolCallRequest::new("startDevbox", json!({"name": "dev-1"})).with_id("call-1");
        let message = Message::tool_error(&call, "connection refused");

        let payload: Value = serde_json::from_str(&message.content).unwrap();
        assert_eq!(payload["error"], "connection refused");
        assert_eq!(payload["tool"], "startDevbox");
        assert_eq!(message.tool_call_id.as_deref(), Some("call-1"));
        assert!(message.is_error_result());
    }

    #[test]
    fn missing_id_is_generated_on_deserialize() {
        let message: Message = serde_json::from_value(json!({"role": "user", "content": "hi"})).unwrap();
        assert!(!message.id.is_empty());
        assert_eq!(message.role, MessageRole::User);
    }

    #[test]
    fn fresh_messages_get_distinct_ids() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.id, b.id);
    }
}
