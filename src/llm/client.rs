use std::sync::Arc;

use async_trait::async_trait;

use super::types::ReasoningRequest;
use crate::error::Result;
use crate::message::Message;

/// 推理步骤：输入 prompt 与可调用工具，返回恰好一条助手消息
///
/// 返回的消息可以携带零个或多个工具调用请求。
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn invoke(&self, request: ReasoningRequest) -> Result<Message>;
}

pub type DynReasoningClient = Arc<dyn ReasoningClient>;
