//! 统一的失败收敛：超时、错误与 panic 都变成数据

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use anyhow::anyhow;
use futures::FutureExt;

use crate::error::{BrainFlowError, Result};
use crate::message::{Message, ToolCallRequest};

/// 在超时与 panic 捕获下执行一个异步操作
///
/// 超时只是停止等待，已发出的外部调用不会被撤回。
pub async fn guarded<F, T>(timeout: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, AssertUnwindSafe(operation).catch_unwind()).await {
        Err(_) => Err(BrainFlowError::Timeout(timeout)),
        Ok(Err(payload)) => Err(BrainFlowError::Other(anyhow!(
            "panicked: {}",
            panic_message(payload.as_ref())
        ))),
        Ok(Ok(result)) => result,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handler 失败时给用户看的助手消息
pub fn handler_failure(label: &str, error: &BrainFlowError) -> Message {
    Message::assistant(format!("Error in {}: {}", label, error))
}

/// 工具失败时对应调用的结果消息
pub fn tool_failure(call: &ToolCallRequest, error: &BrainFlowError) -> Message {
    Message::tool_error(call, error.to_string())
}
