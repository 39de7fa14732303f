// 推理步骤边界：请求类型、客户端接口与实现

mod client;
#[cfg(feature = "openai-client")]
mod openai;
mod scripted;
mod types;

pub use client::{DynReasoningClient, ReasoningClient};
#[cfg(feature = "openai-client")]
pub use openai::OpenAiClient;
pub use scripted::{ScriptStep, ScriptedClient};
pub use types::{ReasoningRequest, ResolvedModel};
