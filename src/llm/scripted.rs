use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::ReasoningClient;
use super::types::ReasoningRequest;
use crate::error::{BrainFlowError, Result};
use crate::message::{self, Message, ToolCallRequest};

/// 脚本中的一步
#[derive(Clone, Debug)]
pub enum ScriptStep {
    Reply(Message),
    Fail(String),
    Panic(String),
    /// 等待后再执行内层步骤，用于触发超时
    Delay(Duration, Box<ScriptStep>),
}

impl From<Message> for ScriptStep {
    fn from(message: Message) -> Self {
        ScriptStep::Reply(message)
    }
}

#[derive(Default)]
struct ScriptState {
    steps: VecDeque<ScriptStep>,
    fallback: Option<ScriptStep>,
    requests: Vec<ReasoningRequest>,
}

/// 按脚本返回消息的推理客户端，记录收到的每个请求
///
/// 脚本耗尽后若设置了兜底步骤则重复使用它，每次都会换上新的消息与调用 id。
#[derive(Clone, Default)]
pub struct ScriptedClient {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedClient {
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ScriptStep>,
    {
        let client = Self::default();
        client.state.lock().steps = steps.into_iter().map(Into::into).collect();
        client
    }

    pub fn replying(message: Message) -> Self {
        Self::new([message])
    }

    pub fn failing(error: impl Into<String>) -> Self {
        Self::new([ScriptStep::Fail(error.into())])
    }

    pub fn with_fallback(self, step: impl Into<ScriptStep>) -> Self {
        self.state.lock().fallback = Some(step.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.state.lock().requests.clone()
    }

    fn next_step(&self, request: ReasoningRequest) -> Option<ScriptStep> {
        let mut state = self.state.lock();
        state.requests.push(request);
        match state.steps.pop_front() {
            Some(step) => Some(step),
            None => state.fallback.clone().map(refresh_ids),
        }
    }
}

fn refresh_ids(step: ScriptStep) -> ScriptStep {
    match step {
        ScriptStep::Reply(mut reply) => {
            reply.id = message::uuid();
            for call in &mut reply.tool_calls {
                *call = ToolCallRequest::new(call.name.clone(), call.arguments.clone());
            }
            ScriptStep::Reply(reply)
        }
        ScriptStep::Delay(delay, inner) => ScriptStep::Delay(delay, Box::new(refresh_ids(*inner))),
        other => other,
    }
}

async fn play(step: ScriptStep) -> Result<Message> {
    let mut step = step;
    loop {
        match step {
            ScriptStep::Reply(message) => return Ok(message),
            ScriptStep::Fail(error) => return Err(BrainFlowError::Reasoning(error)),
            ScriptStep::Panic(reason) => panic!("{}", reason),
            ScriptStep::Delay(delay, inner) => {
                tokio::time::sleep(delay).await;
                step = *inner;
            }
        }
    }
}

#[async_trait]
impl ReasoningClient for ScriptedClient {
    async fn invoke(&self, request: ReasoningRequest) -> Result<Message> {
        match self.next_step(request) {
            Some(step) => play(step).await,
            None => Err(BrainFlowError::Reasoning("script exhausted".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ResolvedModel;
    use serde_json::json;

    fn request() -> ReasoningRequest {
        ReasoningRequest::new(
            vec![Message::user("hi")],
            Vec::new(),
            ResolvedModel {
                base_url: "http://localhost".into(),
                api_key: "k".into(),
                model_name: "m".into(),
            },
        )
    }

    #[tokio::test]
    async fn fallback_replies_get_fresh_ids() {
        let client = ScriptedClient::default().with_fallback(Message::assistant_with_calls(
            "",
            vec![ToolCallRequest::new("listClusters", json!({}))],
        ));

        let first = client.invoke(request()).await.unwrap();
        let second = client.invoke(request()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.tool_calls[0].id, second.tool_calls[0].id);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_is_an_error() {
        let client = ScriptedClient::new(Vec::<ScriptStep>::new());
        assert!(client.invoke(request()).await.is_err());
    }
}
