use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::guard::{guarded, handler_failure};
use super::outcome::{NodeOutcome, Topology};
use super::prompt::PromptBuilder;
use super::router::HandlerId;
use crate::config::ModelDefaults;
use crate::error::Result;
use crate::llm::{DynReasoningClient, ReasoningRequest, ResolvedModel};
use crate::message::{self, Message, MessageRole};
use crate::state::{ContextKind, ConversationState, StateUpdate};
use crate::tools::ToolRegistry;

/// 一个领域的静态描述：指令、上下文、工具集与拓扑
#[derive(Clone, Debug)]
pub struct DomainSpec {
    pub id: HandlerId,
    pub label: String,
    pub instruction: String,
    pub emphasis: Option<String>,
    pub context: Option<(ContextKind, String)>,
    pub tools: ToolRegistry,
    /// 按上下文的资源类型筛选绑定的工具
    pub filter_by_resource_kind: bool,
    pub topology: Topology,
}

impl DomainSpec {
    pub fn new(id: HandlerId, label: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            instruction: instruction.into(),
            emphasis: None,
            context: None,
            tools: ToolRegistry::new(),
            filter_by_resource_kind: false,
            topology: Topology::Terminate,
        }
    }

    pub fn with_emphasis(mut self, emphasis: impl Into<String>) -> Self {
        self.emphasis = Some(emphasis.into());
        self
    }

    pub fn with_context(mut self, kind: ContextKind, heading: impl Into<String>) -> Self {
        self.context = Some((kind, heading.into()));
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn filter_by_resource_kind(mut self) -> Self {
        self.filter_by_resource_kind = true;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }
}

/// Handler 节点：构建 prompt、调用推理步骤、决定下一步
///
/// 除推理调用外没有副作用；任何失败都变成 `Error in <label>: ...` 并结束本轮。
#[derive(Clone)]
pub struct HandlerNode {
    spec: Arc<DomainSpec>,
    client: DynReasoningClient,
    defaults: Arc<ModelDefaults>,
    timeout: Duration,
}

impl HandlerNode {
    pub fn new(
        spec: Arc<DomainSpec>,
        client: DynReasoningClient,
        defaults: Arc<ModelDefaults>,
        timeout: Duration,
    ) -> Self {
        Self {
            spec,
            client,
            defaults,
            timeout,
        }
    }

    pub fn spec(&self) -> &DomainSpec {
        &self.spec
    }

    /// 本轮绑定给推理步骤的工具切片，工具执行节点也只在这个切片里查找
    pub fn bound_tools(&self, state: &ConversationState) -> ToolRegistry {
        if self.spec.filter_by_resource_kind {
            self.spec.tools.select(state.context.resource_kind())
        } else {
            self.spec.tools.clone()
        }
    }

    pub async fn run(&self, state: &ConversationState) -> NodeOutcome {
        let tools = self.bound_tools(state);
        debug!(domain = %self.spec.id, tools = tools.len(), "handler node");

        match guarded(self.timeout, self.reason(state, &tools)).await {
            Ok(reply) if reply.has_tool_calls() => {
                debug!(domain = %self.spec.id, calls = reply.tool_calls.len(), "reasoning step requested tools");
                NodeOutcome::to_tools(StateUpdate::message(reply))
            }
            Ok(reply) => NodeOutcome::terminate(StateUpdate::message(reply)),
            Err(error) => {
                warn!(domain = %self.spec.id, %error, "handler failed");
                NodeOutcome::terminate(StateUpdate::message(handler_failure(
                    &self.spec.label,
                    &error,
                )))
            }
        }
    }

    async fn reason(&self, state: &ConversationState, tools: &ToolRegistry) -> Result<Message> {
        let model = ResolvedModel::resolve(&state.model, &self.defaults)?;
        let prompt = PromptBuilder::new(&self.spec.instruction)
            .emphasis(self.spec.emphasis.as_deref())
            .context(
                self.spec.context.as_ref().map(|(kind, _)| *kind),
                self.spec
                    .context
                    .as_ref()
                    .map(|(_, heading)| heading.as_str())
                    .unwrap_or_default(),
            )
            .build(state)?;

        let request = ReasoningRequest::new(prompt, tools.specs(), model);
        let reply = self.client.invoke(request).await?;
        Ok(normalize(reply, &state.messages))
    }
}

/// 推理客户端返回的消息统一成带 id 的助手消息
///
/// 与日志中已有消息或调用重复的 id 会换成新的，否则 reducer 会原位替换旧消息，
/// 新的调用请求就不会被执行。
fn normalize(mut reply: Message, history: &[Message]) -> Message {
    reply.role = MessageRole::Assistant;
    if reply.id.is_empty() || history.iter().any(|m| m.id == reply.id) {
        reply.id = message::uuid();
    }
    for call in &mut reply.tool_calls {
        let seen = history
            .iter()
            .flat_map(|m| m.tool_calls.iter())
            .any(|earlier| earlier.id == call.id);
        if call.id.is_empty() || seen {
            call.id = format!("call-{}", message::uuid());
        }
    }
    reply
}
