use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use super::guard::{guarded, tool_failure};
use super::outcome::{NextNode, NodeOutcome};
use super::router::HandlerId;
use crate::error::BrainFlowError;
use crate::message::{Message, ToolCallRequest};
use crate::platform::DynPlatformApi;
use crate::schema::conform;
use crate::state::{ConversationState, StateUpdate};
use crate::tools::{ToolContext, ToolRegistry};

/// 工具执行节点
///
/// 对最后一条消息里的每个调用请求产出一条结果消息，顺序与请求一致；
/// 单个调用的失败只体现在它自己的结果里。
#[derive(Clone)]
pub struct ToolExecutionNode {
    platform: DynPlatformApi,
    timeout: Duration,
    parallel: bool,
}

impl ToolExecutionNode {
    pub fn new(platform: DynPlatformApi, timeout: Duration, parallel: bool) -> Self {
        Self {
            platform,
            timeout,
            parallel,
        }
    }

    /// `return_to` 为 `Some` 时回到原 Handler，否则结束本轮
    pub async fn run(
        &self,
        state: &ConversationState,
        tools: &ToolRegistry,
        return_to: Option<HandlerId>,
    ) -> NodeOutcome {
        let calls: Vec<ToolCallRequest> = state
            .last_message()
            .map(|message| message.tool_calls.clone())
            .unwrap_or_default();

        let ctx = ToolContext::new(
            state.credentials.clone(),
            self.platform.clone(),
            state.context.clone(),
        );

        let results = if self.parallel {
            join_all(calls.iter().map(|call| self.execute(call, tools, &ctx))).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                results.push(self.execute(call, tools, &ctx).await);
            }
            results
        };

        let update = StateUpdate::messages(results);
        match return_to {
            Some(handler) => NodeOutcome::Continue {
                update,
                next: NextNode::Handler(handler),
            },
            None => NodeOutcome::terminate(update),
        }
    }

    pub async fn execute(
        &self,
        call: &ToolCallRequest,
        tools: &ToolRegistry,
        ctx: &ToolContext,
    ) -> Message {
        let Some((tool, manifest)) = tools.lookup(&call.name) else {
            warn!(tool = %call.name, call_id = %call.id, "reasoning step requested an unknown tool");
            return tool_failure(call, &BrainFlowError::ToolNotRegistered(call.name.clone()));
        };

        let input = match conform(&manifest.input, call.arguments.clone()) {
            Ok(input) => input,
            Err(error) => {
                warn!(tool = %call.name, call_id = %call.id, %error, "tool arguments rejected");
                return tool_failure(call, &BrainFlowError::from(error));
            }
        };

        debug!(tool = %call.name, call_id = %call.id, "executing tool");
        match guarded(self.timeout, tool.call(input, ctx)).await {
            Ok(output) => Message::tool_success(call, output),
            Err(error) => {
                warn!(tool = %call.name, call_id = %call.id, %error, "tool failed");
                tool_failure(call, &error)
            }
        }
    }
}
