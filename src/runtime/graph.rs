use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::{EngineConfig, ModelDefaults};
use crate::error::{BrainFlowError, Result};
use crate::flow::constants::TURN_LIMIT_REACHED;
use crate::flow::domains;
use crate::flow::{
    route, DomainSpec, HandlerId, HandlerNode, NextNode, Route, ToolExecutionNode, Topology,
};
use crate::llm::DynReasoningClient;
use crate::message::Message;
use crate::platform::{DynPlatformApi, UnconfiguredPlatform};
use crate::state::{ConversationState, StateUpdate};

/// 工作流图：Router → Handler → [工具执行] → 结束
///
/// 构建后只读，可以在多个并发的对话轮次之间共享。
#[derive(Clone)]
pub struct WorkflowGraph {
    handlers: BTreeMap<HandlerId, HandlerNode>,
    tool_node: ToolExecutionNode,
}

impl std::fmt::Debug for WorkflowGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowGraph")
            .field("routes", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl WorkflowGraph {
    pub fn builder() -> WorkflowGraphBuilder {
        WorkflowGraphBuilder::new()
    }

    /// 已注册 Handler 的路由
    pub fn routes(&self) -> Vec<HandlerId> {
        self.handlers.keys().copied().collect()
    }

    pub fn topology(&self, id: HandlerId) -> Option<Topology> {
        self.handlers.get(&id).map(|handler| handler.spec().topology)
    }

    pub fn domain(&self, id: HandlerId) -> Option<&DomainSpec> {
        self.handlers.get(&id).map(|handler| handler.spec())
    }

    /// 执行一轮对话，返回最终的消息序列
    ///
    /// 推理与工具的失败都已变成消息；只有未注册的领域和畸形的部分结果会返回 `Err`。
    #[instrument(skip(self, state), fields(route = state.route.as_deref().unwrap_or("-")))]
    pub async fn run_turn(&self, mut state: ConversationState) -> Result<Vec<Message>> {
        let id = match route(&state) {
            Route::Terminate => {
                info!(messages = state.messages.len(), "no handler for route, turn ends");
                return Ok(state.messages);
            }
            Route::Handler(id) => id,
        };

        let handler = self
            .handlers
            .get(&id)
            .ok_or_else(|| BrainFlowError::UnregisteredDomain(id.to_string()))?;
        let topology = handler.spec().topology;
        info!(domain = %id, ?topology, "turn started");

        let mut round_trips = 0u32;
        loop {
            let (update, next) = handler.run(&state).await.into_parts();
            state.apply(update)?;

            match next {
                None => break,
                Some(NextNode::Handler(other)) => {
                    // Handler 只会转向工具执行节点
                    warn!(domain = %id, next = %other, "handler requested a handler transition");
                    break;
                }
                Some(NextNode::ToolExecution) => {}
            }

            let tools = handler.bound_tools(&state);
            let return_to = match topology {
                Topology::Terminate => None,
                Topology::Loop { .. } => Some(id),
            };
            let (update, next) = self.tool_node.run(&state, &tools, return_to).await.into_parts();
            state.apply(update)?;

            let Topology::Loop { max_round_trips } = topology else {
                break;
            };
            if next.is_none() {
                break;
            }

            round_trips += 1;
            debug!(domain = %id, round_trips, max_round_trips, "tool round finished");
            if round_trips >= max_round_trips {
                warn!(domain = %id, round_trips, "round-trip cap reached, forcing termination");
                state.apply(StateUpdate::message(Message::assistant(format!(
                    "{TURN_LIMIT_REACHED}: {id} stopped after {round_trips} tool round trips"
                ))))?;
                break;
            }
        }

        info!(domain = %id, messages = state.messages.len(), "turn finished");
        Ok(state.messages)
    }
}

/// 工作流图构建器
///
/// 默认注册全部内置领域；`domain` 注册的领域会替换同一路由的内置领域。
pub struct WorkflowGraphBuilder {
    client: Option<DynReasoningClient>,
    platform: DynPlatformApi,
    config: EngineConfig,
    defaults: Option<ModelDefaults>,
    builtin: bool,
    domains: Vec<DomainSpec>,
}

impl Default for WorkflowGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowGraphBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            platform: Arc::new(UnconfiguredPlatform),
            config: EngineConfig::default(),
            defaults: None,
            builtin: true,
            domains: Vec::new(),
        }
    }

    pub fn client(mut self, client: DynReasoningClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn platform(mut self, platform: DynPlatformApi) -> Self {
        self.platform = platform;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 不传时读取进程级环境变量
    pub fn defaults(mut self, defaults: ModelDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn domain(mut self, spec: DomainSpec) -> Self {
        self.domains.push(spec);
        self
    }

    pub fn without_builtin_domains(mut self) -> Self {
        self.builtin = false;
        self
    }

    pub fn build(self) -> Result<WorkflowGraph> {
        self.config.validate()?;
        let client = self
            .client
            .ok_or_else(|| BrainFlowError::Config("a reasoning client is required".into()))?;
        let defaults = Arc::new(
            self.defaults
                .unwrap_or_else(|| ModelDefaults::global().clone()),
        );

        let mut specs: BTreeMap<HandlerId, DomainSpec> = BTreeMap::new();
        if self.builtin {
            for spec in domains::builtin_all()? {
                specs.insert(spec.id, spec);
            }
        }
        for spec in self.domains {
            specs.insert(spec.id, spec);
        }

        let handlers = specs
            .into_iter()
            .map(|(id, mut spec)| {
                if let Some(topology) = self.config.topology_for(id) {
                    spec.topology = topology;
                }
                debug!(domain = %id, tools = spec.tools.len(), topology = ?spec.topology, "domain registered");
                let handler = HandlerNode::new(
                    Arc::new(spec),
                    client.clone(),
                    defaults.clone(),
                    self.config.reasoning_timeout(),
                );
                (id, handler)
            })
            .collect();

        Ok(WorkflowGraph {
            handlers,
            tool_node: ToolExecutionNode::new(
                self.platform,
                self.config.tool_timeout(),
                self.config.parallel_tool_calls,
            ),
        })
    }
}
