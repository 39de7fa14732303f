use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use brainflow::flow::constants::{labels, prompt, TURN_LIMIT_REACHED};
use brainflow::llm::ScriptStep;
use brainflow::message::ToolResultStatus;
use brainflow::state::ResourceContext;
use brainflow::tools::ToolContext;
use brainflow::{
    BrainFlowError, ConversationState, DomainContext, DomainSpec, EngineConfig, HandlerId,
    Message, MessageRole, ModelConfig, ModelDefaults, ScriptedClient, Tool, ToolCallRequest,
    ToolManifest, ToolRegistry, Topology, WorkflowGraph,
};
use serde_json::{json, Value};

struct CountingTool {
    name: &'static str,
    output: &'static str,
    calls: Arc<AtomicUsize>,
}

impl CountingTool {
    fn new(name: &'static str, output: &'static str) -> Self {
        Self {
            name,
            output,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Tool for CountingTool {
    fn name(&self) -> &str {
        self.name
    }

    async fn call(&self, _input: Value, _ctx: &ToolContext) -> brainflow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.to_string())
    }
}

fn model() -> ModelConfig {
    ModelConfig::new("http://localhost:8080/v1", "sk-test", "test-model")
}

fn turn(route: &str, input: &str) -> ConversationState {
    ConversationState::new(route, input)
        .with_model(model())
        .with_credentials("kubeconfig")
}

fn graph(client: &ScriptedClient) -> brainflow::Result<WorkflowGraph> {
    WorkflowGraph::builder()
        .client(Arc::new(client.clone()))
        .defaults(ModelDefaults::default())
        .build()
}

fn registry_with(tool: CountingTool) -> anyhow::Result<(ToolRegistry, Arc<AtomicUsize>)> {
    let calls = Arc::clone(&tool.calls);
    let manifest = ToolManifest::builder(tool.name).build();
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(tool), manifest)?;
    Ok((registry, calls))
}

#[tokio::test]
async fn resource_turn_runs_one_tool_round() -> anyhow::Result<()> {
    let (tools, calls) = registry_with(CountingTool::new("start", "started"))?;
    let spec = DomainSpec::new(HandlerId::ResourceOps, labels::RESOURCE, prompt::RESOURCE)
        .with_tools(tools)
        .filter_by_resource_kind();

    let reply = Message::assistant_with_calls(
        "",
        vec![ToolCallRequest::new("start", json!({"name": "db-1"}))],
    );
    let client = ScriptedClient::replying(reply.clone());
    let graph = WorkflowGraph::builder()
        .client(Arc::new(client.clone()))
        .defaults(ModelDefaults::default())
        .domain(spec)
        .build()?;

    let state = turn("resource-ops", "start db-1").with_context(DomainContext::Resource(
        ResourceContext::new("db-1").with_status("paused"),
    ));
    let user = state.messages[0].clone();

    let messages = graph.run_turn(state).await?;

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], user);
    assert_eq!(messages[1].id, reply.id);
    assert_eq!(messages[1].tool_calls, reply.tool_calls);
    assert_eq!(messages[2].role, MessageRole::Tool);
    assert_eq!(messages[2].status, Some(ToolResultStatus::Success));
    assert_eq!(messages[2].tool_call_id.as_deref(), Some(reply.tool_calls[0].id.as_str()));
    assert!(messages[2].content.contains("started"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_route_returns_input_unchanged() -> anyhow::Result<()> {
    let client = ScriptedClient::default();
    let graph = graph(&client)?;

    let state = turn("unknown-domain", "hello");
    let input = state.messages.clone();

    let messages = graph.run_turn(state).await?;
    assert_eq!(messages, input);
    assert_eq!(client.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn missing_route_is_silent_termination() -> anyhow::Result<()> {
    let client = ScriptedClient::default();
    let graph = graph(&client)?;

    let mut state = turn("", "hello");
    state.route = None;
    let input = state.messages.clone();

    assert_eq!(graph.run_turn(state).await?, input);
    Ok(())
}

#[tokio::test]
async fn proposal_without_tool_calls_never_executes_tools() -> anyhow::Result<()> {
    let (tools, calls) = registry_with(CountingTool::new("deploy", "deployed"))?;
    let spec = DomainSpec::new(HandlerId::DeploymentProposal, labels::PROPOSAL, prompt::PROPOSAL)
        .with_tools(tools);
    let client = ScriptedClient::replying(Message::assistant("Proposal ready"));
    let graph = WorkflowGraph::builder()
        .client(Arc::new(client.clone()))
        .defaults(ModelDefaults::default())
        .domain(spec)
        .build()?;

    let state = turn("deployment-proposal", "plan my deployment");
    let input = state.messages.clone();

    let messages = graph.run_turn(state).await?;
    assert_eq!(messages.len(), input.len() + 1);
    assert_eq!(&messages[..input.len()], input.as_slice());
    let last = messages.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert!(last.content.contains("Proposal ready"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn reasoning_failure_becomes_domain_error_message() -> anyhow::Result<()> {
    let client = ScriptedClient::failing("upstream returned 502");
    let graph = graph(&client)?;

    let messages = graph.run_turn(turn("cluster-ops", "list my databases")).await?;

    assert_eq!(messages.len(), 2);
    let last = messages.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert!(last.content.starts_with("Error in cluster deployment: "));
    assert!(last.content.contains("upstream returned 502"));
    Ok(())
}

#[tokio::test]
async fn reasoning_panic_is_contained() -> anyhow::Result<()> {
    let client = ScriptedClient::new([ScriptStep::Panic("model adapter bug".into())]);
    let graph = graph(&client)?;

    let messages = graph.run_turn(turn("environment-ops", "start my devbox")).await?;

    let last = messages.last().unwrap();
    assert!(last.content.starts_with("Error in devbox deployment: "));
    assert!(last.content.contains("panicked"));
    Ok(())
}

#[tokio::test]
async fn reasoning_timeout_is_contained() -> anyhow::Result<()> {
    let client = ScriptedClient::new([ScriptStep::Delay(
        Duration::from_secs(5),
        Box::new(ScriptStep::Reply(Message::assistant("too late"))),
    )]);
    let config = EngineConfig {
        reasoning_timeout_ms: 20,
        ..EngineConfig::default()
    };
    let graph = WorkflowGraph::builder()
        .client(Arc::new(client.clone()))
        .defaults(ModelDefaults::default())
        .config(config)
        .build()?;

    let messages = graph.run_turn(turn("launchpad-ops", "show my app")).await?;

    let last = messages.last().unwrap();
    assert!(last.content.starts_with("Error in launchpad deployment: "));
    assert!(last.content.contains("timed out"));
    Ok(())
}

#[tokio::test]
async fn missing_model_settings_surface_as_handler_error() -> anyhow::Result<()> {
    let client = ScriptedClient::replying(Message::assistant("unreachable"));
    let graph = graph(&client)?;

    let state = ConversationState::new("project-overview", "what is in my project?");
    let messages = graph.run_turn(state).await?;

    let last = messages.last().unwrap();
    assert!(last.content.starts_with("Error in project management: "));
    assert!(last.content.contains("baseURL is required"));
    assert_eq!(client.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn trial_flag_substitutes_process_key() -> anyhow::Result<()> {
    let client = ScriptedClient::replying(Message::assistant("hello"));
    let graph = WorkflowGraph::builder()
        .client(Arc::new(client.clone()))
        .defaults(ModelDefaults::default().with_trial_key("sk-trial"))
        .build()?;

    let state = ConversationState::new("project-overview", "hi")
        .with_model(ModelConfig::new("http://localhost:8080/v1", "", "test-model").trial(true));
    graph.run_turn(state).await?;

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model.api_key, "sk-trial");
    Ok(())
}

#[tokio::test]
async fn looping_domain_stops_at_round_trip_cap() -> anyhow::Result<()> {
    let (tools, calls) = registry_with(CountingTool::new("ping", "ok"))?;
    let spec = DomainSpec::new(HandlerId::ClusterOps, labels::CLUSTER, prompt::CLUSTER)
        .with_tools(tools)
        .with_topology(Topology::Loop { max_round_trips: 3 });

    let client = ScriptedClient::default().with_fallback(Message::assistant_with_calls(
        "",
        vec![ToolCallRequest::new("ping", json!({}))],
    ));
    let graph = WorkflowGraph::builder()
        .client(Arc::new(client.clone()))
        .defaults(ModelDefaults::default())
        .domain(spec)
        .build()?;

    let messages = graph.run_turn(turn("cluster-ops", "keep probing")).await?;

    assert_eq!(client.calls(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // user + 3 × (assistant + tool result) + limit
    assert_eq!(messages.len(), 8);
    let last = messages.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert!(last.content.contains(TURN_LIMIT_REACHED));
    Ok(())
}

#[tokio::test]
async fn looping_domain_ends_when_reasoning_stops_calling_tools() -> anyhow::Result<()> {
    let (tools, calls) = registry_with(CountingTool::new("ping", "ok"))?;
    let spec = DomainSpec::new(HandlerId::ClusterOps, labels::CLUSTER, prompt::CLUSTER)
        .with_tools(tools);
    let config = EngineConfig::from_json_str(
        r#"{"domains": {"cluster-ops": {"topology": "loop", "max_round_trips": 5}}}"#,
    )?;

    let client = ScriptedClient::new([
        Message::assistant_with_calls("", vec![ToolCallRequest::new("ping", json!({}))]),
        Message::assistant("all healthy"),
    ]);
    let graph = WorkflowGraph::builder()
        .client(Arc::new(client.clone()))
        .defaults(ModelDefaults::default())
        .config(config)
        .domain(spec)
        .build()?;

    let messages = graph.run_turn(turn("cluster-ops", "check")).await?;

    assert_eq!(client.calls(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(messages.len(), 4);
    assert_eq!(messages.last().unwrap().content, "all healthy");

    // 第二次推理能看到工具结果
    let second = &client.requests()[1];
    assert!(second
        .messages
        .iter()
        .any(|message| message.role == MessageRole::Tool && message.content == "ok"));
    Ok(())
}

#[tokio::test]
async fn unregistered_domain_is_a_hard_error() -> anyhow::Result<()> {
    let client = ScriptedClient::default();
    let graph = WorkflowGraph::builder()
        .client(Arc::new(client))
        .defaults(ModelDefaults::default())
        .without_builtin_domains()
        .build()?;

    let error = graph
        .run_turn(turn("cluster-ops", "list"))
        .await
        .unwrap_err();
    assert!(matches!(error, BrainFlowError::UnregisteredDomain(ref id) if id == "cluster-ops"));
    Ok(())
}

#[tokio::test]
async fn handler_prompt_carries_instruction_context_and_tools() -> anyhow::Result<()> {
    let client = ScriptedClient::replying(Message::assistant("done"));
    let graph = graph(&client)?;

    let state = turn("cluster-ops", "how is my database?").with_context(
        serde_json::from_value(json!({"domain": "cluster", "name": "pg-main", "status": "Running"}))?,
    );
    graph.run_turn(state).await?;

    let request = &client.requests()[0];
    assert_eq!(request.messages[0].role, MessageRole::System);
    assert_eq!(request.messages[0].content, prompt::CLUSTER);
    assert!(request
        .messages
        .iter()
        .any(|message| message.content.starts_with("Cluster Context:") && message.content.contains("pg-main")));
    assert_eq!(request.messages.last().unwrap().content, "how is my database?");
    assert_eq!(request.tools.len(), 16);
    assert!(request.tool_names().contains(&"createCluster"));
    Ok(())
}

#[tokio::test]
async fn concurrent_turns_are_independent() -> anyhow::Result<()> {
    let client = ScriptedClient::default().with_fallback(Message::assistant("ack"));
    let graph = graph(&client)?;

    let turns = (0..8).map(|i| {
        let graph = graph.clone();
        tokio::spawn(async move { graph.run_turn(turn("project-overview", &format!("turn {i}"))).await })
    });
    for (i, handle) in futures::future::join_all(turns).await.into_iter().enumerate() {
        let messages = handle??;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, format!("turn {i}"));
        assert_eq!(messages[1].content, "ack");
    }
    Ok(())
}

#[tokio::test]
async fn repeated_reply_id_still_gets_its_calls_executed() -> anyhow::Result<()> {
    let (tools, calls) = registry_with(CountingTool::new("ping", "ok"))?;
    let spec = DomainSpec::new(HandlerId::ClusterOps, labels::CLUSTER, prompt::CLUSTER)
        .with_tools(tools)
        .with_topology(Topology::Loop { max_round_trips: 3 });

    let reply = Message::assistant_with_calls("", vec![ToolCallRequest::new("ping", json!({}))]);
    let client = ScriptedClient::new([reply.clone(), reply.clone(), Message::assistant("done")]);
    let graph = WorkflowGraph::builder()
        .client(Arc::new(client.clone()))
        .defaults(ModelDefaults::default())
        .domain(spec)
        .build()?;

    let messages = graph.run_turn(turn("cluster-ops", "ping twice")).await?;

    assert_eq!(client.calls(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    // user + 2 × (assistant + tool result) + done
    assert_eq!(messages.len(), 6);
    let requested: Vec<_> = messages
        .iter()
        .flat_map(|m| m.tool_calls.iter().map(|c| c.id.clone()))
        .collect();
    let answered: Vec<_> = messages.iter().filter_map(|m| m.tool_call_id.clone()).collect();
    assert_eq!(requested.len(), 2);
    assert_eq!(requested, answered);
    assert_eq!(messages.last().unwrap().content, "done");
    Ok(())
}
