use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use brainflow::flow::{domains, HandlerId};
use brainflow::llm::{DynReasoningClient, ScriptedClient};
use brainflow::platform::DynPlatformApi;
use brainflow::utils::LoggingConfig;
use brainflow::{ConversationState, EngineConfig, Message, WorkflowGraph};
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(name = "brainflow", version, about = "BrainFlow CLI", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 执行一轮对话并输出最终消息
    Run {
        #[arg(long)]
        state: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// 预置的助手回复（JSON 数组），替代真实的推理调用
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// 输出各领域绑定的工具
    Tools {
        #[arg(long)]
        domain: Option<String>,
    },
    /// 输出已知路由及其拓扑
    Routes {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            state,
            config,
            script,
        } => handle_run(&state, config.as_deref(), script.as_deref()).await?,
        Command::Tools { domain } => handle_tools(domain)?,
        Command::Routes { config } => handle_routes(config.as_deref())?,
    }
    Ok(())
}

async fn handle_run(
    state_path: &Path,
    config: Option<&Path>,
    script: Option<&Path>,
) -> anyhow::Result<()> {
    let text = fs::read_to_string(state_path)
        .with_context(|| format!("cannot read state file `{}`", state_path.display()))?;
    let state: ConversationState =
        serde_json::from_str(&text).context("state file is not a conversation state")?;

    let config = load_config(config)?;
    let client = reasoning_client(script, &config)?;

    let graph = WorkflowGraph::builder()
        .client(client)
        .platform(platform_client()?)
        .config(config)
        .build()?;

    let messages = graph.run_turn(state).await?;
    println!("{}", serde_json::to_string_pretty(&messages)?);
    Ok(())
}

fn handle_tools(domain: Option<String>) -> anyhow::Result<()> {
    let ids = match domain {
        Some(name) => match HandlerId::parse(&name) {
            Some(id) => vec![id],
            None => bail!("unknown route id `{name}`"),
        },
        None => HandlerId::ALL.to_vec(),
    };

    let mut output = serde_json::Map::new();
    for id in ids {
        let spec = domains::builtin(id)?;
        output.insert(id.to_string(), json!(spec.tools.specs()));
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn handle_routes(config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let graph = WorkflowGraph::builder()
        .client(Arc::new(ScriptedClient::default()))
        .config(config)
        .build()?;

    println!("{:<24} {:<24} {}", "Route", "Label", "Topology");
    for id in graph.routes() {
        let Some(spec) = graph.domain(id) else {
            continue;
        };
        println!(
            "{:<24} {:<24} {}",
            id,
            spec.label,
            serde_json::to_string(&spec.topology)?
        );
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    Ok(match path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    })
}

fn load_script(path: &Path) -> anyhow::Result<ScriptedClient> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read script file `{}`", path.display()))?;
    let replies: Vec<Message> =
        serde_json::from_str(&text).context("script must be a JSON array of messages")?;
    Ok(ScriptedClient::new(replies))
}

#[cfg(feature = "openai-client")]
fn reasoning_client(
    script: Option<&Path>,
    config: &EngineConfig,
) -> anyhow::Result<DynReasoningClient> {
    if let Some(path) = script {
        return Ok(Arc::new(load_script(path)?));
    }
    let client = brainflow::llm::OpenAiClient::new()?
        .with_parallel_tool_calls(config.parallel_tool_calls);
    Ok(Arc::new(client))
}

#[cfg(not(feature = "openai-client"))]
fn reasoning_client(
    script: Option<&Path>,
    _config: &EngineConfig,
) -> anyhow::Result<DynReasoningClient> {
    match script {
        Some(path) => Ok(Arc::new(load_script(path)?)),
        None => bail!("built without `openai-client`; pass --script with scripted replies"),
    }
}

#[cfg(feature = "platform-client")]
fn platform_client() -> anyhow::Result<DynPlatformApi> {
    Ok(Arc::new(brainflow::platform::HttpPlatformClient::new()?))
}

#[cfg(not(feature = "platform-client"))]
fn platform_client() -> anyhow::Result<DynPlatformApi> {
    Ok(Arc::new(brainflow::platform::UnconfiguredPlatform))
}
