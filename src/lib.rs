pub mod config;
pub mod error;
pub mod flow;
pub mod llm;
pub mod message;
pub mod platform;
pub mod runtime;
pub mod schema;
pub mod state;
pub mod tools;
pub mod utils;

pub use config::{EngineConfig, EnvConfig, ModelDefaults};
pub use error::{BrainFlowError, Result};
pub use flow::{route, DomainSpec, HandlerId, NodeOutcome, Route, Topology};
pub use llm::{DynReasoningClient, ReasoningClient, ReasoningRequest, ScriptedClient};
#[cfg(feature = "openai-client")]
pub use llm::OpenAiClient;
pub use message::{Message, MessageRole, ToolCallRequest, ToolResultStatus};
pub use platform::{DynPlatformApi, PlatformApi, PlatformAuth, PlatformRequest, ResourceKind};
#[cfg(feature = "platform-client")]
pub use platform::HttpPlatformClient;
pub use runtime::{WorkflowGraph, WorkflowGraphBuilder};
pub use schema::{Schema, SchemaError};
pub use state::{ConversationState, DomainContext, ModelConfig, StateUpdate};
pub use tools::{Tool, ToolContext, ToolManifest, ToolRegistry};
pub use utils::logging;
