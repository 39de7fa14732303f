// 对话状态模块

mod context;
mod conversation;
pub mod reducer;

pub use context::{
    ClusterContext, ContextKind, DevboxContext, DomainContext, LaunchpadContext, ProjectContext,
    ResourceContext, ResourceSummary,
};
pub use conversation::{ConversationState, Credentials, ModelConfig, StateUpdate};
pub use reducer::merge_messages;
