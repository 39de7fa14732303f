// Flow 模块 - 路由、节点与失败收敛

pub mod constants;
pub mod domains;
pub mod guard;
mod handler;
mod outcome;
mod prompt;
mod router;
mod tool_node;

pub use guard::guarded;
pub use handler::{DomainSpec, HandlerNode};
pub use outcome::{NextNode, NodeOutcome, Topology};
pub use prompt::PromptBuilder;
pub use router::{route, HandlerId, Route};
pub use tool_node::ToolExecutionNode;
