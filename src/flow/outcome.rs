use serde::Serialize;

use super::router::HandlerId;
use crate::state::StateUpdate;

/// 节点的统一返回值：引擎只看这一种形状来决定下一步
#[derive(Clone, Debug, PartialEq)]
pub enum NodeOutcome {
    Continue { update: StateUpdate, next: NextNode },
    Terminate { update: StateUpdate },
}

impl NodeOutcome {
    pub fn terminate(update: StateUpdate) -> Self {
        NodeOutcome::Terminate { update }
    }

    pub fn to_tools(update: StateUpdate) -> Self {
        NodeOutcome::Continue {
            update,
            next: NextNode::ToolExecution,
        }
    }

    pub fn into_parts(self) -> (StateUpdate, Option<NextNode>) {
        match self {
            NodeOutcome::Continue { update, next } => (update, Some(next)),
            NodeOutcome::Terminate { update } => (update, None),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextNode {
    ToolExecution,
    Handler(HandlerId),
}

/// 工具执行后的走向；每个领域显式选择一种
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "topology", rename_all = "snake_case")]
pub enum Topology {
    /// 执行完一轮工具后结束
    #[default]
    Terminate,
    /// 回到原 Handler，往返次数达到上限后强制结束
    Loop { max_round_trips: u32 },
}
