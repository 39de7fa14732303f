use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::state::ConversationState;

/// 已知的 Handler 标识（路由值，精确匹配、区分大小写）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandlerId {
    #[serde(rename = "project-overview")]
    ProjectOverview,
    #[serde(rename = "resource-ops")]
    ResourceOps,
    #[serde(rename = "deployment-proposal")]
    DeploymentProposal,
    #[serde(rename = "cluster-ops")]
    ClusterOps,
    #[serde(rename = "environment-ops")]
    EnvironmentOps,
    #[serde(rename = "launchpad-ops")]
    LaunchpadOps,
}

impl HandlerId {
    pub const ALL: [HandlerId; 6] = [
        HandlerId::ProjectOverview,
        HandlerId::ResourceOps,
        HandlerId::DeploymentProposal,
        HandlerId::ClusterOps,
        HandlerId::EnvironmentOps,
        HandlerId::LaunchpadOps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerId::ProjectOverview => "project-overview",
            HandlerId::ResourceOps => "resource-ops",
            HandlerId::DeploymentProposal => "deployment-proposal",
            HandlerId::ClusterOps => "cluster-ops",
            HandlerId::EnvironmentOps => "environment-ops",
            HandlerId::LaunchpadOps => "launchpad-ops",
        }
    }

    pub fn parse(value: &str) -> Option<HandlerId> {
        HandlerId::ALL.into_iter().find(|id| id.as_str() == value)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        HandlerId::parse(value).ok_or_else(|| format!("unknown route id `{value}`"))
    }
}

/// 路由结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Handler(HandlerId),
    Terminate,
}

/// 纯函数：按 `route` 字段选择 Handler；空值与未知值都直接结束本轮
pub fn route(state: &ConversationState) -> Route {
    state
        .route
        .as_deref()
        .and_then(HandlerId::parse)
        .map(Route::Handler)
        .unwrap_or(Route::Terminate)
}
