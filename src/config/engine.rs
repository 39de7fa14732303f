use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BrainFlowError, Result};
use crate::flow::{HandlerId, Topology};

/// 引擎配置，只在构建图时读取
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub reasoning_timeout_ms: u64,
    pub tool_timeout_ms: u64,
    /// 同一批工具调用是否并发执行
    pub parallel_tool_calls: bool,
    pub default_max_round_trips: u32,
    pub domains: BTreeMap<String, DomainConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reasoning_timeout_ms: 60_000,
            tool_timeout_ms: 30_000,
            parallel_tool_calls: true,
            default_max_round_trips: 3,
            domains: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TopologyKind {
    Terminate,
    Loop,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainConfig {
    pub topology: TopologyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_round_trips: Option<u32>,
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)
            .map_err(|e| BrainFlowError::Config(format!("invalid engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BrainFlowError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reasoning_timeout_ms == 0 {
            return Err(BrainFlowError::Config(
                "reasoning_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.tool_timeout_ms == 0 {
            return Err(BrainFlowError::Config(
                "tool_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.default_max_round_trips == 0 {
            return Err(BrainFlowError::Config(
                "default_max_round_trips must be greater than zero".into(),
            ));
        }

        for (route, domain) in &self.domains {
            if HandlerId::parse(route).is_none() {
                return Err(BrainFlowError::Config(format!("unknown route id `{route}`")));
            }
            if domain.max_round_trips == Some(0) {
                return Err(BrainFlowError::Config(format!(
                    "max_round_trips for `{route}` must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    pub fn reasoning_timeout(&self) -> Duration {
        Duration::from_millis(self.reasoning_timeout_ms)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }

    /// 领域的拓扑覆盖项；未配置时返回 `None`，沿用领域默认值
    pub fn topology_for(&self, id: HandlerId) -> Option<Topology> {
        self.domains.get(id.as_str()).map(|domain| match domain.topology {
            TopologyKind::Terminate => Topology::Terminate,
            TopologyKind::Loop => Topology::Loop {
                max_round_trips: domain
                    .max_round_trips
                    .unwrap_or(self.default_max_round_trips),
            },
        })
    }
}
