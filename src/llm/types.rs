use std::fmt;

use serde::Serialize;

use crate::config::ModelDefaults;
use crate::error::{BrainFlowError, Result};
use crate::message::Message;
use crate::state::ModelConfig;
use crate::tools::ToolSpec;

/// 一次推理调用的完整输入
#[derive(Clone, Debug, Serialize)]
pub struct ReasoningRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    pub model: ResolvedModel,
}

impl ReasoningRequest {
    pub fn new(messages: Vec<Message>, tools: Vec<ToolSpec>, model: ResolvedModel) -> Self {
        Self {
            messages,
            tools,
            model,
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// 合并进程级默认值之后实际使用的模型端点
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModel {
    pub base_url: String,
    #[serde(skip)]
    pub api_key: String,
    pub model_name: String,
}

impl ResolvedModel {
    /// 代理设置优先于本轮配置；试用模式下改用进程级试用密钥
    pub fn resolve(config: &ModelConfig, defaults: &ModelDefaults) -> Result<Self> {
        let base_url = defaults
            .proxy_base_url
            .clone()
            .unwrap_or_else(|| config.base_url.clone());
        let model_name = defaults
            .proxy_model_name
            .clone()
            .unwrap_or_else(|| config.model_name.clone());
        let api_key = if config.trial {
            defaults.trial_api_key.clone().unwrap_or_default()
        } else {
            defaults
                .proxy_api_key
                .clone()
                .unwrap_or_else(|| config.api_key.clone())
        };

        if base_url.trim().is_empty() {
            return Err(BrainFlowError::Config("baseURL is required".into()));
        }
        if model_name.trim().is_empty() {
            return Err(BrainFlowError::Config("modelName is required".into()));
        }
        if api_key.trim().is_empty() {
            return Err(BrainFlowError::Config("API key is required".into()));
        }

        Ok(Self {
            base_url,
            api_key,
            model_name,
        })
    }
}

impl fmt::Debug for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedModel")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .finish()
    }
}
