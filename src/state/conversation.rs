use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

use super::context::DomainContext;
use super::reducer::merge_messages;

/// 单轮对话的状态
///
/// 每轮创建一次，由引擎独占；节点只返回 [`StateUpdate`]，由引擎通过 reducer 合并。
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default, rename = "modelConfig")]
    pub model: ModelConfig,
    #[serde(default, rename = "domainContext")]
    pub context: DomainContext,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub route: Option<String>,
}

impl ConversationState {
    pub fn new(route: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            route: Some(route.into()),
            messages: vec![Message::user(user_input)],
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Credentials::new(credentials);
        self
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_context(mut self, context: DomainContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn apply(&mut self, update: StateUpdate) -> Result<()> {
        merge_messages(&mut self.messages, update.messages)
    }
}

/// 节点的部分结果
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
}

impl StateUpdate {
    pub fn message(message: Message) -> Self {
        Self {
            messages: vec![message],
        }
    }

    pub fn messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default, rename = "baseURL")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default, rename = "trial")]
    pub trial: bool,
}

impl ModelConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model_name: model_name.into(),
            trial: false,
        }
    }

    pub fn trial(mut self, trial: bool) -> Self {
        self.trial = trial;
        self
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("trial", &self.trial)
            .finish()
    }
}

/// 平台凭据（如编码后的 kubeconfig），不会出现在日志或 Debug 输出中
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}
