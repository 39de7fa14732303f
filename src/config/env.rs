use std::env;

use once_cell::sync::Lazy;

pub const TRIAL_API_KEY: &str = "TRIAL_API_KEY";
/// 代理覆盖项：带前缀的名字优先，其次是不带前缀的旧名字
pub const PROXY_BASE_URL: [&str; 2] = ["BRAINFLOW_PROXY_BASE_URL", "PROXY_BASE_URL"];
pub const PROXY_MODEL_NAME: [&str; 2] = ["BRAINFLOW_PROXY_MODEL_NAME", "PROXY_MODEL_NAME"];
pub const PROXY_API_KEY: [&str; 2] = ["BRAINFLOW_PROXY_API_KEY", "PROXY_API_KEY"];
pub const DEBUG: &str = "BRAINFLOW_DEBUG";

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 获取可选的环境变量；空值视为未设置，`${VAR}` 会再解析一次
    pub fn get_env_optional(key: &str) -> Option<String> {
        let value = env::var(key).ok().filter(|v| !v.trim().is_empty())?;
        match Self::indirection(&value) {
            Some(name) => env::var(name).ok().filter(|v| !v.trim().is_empty()),
            None => Some(value),
        }
    }

    /// 按顺序读取多个候选变量，返回第一个有值的
    pub fn first_optional(keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| Self::get_env_optional(key))
    }

    /// 检查是否启用调试模式
    pub fn is_debug_mode() -> bool {
        env::var(DEBUG).is_ok()
    }

    fn indirection(value: &str) -> Option<&str> {
        value
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
            .filter(|name| !name.is_empty())
    }
}

/// 进程级的模型默认值：代理覆盖项与试用密钥
///
/// 只在图构建时读取，运行期不会改变。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ModelDefaults {
    pub proxy_base_url: Option<String>,
    pub proxy_model_name: Option<String>,
    pub proxy_api_key: Option<String>,
    pub trial_api_key: Option<String>,
}

static GLOBAL_DEFAULTS: Lazy<ModelDefaults> = Lazy::new(ModelDefaults::from_env);

impl ModelDefaults {
    pub fn from_env() -> Self {
        Self {
            proxy_base_url: EnvConfig::first_optional(&PROXY_BASE_URL),
            proxy_model_name: EnvConfig::first_optional(&PROXY_MODEL_NAME),
            proxy_api_key: EnvConfig::first_optional(&PROXY_API_KEY),
            trial_api_key: EnvConfig::get_env_optional(TRIAL_API_KEY),
        }
    }

    /// 首次调用时读取环境变量并缓存
    pub fn global() -> &'static ModelDefaults {
        &GLOBAL_DEFAULTS
    }

    pub fn with_trial_key(mut self, key: impl Into<String>) -> Self {
        self.trial_api_key = Some(key.into());
        self
    }

    pub fn with_proxy(
        mut self,
        base_url: Option<String>,
        model_name: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        self.proxy_base_url = base_url;
        self.proxy_model_name = model_name;
        self.proxy_api_key = api_key;
        self
    }
}

impl std::fmt::Debug for ModelDefaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDefaults")
            .field("proxy_base_url", &self.proxy_base_url)
            .field("proxy_model_name", &self.proxy_model_name)
            .field("proxy_api_key", &self.proxy_api_key.as_ref().map(|_| "<redacted>"))
            .field("trial_api_key", &self.trial_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
