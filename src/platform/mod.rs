// 外部平台 API 边界：工具体只通过这里发出有副作用的调用

#[cfg(feature = "platform-client")]
mod http;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BrainFlowError, Result};
use crate::state::Credentials;

#[cfg(feature = "platform-client")]
pub use http::HttpPlatformClient;

/// 平台上的资源类型，每种对应一个区域服务
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[serde(alias = "cluster")]
    Database,
    Devbox,
    #[serde(alias = "app")]
    Launchpad,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Database,
        ResourceKind::Devbox,
        ResourceKind::Launchpad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Database => "database",
            ResourceKind::Devbox => "devbox",
            ResourceKind::Launchpad => "launchpad",
        }
    }

    /// 区域服务子域名
    pub fn subdomain(&self) -> &'static str {
        match self {
            ResourceKind::Database => "dbprovider",
            ResourceKind::Devbox => "devbox",
            ResourceKind::Launchpad => "applaunchpad",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

/// 一次平台调用；`path` 相对于服务的 `/api` 前缀
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlatformRequest {
    pub kind: ResourceKind,
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl PlatformRequest {
    pub fn new(kind: ResourceKind, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            kind,
            method,
            path: path.into(),
            query: None,
            body: None,
        }
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// 从调用方凭据解码出的平台认证信息
#[derive(Clone)]
pub struct PlatformAuth {
    kubeconfig: String,
}

impl PlatformAuth {
    /// 解码规则：先做 URI 解码；若结果是单行且能按 base64 解出 UTF-8 文本，则取解码后的文本
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        let raw = credentials.expose().trim();
        if raw.is_empty() {
            return Err(BrainFlowError::Config("platform credentials are empty".into()));
        }

        let decoded = urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());

        let kubeconfig = if decoded.contains('\n') {
            decoded
        } else {
            base64::engine::general_purpose::STANDARD
                .decode(decoded.as_bytes())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .unwrap_or(decoded)
        };

        Ok(Self { kubeconfig })
    }

    pub fn kubeconfig(&self) -> &str {
        &self.kubeconfig
    }

    /// 区域域名：kubeconfig 中 `server:` 地址的主机名，去掉前缀 `apiserver.`
    pub fn region_host(&self) -> Result<String> {
        let server = self
            .kubeconfig
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("server:"))
            .map(|value| value.trim().trim_matches(|c| c == '"' || c == '\''))
            .ok_or_else(|| BrainFlowError::Config("kubeconfig has no cluster server".into()))?;

        let url = url::Url::parse(server)
            .map_err(|e| BrainFlowError::Config(format!("invalid cluster server url: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| BrainFlowError::Config("cluster server url has no host".into()))?;

        Ok(host.strip_prefix("apiserver.").unwrap_or(host).to_string())
    }
}

impl fmt::Debug for PlatformAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlatformAuth(<redacted>)")
    }
}

/// 平台 API 协作方
///
/// 进程启动时构造一次，以 `Arc` 显式传入每个需要它的工具体。
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn send(&self, auth: &PlatformAuth, request: PlatformRequest) -> Result<Value>;
}

pub type DynPlatformApi = Arc<dyn PlatformApi>;

/// 没有配置平台客户端时使用：所有调用都返回错误
#[derive(Default, Clone)]
pub struct UnconfiguredPlatform;

#[async_trait]
impl PlatformApi for UnconfiguredPlatform {
    async fn send(&self, _auth: &PlatformAuth, request: PlatformRequest) -> Result<Value> {
        Err(BrainFlowError::Config(format!(
            "no platform client configured for {} requests",
            request.kind
        )))
    }
}
