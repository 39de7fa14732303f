// 工具：声明、注册表、执行上下文与各领域的平台工具集

pub mod cluster;
pub mod devbox;
pub mod launchpad;
mod manifest;
mod platform_tool;
mod registry;
pub mod resource;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

pub use manifest::{ToolManifest, ToolManifestBuilder, ToolSpec};
pub use platform_tool::{BodyMode, PlatformEndpoint, PlatformTool};
pub use registry::ToolRegistry;

use crate::error::Result;
use crate::platform::{DynPlatformApi, PlatformAuth, PlatformRequest, ResourceKind};
use crate::state::{Credentials, DomainContext};

/// 可被推理步骤调用的工具
///
/// 输入在调用前已按清单中的 Schema 转换并校验；返回成功时的文本结果。
/// 工具不接触对话状态，所需的一切都来自显式传入的 [`ToolContext`]。
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    async fn call(&self, input: Value, ctx: &ToolContext) -> Result<String>;
}

/// 工具执行上下文：凭据、共享的平台客户端、本轮领域上下文快照
#[derive(Clone)]
pub struct ToolContext {
    credentials: Credentials,
    platform: DynPlatformApi,
    domain_context: DomainContext,
}

impl ToolContext {
    pub fn new(
        credentials: Credentials,
        platform: DynPlatformApi,
        domain_context: DomainContext,
    ) -> Self {
        Self {
            credentials,
            platform,
            domain_context,
        }
    }

    /// 凭据在首次需要时才解码，没有平台调用的工具不受影响
    pub fn auth(&self) -> Result<PlatformAuth> {
        PlatformAuth::from_credentials(&self.credentials)
    }

    pub fn platform(&self) -> &DynPlatformApi {
        &self.platform
    }

    pub fn resource_kind(&self) -> Option<ResourceKind> {
        self.domain_context.resource_kind()
    }

    pub async fn send(&self, request: PlatformRequest) -> Result<Value> {
        let auth = self.auth()?;
        self.platform.send(&auth, request).await
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("credentials", &self.credentials)
            .field("domain_context", &self.domain_context.kind())
            .finish()
    }
}

/// 把一组平台工具装入新的注册表
pub fn registry_from(tools: impl IntoIterator<Item = PlatformTool>) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        let (tool, manifest) = tool.into_parts();
        registry.register(tool, manifest)?;
    }
    Ok(registry)
}
