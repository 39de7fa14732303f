//! 单个资源的通用生命周期工具
//!
//! 工具按资源上下文中的类型分派到对应服务；Handler 只绑定支持该类型的工具。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{BrainFlowError, Result};
use crate::platform::ResourceKind;
use crate::schema::Schema;
use crate::tools::{PlatformEndpoint, Tool, ToolContext, ToolManifest, ToolRegistry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceAction {
    Get,
    Start,
    Pause,
    Restart,
    Delete,
    Shutdown,
}

impl ResourceAction {
    pub const ALL: [ResourceAction; 6] = [
        ResourceAction::Get,
        ResourceAction::Start,
        ResourceAction::Pause,
        ResourceAction::Restart,
        ResourceAction::Delete,
        ResourceAction::Shutdown,
    ];

    pub fn tool_name(&self) -> &'static str {
        match self {
            ResourceAction::Get => "getResource",
            ResourceAction::Start => "startResource",
            ResourceAction::Pause => "pauseResource",
            ResourceAction::Restart => "restartResource",
            ResourceAction::Delete => "deleteResource",
            ResourceAction::Shutdown => "shutdownResource",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ResourceAction::Get => "Get the current details of the resource.",
            ResourceAction::Start => "Start the resource.",
            ResourceAction::Pause => "Pause the resource.",
            ResourceAction::Restart => "Restart the resource.",
            ResourceAction::Delete => "Delete the resource.",
            ResourceAction::Shutdown => "Shutdown the devbox, releasing its compute quota.",
        }
    }

    pub fn supported_kinds(&self) -> &'static [ResourceKind] {
        match self {
            ResourceAction::Shutdown => &[ResourceKind::Devbox],
            _ => &ResourceKind::ALL,
        }
    }

    /// 该动作在给定资源类型上的端点
    pub fn endpoint(&self, kind: ResourceKind) -> Option<PlatformEndpoint> {
        use ResourceAction::*;
        use ResourceKind::*;

        let endpoint = match (self, kind) {
            (Get, Database) => PlatformEndpoint::get("/v1/database/{name}"),
            (Get, Devbox) => PlatformEndpoint::get("/v1/devbox/{name}"),
            (Get, Launchpad) => PlatformEndpoint::get("/v1/app/{name}"),
            (Start, Database) => PlatformEndpoint::post("/v1/database/{name}/start"),
            (Start, Devbox) => PlatformEndpoint::post("/v1/devbox/{name}/start"),
            (Start, Launchpad) => PlatformEndpoint::post("/v1/app/{name}/start"),
            (Pause, Database) => PlatformEndpoint::post("/v1/database/{name}/pause"),
            (Pause, Devbox) => PlatformEndpoint::post("/v1/devbox/{name}/pause"),
            (Pause, Launchpad) => PlatformEndpoint::post("/v1/app/{name}/pause"),
            (Restart, Database) => PlatformEndpoint::post("/v1/database/{name}/restart"),
            (Restart, Devbox) => PlatformEndpoint::post("/v1/devbox/{name}/restart"),
            (Restart, Launchpad) => PlatformEndpoint::post("/v1/app/{name}/restart"),
            (Delete, Database) => PlatformEndpoint::delete("/v1/database/{name}"),
            (Delete, Devbox) => PlatformEndpoint::delete("/v1/devbox/{name}"),
            (Delete, Launchpad) => PlatformEndpoint::delete("/v1/app/{name}"),
            (Shutdown, Devbox) => PlatformEndpoint::post("/v1/devbox/{name}/shutdown"),
            (Shutdown, _) => return None,
        };
        Some(endpoint)
    }

    pub fn manifest(&self) -> ToolManifest {
        let mut builder = ToolManifest::builder(self.tool_name())
            .description(self.description())
            .input(
                Schema::object()
                    .required("name", Schema::string().with_description("Name of the resource")),
            );
        for kind in self.supported_kinds() {
            builder = builder.resource_kind(*kind);
        }
        builder.build()
    }
}

pub struct ResourceTool {
    action: ResourceAction,
}

impl ResourceTool {
    pub fn new(action: ResourceAction) -> Self {
        Self { action }
    }
}

#[async_trait]
impl Tool for ResourceTool {
    fn name(&self) -> &str {
        self.action.tool_name()
    }

    async fn call(&self, input: Value, ctx: &ToolContext) -> Result<String> {
        let kind = ctx.resource_kind().ok_or_else(|| {
            BrainFlowError::Config("resource context does not declare a resource kind".into())
        })?;
        let endpoint = self.action.endpoint(kind).ok_or_else(|| {
            BrainFlowError::Config(format!(
                "{} is not supported for {} resources",
                self.action.tool_name(),
                kind
            ))
        })?;

        let request = endpoint.request(kind, &input)?;
        debug!(tool = self.action.tool_name(), %kind, path = %request.path, "resource tool call");
        let response = ctx.send(request).await?;
        Ok(serde_json::to_string_pretty(&response)?)
    }
}

pub fn registry() -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for action in ResourceAction::ALL {
        registry.register(Arc::new(ResourceTool::new(action)), action.manifest())?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_is_devbox_only() {
        let registry = registry().unwrap();
        let for_database = registry.select(Some(ResourceKind::Database));
        assert!(for_database.get("shutdownResource").is_none());
        assert_eq!(for_database.len(), 5);

        let for_devbox = registry.select(Some(ResourceKind::Devbox));
        assert!(for_devbox.get("shutdownResource").is_some());
    }

    #[test]
    fn launchpad_actions_use_the_app_service_paths() {
        let endpoint = ResourceAction::Restart
            .endpoint(ResourceKind::Launchpad)
            .unwrap();
        assert_eq!(endpoint.path, "/v1/app/{name}/restart");
    }
}
