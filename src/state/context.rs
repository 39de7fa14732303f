use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::platform::ResourceKind;

/// 前端提供的领域上下文快照，按领域区分的标签联合
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum DomainContext {
    #[default]
    None,
    Project(ProjectContext),
    Resource(ResourceContext),
    Cluster(ClusterContext),
    Devbox(DevboxContext),
    Launchpad(LaunchpadContext),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    None,
    Project,
    Resource,
    Cluster,
    Devbox,
    Launchpad,
}

impl DomainContext {
    pub fn kind(&self) -> ContextKind {
        match self {
            DomainContext::None => ContextKind::None,
            DomainContext::Project(_) => ContextKind::Project,
            DomainContext::Resource(_) => ContextKind::Resource,
            DomainContext::Cluster(_) => ContextKind::Cluster,
            DomainContext::Devbox(_) => ContextKind::Devbox,
            DomainContext::Launchpad(_) => ContextKind::Launchpad,
        }
    }

    /// 资源类型：资源上下文取显式声明的 kind，具体资源上下文按变体推断
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        match self {
            DomainContext::Resource(ctx) => ctx.kind,
            DomainContext::Cluster(_) => Some(ResourceKind::Database),
            DomainContext::Devbox(_) => Some(ResourceKind::Devbox),
            DomainContext::Launchpad(_) => Some(ResourceKind::Launchpad),
            DomainContext::None | DomainContext::Project(_) => None,
        }
    }

    /// 渲染活动变体的记录（不含标签），用于拼接 prompt
    pub fn render(&self) -> Result<Option<String>> {
        let rendered = match self {
            DomainContext::None => None,
            DomainContext::Project(ctx) => Some(serde_json::to_string(ctx)?),
            DomainContext::Resource(ctx) => Some(serde_json::to_string(ctx)?),
            DomainContext::Cluster(ctx) => Some(serde_json::to_string(ctx)?),
            DomainContext::Devbox(ctx) => Some(serde_json::to_string(ctx)?),
            DomainContext::Launchpad(ctx) => Some(serde_json::to_string(ctx)?),
        };
        Ok(rendered)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceKind>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceKind>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DevboxContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
