use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::platform::ResourceKind;
use crate::schema::Schema;

/// 工具清单：名称、描述、输入 Schema 与适用的资源类型
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input: Schema,
    /// 为空表示适用于所有资源类型
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_kinds: Vec<ResourceKind>,
}

impl ToolManifest {
    pub fn builder(name: impl Into<String>) -> ToolManifestBuilder {
        ToolManifestBuilder::new(name)
    }

    /// 上下文资源类型未知时不做过滤
    pub fn supports(&self, kind: Option<ResourceKind>) -> bool {
        match kind {
            _ if self.resource_kinds.is_empty() => true,
            None => true,
            Some(kind) => self.resource_kinds.contains(&kind),
        }
    }

    pub fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            parameters: self.input.to_json_schema(),
        }
    }
}

/// 绑定到推理步骤的可调用工具描述
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Clone, Debug)]
pub struct ToolManifestBuilder {
    manifest: ToolManifest,
}

impl ToolManifestBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            manifest: ToolManifest {
                name: name.into(),
                description: None,
                input: Schema::object(),
                resource_kinds: Vec::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.manifest.description = Some(description.into());
        self
    }

    pub fn input(mut self, schema: Schema) -> Self {
        self.manifest.input = schema;
        self
    }

    pub fn resource_kind(mut self, kind: ResourceKind) -> Self {
        if !self.manifest.resource_kinds.contains(&kind) {
            self.manifest.resource_kinds.push(kind);
        }
        self
    }

    pub fn build(self) -> ToolManifest {
        self.manifest
    }
}
