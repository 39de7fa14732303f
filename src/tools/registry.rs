use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{BrainFlowError, Result};
use crate::platform::ResourceKind;
use crate::tools::manifest::{ToolManifest, ToolSpec};
use crate::tools::Tool;

#[derive(Clone)]
struct ToolEntry {
    tool: Arc<dyn Tool>,
    manifest: Arc<ToolManifest>,
}

/// 单个领域的工具注册表
///
/// 启动时构建，之后只读；按注册顺序绑定到推理步骤。
#[derive(Clone, Default)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>, manifest: ToolManifest) -> Result<()> {
        if manifest.name != tool.name() {
            return Err(BrainFlowError::ManifestMismatch {
                kind: "tool",
                name: tool.name().to_string(),
            });
        }
        if self.index.contains_key(&manifest.name) {
            return Err(BrainFlowError::DuplicateTool(manifest.name));
        }

        self.index.insert(manifest.name.clone(), self.entries.len());
        self.entries.push(ToolEntry {
            tool,
            manifest: Arc::new(manifest),
        });
        Ok(())
    }

    pub fn with(mut self, tool: Arc<dyn Tool>, manifest: ToolManifest) -> Result<Self> {
        self.register(tool, manifest)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entry(name).map(|entry| Arc::clone(&entry.tool))
    }

    pub fn lookup(&self, name: &str) -> Option<(Arc<dyn Tool>, Arc<ToolManifest>)> {
        self.entry(name)
            .map(|entry| (Arc::clone(&entry.tool), Arc::clone(&entry.manifest)))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.manifest.name.as_str())
            .collect()
    }

    pub fn manifests(&self) -> impl Iterator<Item = &ToolManifest> {
        self.entries.iter().map(|entry| entry.manifest.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 取出适用于给定资源类型的子集，作为 Handler 绑定的工具切片
    pub fn select(&self, kind: Option<ResourceKind>) -> ToolRegistry {
        let mut selected = ToolRegistry::new();
        for entry in self.entries.iter().filter(|e| e.manifest.supports(kind)) {
            selected
                .index
                .insert(entry.manifest.name.clone(), selected.entries.len());
            selected.entries.push(entry.clone());
        }
        selected
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.manifests().map(ToolManifest::spec).collect()
    }

    fn entry(&self, name: &str) -> Option<&ToolEntry> {
        self.index.get(name).and_then(|idx| self.entries.get(*idx))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
