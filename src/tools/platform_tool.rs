use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::platform::{HttpMethod, PlatformRequest, ResourceKind};
use crate::schema::SchemaError;
use crate::tools::manifest::ToolManifest;
use crate::tools::{Tool, ToolContext};

/// 请求体的构造方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyMode {
    None,
    /// 固定发送 `{}`
    Empty,
    Whole,
    /// 去掉已用于路径的字段
    WithoutPath,
    /// 只取列出的字段；一个都没有时不发送请求体
    Fields(&'static [&'static str]),
}

/// 声明式的平台端点：方法、路径模板（`{field}` 取自输入）、请求体与查询参数
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformEndpoint {
    pub method: HttpMethod,
    pub path: &'static str,
    pub body: BodyMode,
    pub query: Option<&'static str>,
}

impl PlatformEndpoint {
    fn new(method: HttpMethod, path: &'static str) -> Self {
        Self {
            method,
            path,
            body: BodyMode::None,
            query: None,
        }
    }

    pub fn get(path: &'static str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: &'static str) -> Self {
        Self::new(HttpMethod::Post, path).with_body(BodyMode::Empty)
    }

    pub fn patch(path: &'static str) -> Self {
        Self::new(HttpMethod::Patch, path).with_body(BodyMode::WithoutPath)
    }

    pub fn delete(path: &'static str) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_body(mut self, body: BodyMode) -> Self {
        self.body = body;
        self
    }

    pub fn with_query(mut self, field: &'static str) -> Self {
        self.query = Some(field);
        self
    }

    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.path;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    names.push(&after[..end]);
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }
        names
    }

    pub fn render_path(&self, input: &Value) -> std::result::Result<String, SchemaError> {
        let mut path = self.path.to_string();
        for name in self.placeholders() {
            let value = match input.get(name) {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(SchemaError::at(
                        &[name.to_string()],
                        "path parameter must be a non-empty string",
                    ))
                }
            };
            path = path.replace(
                &format!("{{{}}}", name),
                urlencoding::encode(&value).as_ref(),
            );
        }
        Ok(path)
    }

    fn render_body(&self, input: &Value) -> Option<Value> {
        let object = || input.as_object().cloned().unwrap_or_default();
        match self.body {
            BodyMode::None => None,
            BodyMode::Empty => Some(Value::Object(Map::new())),
            BodyMode::Whole => Some(input.clone()),
            BodyMode::WithoutPath => {
                let mut map = object();
                for name in self.placeholders() {
                    map.remove(name);
                }
                Some(Value::Object(map))
            }
            BodyMode::Fields(fields) => {
                let map: Map<String, Value> = object()
                    .into_iter()
                    .filter(|(k, v)| fields.contains(&k.as_str()) && !v.is_null())
                    .collect();
                (!map.is_empty()).then_some(Value::Object(map))
            }
        }
    }

    pub fn request(&self, kind: ResourceKind, input: &Value) -> Result<PlatformRequest> {
        let mut request = PlatformRequest::new(kind, self.method, self.render_path(input)?);
        if let Some(body) = self.render_body(input) {
            request = request.with_body(body);
        }
        if let Some(field) = self.query {
            if let Some(query) = input.get(field).filter(|v| !v.is_null()) {
                request = request.with_query(query.clone());
            }
        }
        Ok(request)
    }
}

/// 由端点声明驱动的平台工具；成功时返回格式化后的平台响应
#[derive(Clone, Debug)]
pub struct PlatformTool {
    kind: ResourceKind,
    endpoint: PlatformEndpoint,
    manifest: ToolManifest,
}

impl PlatformTool {
    pub fn new(kind: ResourceKind, endpoint: PlatformEndpoint, manifest: ToolManifest) -> Self {
        Self {
            kind,
            endpoint,
            manifest,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn endpoint(&self) -> &PlatformEndpoint {
        &self.endpoint
    }

    pub fn manifest(&self) -> &ToolManifest {
        &self.manifest
    }

    pub fn into_parts(self) -> (Arc<dyn Tool>, ToolManifest) {
        let manifest = self.manifest.clone();
        (Arc::new(self), manifest)
    }
}

#[async_trait]
impl Tool for PlatformTool {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    async fn call(&self, input: Value, ctx: &ToolContext) -> Result<String> {
        let request = self.endpoint.request(self.kind, &input)?;
        debug!(tool = %self.manifest.name, method = ?request.method, path = %request.path, "platform tool call");
        let response = ctx.send(request).await?;
        Ok(serde_json::to_string_pretty(&response)?)
    }
}
