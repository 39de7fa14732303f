use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Schema 类型枚举
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SchemaKind {
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "enum")]
    Enum { values: Vec<String> },
    #[serde(rename = "array")]
    Array { items: Box<Schema> },
    #[serde(rename = "object")]
    Object {
        properties: BTreeMap<String, Schema>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
        #[serde(default = "Schema::allow_additional")]
        additional: bool,
    },
    #[serde(rename = "any")]
    Any,
}

/// Schema 定义
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    #[serde(flatten)]
    pub kind: SchemaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer)
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    pub fn string_enum(values: &[&str]) -> Self {
        Self::new(SchemaKind::Enum {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array {
            items: Box::new(items),
        })
    }

    /// 空对象，默认允许额外字段
    pub fn object() -> Self {
        Self::new(SchemaKind::Object {
            properties: BTreeMap::new(),
            required: Vec::new(),
            additional: true,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn required(self, name: &str, schema: Schema) -> Self {
        self.property(name, schema, true)
    }

    pub fn optional(self, name: &str, schema: Schema) -> Self {
        self.property(name, schema, false)
    }

    pub fn strict(mut self) -> Self {
        if let SchemaKind::Object { additional, .. } = &mut self.kind {
            *additional = false;
        }
        self
    }

    fn property(mut self, name: &str, schema: Schema, is_required: bool) -> Self {
        if let SchemaKind::Object {
            properties,
            required,
            ..
        } = &mut self.kind
        {
            properties.insert(name.to_string(), schema);
            if is_required && !required.iter().any(|r| r == name) {
                required.push(name.to_string());
            }
        }
        self
    }

    /// 导出为 JSON Schema，用于绑定到推理步骤的可调用工具
    pub fn to_json_schema(&self) -> Value {
        let mut out = match &self.kind {
            SchemaKind::Null => json!({ "type": "null" }),
            SchemaKind::Boolean => json!({ "type": "boolean" }),
            SchemaKind::Integer => json!({ "type": "integer" }),
            SchemaKind::Number => json!({ "type": "number" }),
            SchemaKind::String => json!({ "type": "string" }),
            SchemaKind::Enum { values } => json!({ "type": "string", "enum": values }),
            SchemaKind::Array { items } => json!({
                "type": "array",
                "items": items.to_json_schema(),
            }),
            SchemaKind::Object {
                properties,
                required,
                additional,
            } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.to_json_schema()))
                    .collect();
                let mut object = json!({
                    "type": "object",
                    "properties": props,
                    "additionalProperties": additional,
                });
                if !required.is_empty() {
                    object["required"] = json!(required);
                }
                object
            }
            SchemaKind::Any => json!({}),
        };

        if let Some(obj) = out.as_object_mut() {
            if let Some(description) = &self.description {
                obj.insert("description".into(), json!(description));
            }
            if let Some(default) = &self.default {
                obj.insert("default".into(), default.clone());
            }
        }
        out
    }

    fn allow_additional() -> bool {
        true
    }
}
