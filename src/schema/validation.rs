use serde_json::{Map, Number, Value};

use super::error::SchemaError;
use super::schema::{Schema, SchemaKind};

/// 先按 Schema 宽松转换，再严格校验；返回可直接交给工具执行的值
pub fn conform(schema: &Schema, value: Value) -> Result<Value, SchemaError> {
    let coerced = coerce_value(schema, value);
    validate_value(schema, &coerced, &mut Vec::new())?;
    Ok(coerced)
}

/// 宽松转换：补默认值、数字/布尔字符串转原生类型、空参数转空对象
pub fn coerce_value(schema: &Schema, value: Value) -> Value {
    match (&schema.kind, value) {
        (SchemaKind::Object { properties, .. }, Value::Null) => {
            fill_defaults(properties, Map::new())
        }
        (SchemaKind::Object { properties, .. }, Value::Object(map)) => {
            fill_defaults(properties, map)
        }
        (SchemaKind::Array { items }, Value::Array(values)) => Value::Array(
            values
                .into_iter()
                .map(|element| coerce_value(items, element))
                .collect(),
        ),
        (SchemaKind::Integer, Value::String(text)) => match text.trim().parse::<i64>() {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(text),
        },
        (SchemaKind::Integer, Value::Number(n)) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Value::Number((f as i64).into())
            }
            _ => Value::Number(n),
        },
        (SchemaKind::Number, Value::String(text)) => match text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
        {
            Some(n) => Value::Number(n),
            None => Value::String(text),
        },
        (SchemaKind::Boolean, Value::String(text)) => match text.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text),
        },
        (_, other) => other,
    }
}

fn fill_defaults(
    properties: &std::collections::BTreeMap<String, Schema>,
    mut map: Map<String, Value>,
) -> Value {
    for (key, sub_schema) in properties {
        match map.remove(key) {
            Some(Value::Null) | None => {
                if let Some(default) = &sub_schema.default {
                    map.insert(key.clone(), coerce_value(sub_schema, default.clone()));
                }
            }
            Some(existing) => {
                map.insert(key.clone(), coerce_value(sub_schema, existing));
            }
        }
    }
    Value::Object(map)
}

/// 验证值是否符合 Schema
pub fn validate_value(
    schema: &Schema,
    value: &Value,
    path: &mut Vec<String>,
) -> Result<(), SchemaError> {
    match &schema.kind {
        SchemaKind::Null => {
            if !value.is_null() {
                return Err(SchemaError::at(path, "expected null"));
            }
        }
        SchemaKind::Boolean => {
            if !value.is_boolean() {
                return Err(SchemaError::at(path, "expected boolean"));
            }
        }
        SchemaKind::Integer => {
            if !(value.is_i64() || value.is_u64()) {
                return Err(SchemaError::at(path, "expected integer"));
            }
        }
        SchemaKind::Number => {
            if !value.is_number() {
                return Err(SchemaError::at(path, "expected number"));
            }
        }
        SchemaKind::String => {
            if !value.is_string() {
                return Err(SchemaError::at(path, "expected string"));
            }
        }
        SchemaKind::Enum { values } => {
            let matches = value
                .as_str()
                .map(|s| values.iter().any(|allowed| allowed == s))
                .unwrap_or(false);
            if !matches {
                return Err(SchemaError::at(
                    path,
                    format!("expected one of [{}]", values.join(", ")),
                ));
            }
        }
        SchemaKind::Array { items } => {
            let array = value
                .as_array()
                .ok_or_else(|| SchemaError::at(path, "expected array"))?;
            for (idx, element) in array.iter().enumerate() {
                path.push(idx.to_string());
                validate_value(items, element, path)?;
                path.pop();
            }
        }
        SchemaKind::Object {
            properties,
            required,
            additional,
        } => {
            let object = value
                .as_object()
                .ok_or_else(|| SchemaError::at(path, "expected object"))?;

            for key in required {
                if !object.contains_key(key) {
                    let mut required_path = path.clone();
                    required_path.push(key.clone());
                    return Err(SchemaError::at(
                        &required_path,
                        format!("missing required property `{}`", key),
                    ));
                }
            }

            for (key, val) in object {
                if let Some(sub_schema) = properties.get(key) {
                    // 可选字段显式给 null 视同缺省
                    if val.is_null() && !required.contains(key) {
                        continue;
                    }
                    path.push(key.clone());
                    validate_value(sub_schema, val, path)?;
                    path.pop();
                } else if !additional {
                    let mut extra_path = path.clone();
                    extra_path.push(key.clone());
                    return Err(SchemaError::at(
                        &extra_path,
                        format!("unexpected property `{}`", key),
                    ));
                }
            }
        }
        SchemaKind::Any => {}
    }

    Ok(())
}
