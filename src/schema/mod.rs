// 工具输入 Schema：定义、宽松转换与校验

mod error;
mod schema;
mod validation;

pub use error::SchemaError;
pub use schema::{Schema, SchemaKind};
pub use validation::{coerce_value, conform, validate_value};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cluster_search() -> Schema {
        Schema::object()
            .required("podName", Schema::string())
            .required(
                "dbType",
                Schema::string_enum(&["mysql", "mongodb", "redis", "postgresql"]),
            )
            .optional("page", Schema::integer())
            .strict()
    }

    #[test]
    fn conform_coerces_numeric_strings() {
        let value = conform(
            &cluster_search(),
            json!({"podName": "db-0", "dbType": "redis", "page": "2"}),
        )
        .unwrap();
        assert_eq!(value["page"], json!(2));
    }

    #[test]
    fn conform_fills_defaults_and_nested_defaults() {
        let schema = Schema::object()
            .required("name", Schema::string())
            .optional(
                "resource",
                Schema::object()
                    .optional("cpu", Schema::number().with_default(json!(0.5)))
                    .with_default(json!({})),
            );

        let value = conform(&schema, json!({"name": "pg"})).unwrap();
        assert_eq!(value, json!({"name": "pg", "resource": {"cpu": 0.5}}));
    }

    #[test]
    fn null_arguments_become_empty_object() {
        let value = conform(&Schema::object(), serde_json::Value::Null).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn errors_carry_the_offending_path() {
        let schema = Schema::object().required("search", cluster_search());
        let err = conform(
            &schema,
            json!({"search": {"podName": "db-0", "dbType": "oracle"}}),
        )
        .unwrap_err();

        assert_eq!(err.path(), ["search", "dbType"]);
        assert!(err.to_string().contains("/search/dbType"));
    }

    #[test]
    fn strict_objects_reject_unknown_properties() {
        let err = conform(
            &cluster_search(),
            json!({"podName": "db-0", "dbType": "redis", "extra": true}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unexpected property `extra`"));
    }

    #[test]
    fn json_schema_export_lists_required_fields() {
        let exported = cluster_search()
            .with_description("pod selector")
            .to_json_schema();
        assert_eq!(exported["type"], "object");
        assert_eq!(exported["required"], json!(["podName", "dbType"]));
        assert_eq!(exported["additionalProperties"], json!(false));
        assert_eq!(exported["properties"]["dbType"]["enum"][0], "mysql");
        assert_eq!(exported["description"], "pod selector");
    }
}
