//! 数据库集群工具集（`dbprovider` 服务）

use serde_json::json;

use crate::error::Result;
use crate::platform::ResourceKind;
use crate::schema::Schema;
use crate::tools::{registry_from, BodyMode, PlatformEndpoint, PlatformTool, ToolManifest, ToolRegistry};

const DB_TYPES: &[&str] = &["mysql", "mongodb", "redis", "postgresql"];

fn database_name() -> Schema {
    Schema::string().with_description("Name of the database cluster")
}

fn by_name() -> Schema {
    Schema::object().required("databaseName", database_name())
}

fn log_search(with_paging: bool) -> Schema {
    let mut search = Schema::object()
        .required("podName", Schema::string().with_description("Name of the pod"))
        .required(
            "dbType",
            Schema::string_enum(DB_TYPES).with_description("Database type"),
        )
        .required("logType", Schema::string().with_description("Type of log"));
    if with_paging {
        search = search
            .required(
                "logPath",
                Schema::string().with_description("Path to the log file"),
            )
            .optional(
                "page",
                Schema::integer().with_description("Page number for pagination"),
            )
            .optional(
                "pageSize",
                Schema::integer().with_description("Page size for pagination"),
            );
    }
    Schema::object().required("search", search)
}

fn create_schema() -> Schema {
    let resource = Schema::object()
        .optional("replicas", Schema::integer().with_default(json!(1)))
        .optional("cpu", Schema::number().with_default(json!(0.5)))
        .optional("memory", Schema::number().with_default(json!(0.5)))
        .optional("storage", Schema::number().with_default(json!(1)))
        .with_default(json!({}));

    let auto_backup = Schema::object()
        .optional("start", Schema::boolean())
        .optional("type", Schema::string_enum(&["day", "week"]))
        .optional("week", Schema::array(Schema::string()))
        .optional("hour", Schema::string())
        .optional("minute", Schema::string())
        .optional("saveTime", Schema::number())
        .optional("saveType", Schema::string_enum(&["days", "weeks", "months"]))
        .with_description("Auto backup configuration");

    let parameter_config = Schema::object()
        .optional("maxConnections", Schema::string())
        .optional("timeZone", Schema::string())
        .optional("lowerCaseTableNames", Schema::string())
        .with_description("Database parameter configuration");

    Schema::object()
        .required("name", database_name())
        .optional(
            "type",
            Schema::string()
                .with_description("Database type")
                .with_default(json!("postgresql")),
        )
        .optional(
            "version",
            Schema::string()
                .with_description("Database version")
                .with_default(json!("postgresql-14.8.0")),
        )
        .optional("resource", resource)
        .optional(
            "terminationPolicy",
            Schema::string_enum(&["Delete", "WipeOut"]).with_default(json!("Delete")),
        )
        .optional("autoBackup", auto_backup)
        .optional("parameterConfig", parameter_config)
        .with_description("Cluster creation parameters")
}

fn update_schema() -> Schema {
    let resource = Schema::object()
        .optional("replicas", Schema::integer())
        .optional("cpu", Schema::number())
        .optional("memory", Schema::number())
        .optional("storage", Schema::number());

    Schema::object()
        .required("name", database_name())
        .optional("resource", resource)
        .with_description("Cluster update parameters")
}

fn tool(name: &str, description: &str, input: Schema, endpoint: PlatformEndpoint) -> PlatformTool {
    PlatformTool::new(
        ResourceKind::Database,
        endpoint,
        ToolManifest::builder(name)
            .description(description)
            .input(input)
            .resource_kind(ResourceKind::Database)
            .build(),
    )
}

pub fn tools() -> Vec<PlatformTool> {
    vec![
        tool(
            "listClusters",
            "List all database clusters.",
            Schema::object(),
            PlatformEndpoint::get("/v1/database"),
        ),
        tool(
            "getCluster",
            "Get details of a specific database cluster.",
            by_name(),
            PlatformEndpoint::get("/v1/database/{databaseName}"),
        ),
        tool(
            "getClusterVersions",
            "Get available database versions.",
            Schema::object(),
            PlatformEndpoint::get("/v1/database/version/list"),
        ),
        tool(
            "getClusterLogsData",
            "Get logs data for a database cluster pod.",
            log_search(true),
            PlatformEndpoint::get("/logs/data").with_query("search"),
        ),
        tool(
            "listClusterLogFiles",
            "List log files for a database cluster pod.",
            log_search(false),
            PlatformEndpoint::get("/logs/files").with_query("search"),
        ),
        tool(
            "createCluster",
            "Create a new database cluster (PostgreSQL, MongoDB, Redis, etc.) with specified type, version, resources, and configuration. Can include optional autoBackup and parameterConfig settings.",
            create_schema(),
            PlatformEndpoint::post("/v1/database").with_body(BodyMode::Whole),
        ),
        tool(
            "updateCluster",
            "Update a database cluster configuration (resources, etc.).",
            update_schema(),
            PlatformEndpoint::patch("/v1/database/{name}"),
        ),
        tool(
            "deleteCluster",
            "Delete a database cluster.",
            by_name(),
            PlatformEndpoint::delete("/v1/database/{databaseName}"),
        ),
        tool(
            "startCluster",
            "Start a database cluster.",
            by_name(),
            PlatformEndpoint::post("/v1/database/{databaseName}/start"),
        ),
        tool(
            "pauseCluster",
            "Pause a database cluster.",
            by_name(),
            PlatformEndpoint::post("/v1/database/{databaseName}/pause"),
        ),
        tool(
            "restartCluster",
            "Restart a database cluster.",
            by_name(),
            PlatformEndpoint::post("/v1/database/{databaseName}/restart"),
        ),
        tool(
            "createClusterBackup",
            "Create a backup for a database cluster.",
            by_name().optional(
                "remark",
                Schema::string().with_description("Optional remark for the backup"),
            ),
            PlatformEndpoint::post("/v1/database/{databaseName}/backup")
                .with_body(BodyMode::Fields(&["remark"])),
        ),
        tool(
            "restoreClusterBackup",
            "Restore a database cluster from a backup.",
            Schema::object()
                .required(
                    "databaseName",
                    Schema::string().with_description("Name of the source database cluster"),
                )
                .required(
                    "backupName",
                    Schema::string().with_description("Name of the backup to restore"),
                )
                .required(
                    "newDbName",
                    Schema::string().with_description("Name for the new restored database"),
                ),
            PlatformEndpoint::post("/v1/database/{databaseName}/backup/{backupName}")
                .with_body(BodyMode::Fields(&["newDbName"])),
        ),
        tool(
            "deleteClusterBackup",
            "Delete a backup for a database cluster.",
            by_name().required(
                "backupName",
                Schema::string().with_description("Name of the backup to delete"),
            ),
            PlatformEndpoint::delete("/v1/database/{databaseName}/backup/{backupName}"),
        ),
        tool(
            "enableClusterPublicAccess",
            "Enable public access for a database cluster.",
            by_name(),
            PlatformEndpoint::post("/v1/database/{databaseName}/enablePublic"),
        ),
        tool(
            "disableClusterPublicAccess",
            "Disable public access for a database cluster.",
            by_name(),
            PlatformEndpoint::post("/v1/database/{databaseName}/disablePublic"),
        ),
    ]
}

pub fn registry() -> Result<ToolRegistry> {
    registry_from(tools())
}
