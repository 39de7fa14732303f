//! 应用（launchpad）工具集

use serde_json::json;

use crate::error::Result;
use crate::platform::ResourceKind;
use crate::schema::Schema;
use crate::tools::{registry_from, BodyMode, PlatformEndpoint, PlatformTool, ToolManifest, ToolRegistry};

fn named(description: &str) -> Schema {
    Schema::object().required("name", Schema::string().with_description(description))
}

fn image() -> Schema {
    Schema::object()
        .optional("imageName", Schema::string())
        .optional(
            "imageRegistry",
            Schema::object()
                .required("username", Schema::string())
                .required("password", Schema::string())
                .required("serverAddress", Schema::string()),
        )
}

fn launch_command() -> Schema {
    Schema::object()
        .optional("command", Schema::array(Schema::string()))
        .optional("args", Schema::array(Schema::string()))
}

fn ports() -> Schema {
    Schema::array(
        Schema::object()
            .required("number", Schema::integer())
            .optional(
                "protocol",
                Schema::string_enum(&["HTTP", "GRPC", "WS", "TCP", "UDP"])
                    .with_default(json!("HTTP")),
            )
            .optional(
                "exposesPublicDomain",
                Schema::boolean().with_default(json!(true)),
            ),
    )
}

fn path_entries(field: &str) -> Schema {
    Schema::array(
        Schema::object()
            .required("path", Schema::string())
            .required(field, Schema::string()),
    )
}

fn env() -> Schema {
    Schema::array(
        Schema::object()
            .required("name", Schema::string())
            .required("value", Schema::string()),
    )
}

fn create_schema() -> Schema {
    Schema::object()
        .required("name", Schema::string().with_description("Name of the application"))
        .optional("image", image().with_default(json!({"imageName": "nginx"})))
        .optional("launchCommand", launch_command())
        .optional(
            "resource",
            Schema::object()
                .optional("replicas", Schema::integer().with_default(json!(1)))
                .optional("cpu", Schema::number().with_default(json!(0.5)))
                .optional("memory", Schema::number().with_default(json!(0.5)))
                .with_default(json!({})),
        )
        .optional(
            "ports",
            ports().with_default(json!([
                {"number": 80, "protocol": "HTTP", "exposesPublicDomain": true}
            ])),
        )
        .optional("env", env())
        .optional("storage", path_entries("value"))
        .optional("configMap", path_entries("content"))
        .with_description("Launchpad creation parameters")
}

fn update_schema() -> Schema {
    named("Name of the launchpad application")
        .optional("image", image())
        .optional("launchCommand", launch_command())
        .optional(
            "quota",
            Schema::object()
                .optional("replicas", Schema::integer())
                .optional("cpu", Schema::number())
                .optional("memory", Schema::number()),
        )
        .optional("ports", ports())
        .optional("env", env())
        .optional("storage", path_entries("value"))
        .optional("configMap", path_entries("content"))
        .with_description("Launchpad update parameters")
}

fn tool(name: &str, description: &str, input: Schema, endpoint: PlatformEndpoint) -> PlatformTool {
    PlatformTool::new(
        ResourceKind::Launchpad,
        endpoint,
        ToolManifest::builder(name)
            .description(description)
            .input(input)
            .resource_kind(ResourceKind::Launchpad)
            .build(),
    )
}

pub fn tools() -> Vec<PlatformTool> {
    vec![
        tool(
            "getLaunchpad",
            "Get details of a specific launchpad application by name.",
            named("Name of the launchpad application"),
            PlatformEndpoint::get("/v1/app/{name}"),
        ),
        tool(
            "createLaunchpad",
            "Create a new launchpad application with specified image, resources, ports, and configuration.",
            create_schema(),
            PlatformEndpoint::post("/v1/app").with_body(BodyMode::Whole),
        ),
        tool(
            "updateLaunchpad",
            "Update a launchpad application configuration (image, resources, ports, etc.).",
            update_schema(),
            PlatformEndpoint::patch("/v1/app/{name}").with_body(BodyMode::Whole),
        ),
        tool(
            "deleteLaunchpad",
            "Delete a launchpad application.",
            named("Name of the launchpad application to delete"),
            PlatformEndpoint::delete("/v1/app/{name}"),
        ),
        tool(
            "startLaunchpad",
            "Start a launchpad application.",
            named("Name of the launchpad application to start"),
            PlatformEndpoint::post("/v1/app/{name}/start"),
        ),
        tool(
            "pauseLaunchpad",
            "Pause a launchpad application.",
            named("Name of the launchpad application to pause"),
            PlatformEndpoint::post("/v1/app/{name}/pause"),
        ),
        tool(
            "restartLaunchpad",
            "Restart a launchpad application.",
            named("Name of the launchpad application to restart"),
            PlatformEndpoint::post("/v1/app/{name}/restart"),
        ),
    ]
}

pub fn registry() -> Result<ToolRegistry> {
    registry_from(tools())
}
