//! 开发环境（devbox）工具集

use serde_json::json;

use crate::error::Result;
use crate::platform::ResourceKind;
use crate::schema::Schema;
use crate::tools::{registry_from, BodyMode, PlatformEndpoint, PlatformTool, ToolManifest, ToolRegistry};

fn named(description: &str) -> Schema {
    Schema::object().required("name", Schema::string().with_description(description))
}

fn instance() -> Schema {
    named("Name of the devbox instance")
}

fn ports() -> Schema {
    Schema::array(
        Schema::object()
            .required("number", Schema::integer().with_description("Port number"))
            .optional(
                "protocol",
                Schema::string_enum(&["HTTP", "GRPC", "WS"]).with_default(json!("HTTP")),
            )
            .optional(
                "exposesPublicDomain",
                Schema::boolean().with_default(json!(true)),
            ),
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
        .required("name", Schema::string().with_description("Name of the devbox"))
        .optional(
            "runtime",
            Schema::string()
                .with_description("Runtime template")
                .with_default(json!("next.js")),
        )
        .optional(
            "quota",
            Schema::object()
                .optional("cpu", Schema::number().with_default(json!(1)))
                .optional("memory", Schema::number().with_default(json!(2)))
                .with_default(json!({})),
        )
        .optional("ports", ports().with_default(json!([])))
        .optional("env", env().with_default(json!([])))
        .optional("autostart", Schema::boolean().with_default(json!(true)))
        .with_description("Devbox creation parameters")
}

fn update_schema() -> Schema {
    instance()
        .optional(
            "quota",
            Schema::object()
                .optional("cpu", Schema::number())
                .optional("memory", Schema::number()),
        )
        .optional("ports", ports())
        .with_description("Devbox update parameters")
}

fn tool(name: &str, description: &str, input: Schema, endpoint: PlatformEndpoint) -> PlatformTool {
    PlatformTool::new(
        ResourceKind::Devbox,
        endpoint,
        ToolManifest::builder(name)
            .description(description)
            .input(input)
            .resource_kind(ResourceKind::Devbox)
            .build(),
    )
}

pub fn tools() -> Vec<PlatformTool> {
    vec![
        tool(
            "listDevboxes",
            "List all devbox instances.",
            Schema::object(),
            PlatformEndpoint::get("/v1/devbox"),
        ),
        tool(
            "getDevbox",
            "Get details of a specific devbox instance.",
            instance(),
            PlatformEndpoint::get("/v1/devbox/{name}"),
        ),
        tool(
            "getDevboxTemplates",
            "Get available devbox templates.",
            Schema::object(),
            PlatformEndpoint::get("/v1/devbox/templates"),
        ),
        tool(
            "getDevboxReleases",
            "Get all releases for a devbox instance.",
            instance(),
            PlatformEndpoint::get("/v1/devbox/{name}/release"),
        ),
        tool(
            "getDevboxDeploys",
            "Get deployed releases for a devbox instance.",
            instance(),
            PlatformEndpoint::get("/v1/devbox/{name}/deploy"),
        ),
        tool(
            "getDevboxMonitorData",
            "Get monitoring data for a devbox instance (CPU, memory metrics).",
            instance().optional(
                "search",
                Schema::object()
                    .optional("start", Schema::string().with_description("Start time for metrics"))
                    .optional("end", Schema::string().with_description("End time for metrics"))
                    .optional("step", Schema::string().with_description("Step interval for metrics")),
            ),
            PlatformEndpoint::get("/v1/devbox/{name}/monitor").with_query("search"),
        ),
        tool(
            "createDevbox",
            "Create a new devbox (development environment) with specified runtime, resources, and configuration.",
            create_schema(),
            PlatformEndpoint::post("/v1/devbox").with_body(BodyMode::Whole),
        ),
        tool(
            "updateDevbox",
            "Update a devbox instance configuration (resources, ports, etc.).",
            update_schema(),
            PlatformEndpoint::patch("/v1/devbox/{name}"),
        ),
        tool(
            "deleteDevbox",
            "Delete a devbox instance.",
            named("Name of the devbox instance to delete"),
            PlatformEndpoint::delete("/v1/devbox/{name}"),
        ),
        tool(
            "startDevbox",
            "Start a devbox instance.",
            named("Name of the devbox instance to start"),
            PlatformEndpoint::post("/v1/devbox/{name}/start"),
        ),
        tool(
            "pauseDevbox",
            "Pause a devbox instance.",
            named("Name of the devbox instance to pause"),
            PlatformEndpoint::post("/v1/devbox/{name}/pause"),
        ),
        tool(
            "shutdownDevbox",
            "Shutdown a devbox instance.",
            named("Name of the devbox instance to shutdown"),
            PlatformEndpoint::post("/v1/devbox/{name}/shutdown"),
        ),
        tool(
            "restartDevbox",
            "Restart a devbox instance.",
            named("Name of the devbox instance to restart"),
            PlatformEndpoint::post("/v1/devbox/{name}/restart"),
        ),
        tool(
            "autostartDevbox",
            "Configure autostart settings for a devbox instance with optional exec command.",
            instance().optional(
                "execCommand",
                Schema::string().with_description("Command to execute on autostart"),
            ),
            PlatformEndpoint::post("/v1/devbox/{name}/autostart")
                .with_body(BodyMode::Fields(&["execCommand"])),
        ),
        tool(
            "releaseDevbox",
            "Create a new release (snapshot) of a devbox instance with a tag and optional description.",
            instance()
                .required("tag", Schema::string().with_description("Tag name for the release"))
                .optional(
                    "releaseDes",
                    Schema::string().with_description("Optional description for the release"),
                ),
            PlatformEndpoint::post("/v1/devbox/{name}/release")
                .with_body(BodyMode::Fields(&["tag", "releaseDes"])),
        ),
        tool(
            "deleteDevboxRelease",
            "Delete a specific release (snapshot) of a devbox instance.",
            instance().required(
                "tag",
                Schema::string().with_description("Tag name of the release to delete"),
            ),
            PlatformEndpoint::delete("/v1/devbox/{name}/release/{tag}"),
        ),
        tool(
            "deployDevbox",
            "Deploy a specific release (snapshot) of a devbox instance.",
            instance().required(
                "tag",
                Schema::string().with_description("Tag name of the release to deploy"),
            ),
            PlatformEndpoint::post("/v1/devbox/{name}/release/{tag}/deploy"),
        ),
    ]
}

pub fn registry() -> Result<ToolRegistry> {
    registry_from(tools())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::conform;

    fn find(name: &str) -> PlatformTool {
        tools()
            .into_iter()
            .find(|t| t.manifest().name == name)
            .unwrap()
    }

    #[test]
    fn create_fills_devbox_and_port_defaults() {
        let tool = find("createDevbox");
        let input = conform(
            &tool.manifest().input,
            json!({"name": "web", "ports": [{"number": "3000"}]}),
        )
        .unwrap();

        assert_eq!(input["runtime"], "next.js");
        assert_eq!(input["quota"], json!({"cpu": 1, "memory": 2}));
        assert_eq!(input["autostart"], json!(true));
        assert_eq!(
            input["ports"],
            json!([{"number": 3000, "protocol": "HTTP", "exposesPublicDomain": true}])
        );
    }

    #[test]
    fn deploy_targets_the_tagged_release() {
        let tool = find("deployDevbox");
        let request = tool
            .endpoint()
            .request(ResourceKind::Devbox, &json!({"name": "web", "tag": "v1"}))
            .unwrap();
        assert_eq!(request.path, "/v1/devbox/web/release/v1/deploy");
        assert_eq!(request.body, Some(json!({})));
    }
}
