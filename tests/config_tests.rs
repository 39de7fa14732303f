use std::io::Write;
use std::sync::Arc;

use brainflow::config::TopologyKind;
use brainflow::{
    BrainFlowError, EngineConfig, HandlerId, ModelDefaults, ScriptedClient, Topology,
    WorkflowGraph,
};

#[test]
fn engine_config_loads_from_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            "reasoning_timeout_ms": 15000,
            "parallel_tool_calls": false,
            "domains": {{
                "environment-ops": {{"topology": "loop", "max_round_trips": 2}},
                "cluster-ops": {{"topology": "terminate"}}
            }}
        }}"#
    )?;

    let config = EngineConfig::from_file(file.path())?;
    assert_eq!(config.reasoning_timeout_ms, 15_000);
    assert_eq!(config.tool_timeout_ms, 30_000);
    assert!(!config.parallel_tool_calls);
    assert_eq!(config.domains["cluster-ops"].topology, TopologyKind::Terminate);
    assert_eq!(
        config.topology_for(HandlerId::EnvironmentOps),
        Some(Topology::Loop { max_round_trips: 2 })
    );
    assert_eq!(config.topology_for(HandlerId::LaunchpadOps), None);
    Ok(())
}

#[test]
fn unknown_route_in_config_is_rejected() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"{{"domains": {{"billing-ops": {{"topology": "loop"}}}}}}"#)?;

    let error = EngineConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(error, BrainFlowError::Config(ref message) if message.contains("billing-ops")));
    Ok(())
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = EngineConfig::from_file(dir.path().join("engine.json")).unwrap_err();
    assert!(matches!(error, BrainFlowError::Config(_)));
}

#[test]
fn loaded_config_drives_graph_topology() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"{{"default_max_round_trips": 4, "domains": {{"launchpad-ops": {{"topology": "loop"}}}}}}"#)?;

    let graph = WorkflowGraph::builder()
        .client(Arc::new(ScriptedClient::default()))
        .defaults(ModelDefaults::default())
        .config(EngineConfig::from_file(file.path())?)
        .build()?;

    assert_eq!(
        graph.topology(HandlerId::LaunchpadOps),
        Some(Topology::Loop { max_round_trips: 4 })
    );
    assert_eq!(graph.topology(HandlerId::ProjectOverview), Some(Topology::Terminate));
    Ok(())
}

#[test]
fn model_defaults_prefer_proxy_settings() {
    let defaults = ModelDefaults::default().with_proxy(
        Some("http://proxy/v1".into()),
        Some("proxy-model".into()),
        Some("sk-proxy".into()),
    );
    assert_eq!(defaults.proxy_base_url.as_deref(), Some("http://proxy/v1"));
    assert!(!format!("{defaults:?}").contains("sk-proxy"));
}
