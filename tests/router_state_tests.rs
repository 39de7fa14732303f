use brainflow::state::reducer::merge_messages;
use brainflow::state::ResourceContext;
use brainflow::{
    route, BrainFlowError, ConversationState, DomainContext, HandlerId, Message, ResourceKind,
    Route, StateUpdate,
};
use serde_json::json;

fn state_with_route(route: Option<&str>) -> ConversationState {
    let mut state = ConversationState::new("", "hi");
    state.route = route.map(str::to_string);
    state
}

#[test]
fn router_is_total_over_route_values() {
    for id in HandlerId::ALL {
        assert_eq!(route(&state_with_route(Some(id.as_str()))), Route::Handler(id));
    }
    for other in [None, Some(""), Some("unknown-domain"), Some("Cluster-Ops"), Some(" cluster-ops")] {
        assert_eq!(route(&state_with_route(other)), Route::Terminate, "{other:?}");
    }
}

#[test]
fn reducer_appends_then_replaces_by_identity() -> anyhow::Result<()> {
    let mut log = vec![Message::user("a").with_id("a"), Message::assistant("b").with_id("b")];
    merge_messages(
        &mut log,
        vec![Message::user("c").with_id("c"), Message::assistant("d").with_id("d")],
    )?;
    let ids: Vec<_> = log.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c", "d"]);

    merge_messages(&mut log, vec![Message::assistant("b2").with_id("b")])?;
    assert_eq!(log.len(), 4);
    assert_eq!(log[1].content, "b2");
    Ok(())
}

#[test]
fn applying_the_same_update_twice_is_idempotent() -> anyhow::Result<()> {
    let update = StateUpdate::messages(vec![
        Message::assistant("x").with_id("x"),
        Message::assistant("y").with_id("y"),
    ]);

    let mut once = ConversationState::new("cluster-ops", "hi");
    once.apply(update.clone())?;
    let mut twice = once.clone();
    twice.apply(update)?;

    assert_eq!(once.messages, twice.messages);
    Ok(())
}

#[test]
fn update_without_identity_is_malformed() {
    let mut state = ConversationState::new("cluster-ops", "hi");
    let error = state
        .apply(StateUpdate::message(Message::assistant("nameless").with_id("")))
        .unwrap_err();
    assert!(matches!(error, BrainFlowError::MalformedUpdate(_)));
    assert_eq!(state.messages.len(), 1);
}

#[test]
fn state_deserializes_from_front_end_shape() -> anyhow::Result<()> {
    let state: ConversationState = serde_json::from_value(json!({
        "credentials": "a2luZDogQ29uZmln",
        "modelConfig": {"baseURL": "http://localhost/v1", "apiKey": "sk", "modelName": "m", "trial": false},
        "domainContext": {"domain": "resource", "name": "db-1", "kind": "cluster", "status": "paused", "replicas": 3},
        "messages": [{"role": "user", "content": "start db-1"}],
        "route": "resource-ops"
    }))?;

    assert_eq!(route(&state), Route::Handler(HandlerId::ResourceOps));
    assert_eq!(state.context.resource_kind(), Some(ResourceKind::Database));
    match &state.context {
        DomainContext::Resource(ResourceContext { name, status, extra, .. }) => {
            assert_eq!(name, "db-1");
            assert_eq!(status.as_deref(), Some("paused"));
            assert_eq!(extra["replicas"], 3);
        }
        other => panic!("unexpected context {other:?}"),
    }
    assert!(!format!("{state:?}").contains("a2luZDogQ29uZmln"));
    assert!(!state.messages[0].id.is_empty());
    Ok(())
}
