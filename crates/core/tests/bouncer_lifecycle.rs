//! Integration tests for the session lifecycle across several calls.

use std::sync::Arc;

use lapi_core::testing::{MemoryCredentialStore, ScriptedTransport};
use lapi_core::Bouncer;
use lapi_domain::{LapiError, RawConfig};
use serde_json::{json, Map};

fn bouncer(
    transport: &Arc<ScriptedTransport>,
    store: &MemoryCredentialStore,
    scenarios: &[&str],
) -> Bouncer {
    let config = RawConfig {
        api_url: Some("https://lapi.example/v1/".into()),
        machine_id_prefix: Some("rust".into()),
        ..RawConfig::with_scenarios(scenarios.iter().copied())
    }
    .validate()
    .expect("valid configuration");
    Bouncer::new(config, transport.clone(), Arc::new(store.clone()))
}

#[test]
fn session_survives_across_calls() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_json(201, &json!({}));
    transport.push_json(200, &json!({"token": "t1"}));
    transport.push_json(200, &json!({"new": [{"value": "1.2.3.4"}], "deleted": null}));
    transport.push_json(200, &json!({"new": null, "deleted": null}));
    let store = MemoryCredentialStore::new();
    let bouncer = bouncer(&transport, &store, &["crowdsecurity/ssh-bf"]);

    let first = bouncer.get_stream_decisions(true, Map::new()).expect("startup stream");
    let second = bouncer.get_stream_decisions(false, Map::new()).expect("delta stream");

    assert_eq!(first["new"][0]["value"], "1.2.3.4");
    assert_eq!(second, json!({"new": null, "deleted": null}));

    // register + login happen once, then both stream calls reuse the token
    let sent = transport.requests();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[2].parameters(), &json!({"startup": "true"}));
    assert_eq!(sent[3].parameters(), &json!({}));
    assert_eq!(sent[3].headers().get("authorization"), Some("Bearer t1"));
}

#[test]
fn new_scenarios_trigger_one_login_then_reuse() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_json(200, &json!({"token": "t2"}));
    transport.push_json(200, &json!([]));
    transport.push_json(200, &json!([]));
    let store = MemoryCredentialStore::new()
        .with_credentials("rust-existing-machine", "password")
        .with_session("t1", &["crowdsecurity/ssh-bf"]);
    let bouncer = bouncer(&transport, &store, &["crowdsecurity/http-probing", "crowdsecurity/ssh-bf"]);

    bouncer.get_filtered_decisions(Map::new()).expect("first call");
    bouncer.get_filtered_decisions(Map::new()).expect("second call");

    assert_eq!(transport.requests().len(), 3);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.token.as_deref(), Some("t2"));
    assert_eq!(
        snapshot.scenarios,
        Some(vec!["crowdsecurity/http-probing".to_string(), "crowdsecurity/ssh-bf".to_string()])
    );
}

#[test]
fn client_allows_custom_requests() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_json(200, &json!({"version": "1.6.0"}));
    let store = MemoryCredentialStore::new();
    let bouncer = bouncer(&transport, &store, &["crowdsecurity/ssh-bf"]);

    let headers = lapi_domain::Headers::new().with("User-Agent", "custom/v1");
    let value = bouncer.client().request("get", "/health", json!({}), headers).expect("custom call");

    assert_eq!(value["version"], "1.6.0");
    assert_eq!(transport.requests()[0].uri(), "https://lapi.example/v1/health");
}

#[test]
fn missing_user_agent_is_a_client_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let store = MemoryCredentialStore::new();
    let bouncer = bouncer(&transport, &store, &["crowdsecurity/ssh-bf"]);

    let err = bouncer
        .client()
        .request("GET", "/health", json!({}), lapi_domain::Headers::new())
        .expect_err("no user agent");

    assert!(matches!(err, LapiError::Transport(_)));
    assert_eq!(err.status_code(), Some(400));
    assert!(transport.requests().is_empty());
}
