//! HTTP API tests through Rocket's local client

use rocket::http::Status;
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::UdpSocket;
use virjoy::bridge::{Connector, MemoryVariables, ServiceCall, VariableBridge, VariableMap};
use virjoy::config::ServerConfig;
use virjoy::context::CockpitContext;
use virjoy::engine::ControlEngine;
use virjoy::headtrack::{decode, HeadTracker, WireLayout};
use virjoy::profile::ProfileRegistry;
use virjoy::server;
use virjoy_device::{ActuationSink, AxisId, MemorySink};

const MAPPING: &str = r#"{"vars": [
    {"key": "FLAPS_OVERRIDE", "lvar": "L:FLAPS_TGT"},
    {"key": "GEAR_TOGGLE", "lvar": "(>K:GEAR_TOGGLE)"}
]}"#;

struct Harness {
    client: Client,
    cockpit: MemorySink,
    vars: MemoryVariables,
}

async fn harness_with(bridge_installed: bool, camera: bool) -> Harness {
    let cockpit = MemorySink::new("cockpit");
    let camera: Option<Box<dyn ActuationSink>> = if camera {
        Some(Box::new(MemorySink::new("camera")))
    } else {
        None
    };
    let engine = ControlEngine::new(Some(Box::new(cockpit.clone())), camera);

    let vars = MemoryVariables::new().with_value("L:FLAPS_TGT", 5.0);
    let connector: Option<Arc<dyn Connector>> = if bridge_installed {
        Some(Arc::new(vars.clone()))
    } else {
        None
    };
    let bridge = VariableBridge::new(VariableMap::from_json(MAPPING).unwrap(), connector);

    let ctx = CockpitContext::new(
        ProfileRegistry::with_builtins(),
        engine,
        bridge,
        HeadTracker::default(),
    );
    let rocket = server::rocket(Arc::new(ctx), &ServerConfig::default());
    Harness {
        client: Client::tracked(rocket).await.unwrap(),
        cockpit,
        vars,
    }
}

async fn harness() -> Harness {
    harness_with(true, true).await
}

async fn body(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.unwrap()
}

#[rocket::async_test]
async fn test_update_sim_success() {
    let h = harness().await;
    let response = h
        .client
        .post("/update_sim")
        .json(&json!({"type": "brakes", "value": 0.4}))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response).await, json!({"status": "success"}));
    assert_eq!(h.cockpit.get_axis(AxisId::X), 13107);
}

#[rocket::async_test]
async fn test_update_sim_client_errors() {
    let h = harness().await;

    let response = h.client.post("/update_sim").json(&json!({})).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await, json!({"error": "missing_type"}));

    let response = h
        .client
        .post("/update_sim")
        .json(&json!({"type": "throttle", "value": "full"}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await, json!({"error": "invalid_value"}));

    let response = h.client.post("/update_sim").body("not json").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    assert!(h.cockpit.events().is_empty());
}

#[rocket::async_test]
async fn test_update_sim_ignored_and_unknown() {
    let h = harness().await;

    let response = h
        .client
        .post("/update_sim")
        .json(&json!({"type": "cam_control", "active": false}))
        .dispatch()
        .await;
    assert_eq!(body(response).await, json!({"status": "ignored"}));

    let response = h
        .client
        .post("/update_sim")
        .json(&json!({"type": "ap_update", "mode": "spd", "value": 250}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response).await, json!({"status": "success"}));
}

#[rocket::async_test]
async fn test_missing_device_is_server_error() {
    let h = harness_with(true, false).await;
    let response = h
        .client
        .post("/update_sim")
        .json(&json!({"type": "cam_control", "active": true, "val_x": 0.5}))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);
    assert_eq!(body(response).await, json!({"error": "No camera head device"}));
}

#[rocket::async_test]
async fn test_lvars_read_write_step() {
    let h = harness().await;

    let response = h.client.get("/lvars").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(body(response).await, json!({"FLAPS_OVERRIDE": 5.0}));

    let response = h
        .client
        .post("/lvars")
        .json(&json!({"key": "FLAPS_OVERRIDE", "value": "15"}))
        .dispatch()
        .await;
    assert_eq!(body(response).await, json!({"status": "ok"}));
    assert!(h
        .vars
        .calls()
        .contains(&ServiceCall::Set("15.0 (>L:FLAPS_TGT)".to_string())));

    let response = h
        .client
        .post("/lvars/step")
        .json(&json!({"key": "FLAPS_OVERRIDE", "delta": -5}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(h.vars.value("L:FLAPS_TGT"), Some(10.0));
}

#[rocket::async_test]
async fn test_lvars_errors() {
    let h = harness().await;

    let response = h
        .client
        .post("/lvars")
        .json(&json!({"key": "FLAPS_OVERRIDE"}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await, json!({"error": "missing_key_or_value"}));

    let response = h
        .client
        .post("/lvars/step")
        .json(&json!({"key": "FLAPS_OVERRIDE", "delta": "lots"}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await, json!({"error": "invalid_delta"}));

    let response = h
        .client
        .post("/lvars/step")
        .json(&json!({"key": "NOPE", "delta": 1}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await, json!({"error": "unknown_key"}));
}

#[rocket::async_test]
async fn test_lvars_without_service() {
    let h = harness_with(false, true).await;
    let response = h.client.get("/lvars").dispatch().await;
    assert_eq!(response.status(), Status::ServiceUnavailable);
    assert_eq!(
        body(response).await,
        json!({"error": "mobiflight_module_not_installed"})
    );
}

#[rocket::async_test]
async fn test_profiles() {
    let h = harness().await;

    let response = h.client.get("/profiles").dispatch().await;
    let listing = body(response).await;
    assert_eq!(listing["default"], "pmdg_777");
    assert_eq!(listing["profiles"].as_array().unwrap().len(), 3);

    let response = h.client.get("/profiles/fenix_a320").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let profile = body(response).await;
    assert_eq!(profile["id"], "fenix_a320");
    assert!(profile["camera_config"].as_array().is_some());

    let response = h.client.get("/profiles/concorde").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_headtrack_config_and_sample() {
    let h = harness().await;
    let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let response = h
        .client
        .post("/headtrack/config")
        .json(&json!({"port": port, "layout": "legacy"}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let config = body(response).await;
    assert_eq!(config["port"], port);
    assert_eq!(config["host"], "localhost");

    let response = h
        .client
        .post("/headtrack/config")
        .json(&json!({"smoothing": 2}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(body(response).await, json!({"error": "invalid_config"}));

    let response = h.client.get("/headtrack/config").dispatch().await;
    assert_eq!(body(response).await["layout"], "legacy");

    let response = h
        .client
        .post("/headtrack")
        .json(&json!({"yaw": "10.5", "pitch": -2}))
        .dispatch()
        .await;
    assert_eq!(body(response).await, json!({"status": "ok"}));

    let mut buf = [0u8; 64];
    let (n, _) = listener.recv_from(&mut buf).await.unwrap();
    let (layout, pose) = decode(&buf[..n]).unwrap();
    assert_eq!(layout, WireLayout::Legacy);
    assert_eq!(pose.yaw, 10.5);
    assert_eq!(pose.pitch, -2.0);
}

#[rocket::async_test]
async fn test_cors_and_not_found() {
    let h = harness().await;

    let response = h.client.options("/update_sim").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );

    let response = h.client.get("/nowhere").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(body(response).await, json!({"error": "not_found"}));
}
