//! HTTP JSON surface
//!
//! Thin adapter over [`CockpitContext`]: request bodies are validated here,
//! errors become `{"error": code}` with a matching status.

use crate::bridge::BridgeError;
use crate::config::ServerConfig;
use crate::context::CockpitContext;
use crate::engine::event::number;
use crate::engine::{ControlEvent, ControlRequest};
use crate::headtrack::{HeadTrackPatch, PoseSample};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::{json, Error as JsonError, Json, Value};
use rocket::{catch, catchers, get, options, post, routes};
use rocket::{Build, Request, Response, Rocket, State};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

type ApiResponse = (Status, Json<Value>);

fn ok(body: Value) -> ApiResponse {
    (Status::Ok, Json(body))
}

fn error(status: Status, code: &str) -> ApiResponse {
    (status, Json(json!({ "error": code })))
}

fn bridge_error(e: &BridgeError) -> ApiResponse {
    let status = match e {
        e if e.is_unavailable() => Status::ServiceUnavailable,
        BridgeError::UnknownKey(_) => Status::NotFound,
        BridgeError::NotReadable(_) | BridgeError::InvalidDelta => Status::BadRequest,
        _ => Status::BadGateway,
    };
    debug!("Variable request failed: {}", e);
    error(status, e.code())
}

/// Build the server with its routes and shared state
pub fn rocket(ctx: Arc<CockpitContext>, server: &ServerConfig) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", server.address.as_str()))
        .merge(("port", server.port));

    rocket::custom(figment)
        .attach(CORS)
        .manage(ctx)
        .mount(
            "/",
            routes![
                all_options,
                update_sim,
                get_lvars,
                set_lvar,
                step_lvar,
                get_headtrack_config,
                set_headtrack_config,
                headtrack_sample,
                list_profiles,
                get_profile,
            ],
        )
        .register("/", catchers![not_found, internal_error])
}

#[post("/update_sim", data = "<body>")]
async fn update_sim(
    ctx: &State<Arc<CockpitContext>>,
    body: Result<Json<ControlRequest>, JsonError<'_>>,
) -> ApiResponse {
    let Ok(Json(request)) = body else {
        return error(Status::BadRequest, "invalid_json");
    };
    let event = match ControlEvent::from_request(&request) {
        Ok(event) => event,
        Err(e) => return error(Status::BadRequest, &e.code()),
    };
    let profile = ctx.profiles.resolve(request.profile.as_deref());

    match ctx.engine.apply(&event, &profile).await {
        Ok(applied) => ok(json!({ "status": applied.outcome.as_str() })),
        Err(e) => {
            warn!("{:?} failed: {}", event.kind(), e);
            error(Status::InternalServerError, &e.to_string())
        }
    }
}

#[get("/lvars?<profile>")]
async fn get_lvars(ctx: &State<Arc<CockpitContext>>, profile: Option<&str>) -> ApiResponse {
    let profile = ctx.profiles.resolve(profile);
    match ctx.bridge.read_all(&profile.id).await {
        Ok(values) => ok(json!(values)),
        Err(e) => bridge_error(&e),
    }
}

#[derive(Debug, Default, Deserialize)]
struct VariableWrite {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    profile: Option<String>,
}

#[post("/lvars", data = "<body>")]
async fn set_lvar(
    ctx: &State<Arc<CockpitContext>>,
    body: Result<Json<VariableWrite>, JsonError<'_>>,
) -> ApiResponse {
    let Ok(Json(request)) = body else {
        return error(Status::BadRequest, "invalid_json");
    };
    let (Some(key), Some(_)) = (&request.key, &request.value) else {
        return error(Status::BadRequest, "missing_key_or_value");
    };
    let value = match number("value", &request.value, 0.0) {
        Ok(value) => value,
        Err(e) => return error(Status::BadRequest, &e.code()),
    };

    let profile = ctx.profiles.resolve(request.profile.as_deref());
    match ctx.bridge.write(&profile.id, key, value).await {
        Ok(()) => ok(json!({ "status": "ok" })),
        Err(e) => bridge_error(&e),
    }
}

#[derive(Debug, Default, Deserialize)]
struct VariableStep {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    delta: Option<Value>,
    #[serde(default)]
    profile: Option<String>,
}

#[post("/lvars/step", data = "<body>")]
async fn step_lvar(
    ctx: &State<Arc<CockpitContext>>,
    body: Result<Json<VariableStep>, JsonError<'_>>,
) -> ApiResponse {
    let Ok(Json(request)) = body else {
        return error(Status::BadRequest, "invalid_json");
    };
    let (Some(key), Some(_)) = (&request.key, &request.delta) else {
        return error(Status::BadRequest, "missing_key_or_delta");
    };
    let delta = match number("delta", &request.delta, 0.0) {
        Ok(delta) => delta,
        Err(e) => return error(Status::BadRequest, &e.code()),
    };

    let profile = ctx.profiles.resolve(request.profile.as_deref());
    match ctx.bridge.step(&profile.id, key, delta).await {
        Ok(()) => ok(json!({ "status": "ok" })),
        Err(e) => bridge_error(&e),
    }
}

#[get("/headtrack/config")]
fn get_headtrack_config(ctx: &State<Arc<CockpitContext>>) -> ApiResponse {
    ok(json!(ctx.headtrack.config()))
}

#[post("/headtrack/config", data = "<body>")]
fn set_headtrack_config(
    ctx: &State<Arc<CockpitContext>>,
    body: Result<Json<HeadTrackPatch>, JsonError<'_>>,
) -> ApiResponse {
    let Ok(Json(patch)) = body else {
        return error(Status::BadRequest, "invalid_config");
    };
    match ctx.headtrack.update_config(&patch) {
        Ok(config) => ok(json!(config)),
        Err(e) => error(Status::BadRequest, e.code()),
    }
}

#[post("/headtrack", data = "<body>")]
async fn headtrack_sample(
    ctx: &State<Arc<CockpitContext>>,
    body: Result<Json<PoseSample>, JsonError<'_>>,
) -> ApiResponse {
    let pose = match body.map(|Json(sample)| sample.into_pose()) {
        Ok(Ok(pose)) => pose,
        _ => return error(Status::BadRequest, "invalid_sample"),
    };
    match ctx.headtrack.send(&pose).await {
        Ok(_) => ok(json!({ "status": "ok" })),
        Err(e) => {
            warn!("Head-track send failed: {}", e);
            error(Status::InternalServerError, e.code())
        }
    }
}

#[get("/profiles")]
fn list_profiles(ctx: &State<Arc<CockpitContext>>) -> ApiResponse {
    let profiles: Vec<Value> = ctx
        .profiles
        .all_profiles()
        .iter()
        .map(|p| json!({ "id": p.id, "name": p.name, "family": p.family }))
        .collect();
    ok(json!({
        "default": ctx.profiles.default_id(),
        "profiles": profiles,
    }))
}

#[get("/profiles/<id>")]
fn get_profile(ctx: &State<Arc<CockpitContext>>, id: &str) -> ApiResponse {
    match ctx.profiles.find(id) {
        Some(profile) => ok(json!(*profile)),
        None => error(Status::NotFound, "unknown_profile"),
    }
}

#[catch(404)]
fn not_found() -> Value {
    json!({ "error": "not_found" })
}

#[catch(500)]
fn internal_error() -> Value {
    json!({ "error": "internal_error" })
}

pub struct CORS;

/// Catches all OPTION requests in order to get the CORS related Fairing triggered.
#[options("/<_..>")]
fn all_options() {}

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}
