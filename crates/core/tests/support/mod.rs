//! In-process stand-in for the lines backend.
//!
//! Serves the line endpoints from memory on an ephemeral local port and
//! records every request it receives so tests can assert on the exact wire
//! traffic.

use std::sync::{Arc, Mutex};

use atomo_core::api::{EtaEntry, OcrImport, Stop};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::oneshot;

#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedImage {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug)]
struct FakeLine {
    id: u64,
    name: String,
    description: String,
    stops: Vec<Stop>,
    schedules: Vec<String>,
}

impl FakeLine {
    /// Integer ids, like a database-backed backend would return.
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "stops": self.stops,
            "schedules": self.schedules,
        })
    }
}

#[derive(Default)]
pub struct Backend {
    lines: Vec<FakeLine>,
    next_id: u64,
    requests: Vec<Recorded>,
    images: Vec<ReceivedImage>,
    recognition: OcrImport,
    etas: Vec<EtaEntry>,
    fail_with: Option<StatusCode>,
}

type Shared = Arc<Mutex<Backend>>;

pub struct FakeBackend {
    state: Shared,
    port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            state,
            port,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn images(&self) -> Vec<ReceivedImage> {
        self.state.lock().unwrap().images.clone()
    }

    pub fn set_recognition(&self, recognition: OcrImport) {
        self.state.lock().unwrap().recognition = recognition;
    }

    pub fn set_etas(&self, etas: Vec<EtaEntry>) {
        self.state.lock().unwrap().etas = etas;
    }

    /// Answer every following request with `status`, or stop doing so.
    pub fn fail_with(&self, status: Option<StatusCode>) {
        self.state.lock().unwrap().fail_with = status;
    }

    pub fn delete_line(&self, id: u64) {
        self.state.lock().unwrap().lines.retain(|l| l.id != id);
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/lines", get(list_lines).post(create_line))
        .route(
            "/api/lines/{id}/stops",
            post(append_stop).patch(patch_stop).delete(delete_stop),
        )
        .route("/api/lines/{id}/schedules", put(replace_schedules))
        .route("/api/lines/{id}/eta", get(line_etas))
        .route("/api/ocr/upload", post(upload))
        .with_state(state)
}

/// Record the request; answer with the scripted failure if there is one.
fn record(
    backend: &mut Backend,
    method: &'static str,
    path: String,
    body: Option<Value>,
) -> Result<(), StatusCode> {
    backend.requests.push(Recorded { method, path, body });
    match backend.fail_with {
        Some(status) => Err(status),
        None => Ok(()),
    }
}

fn line_mut(backend: &mut Backend, id: u64) -> Result<&mut FakeLine, StatusCode> {
    backend
        .lines
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_lines(State(state): State<Shared>) -> Result<Json<Value>, StatusCode> {
    let mut backend = state.lock().unwrap();
    record(&mut backend, "GET", "/api/lines".into(), None)?;

    let lines: Vec<Value> = backend.lines.iter().map(FakeLine::to_json).collect();
    Ok(Json(Value::Array(lines)))
}

async fn create_line(State(state): State<Shared>, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    let mut backend = state.lock().unwrap();
    record(&mut backend, "POST", "/api/lines".into(), Some(body.clone()))?;

    let stops: Vec<Stop> =
        serde_json::from_value(body["stops"].clone()).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    let schedules: Vec<String> =
        serde_json::from_value(body["schedules"].clone()).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    backend.next_id += 1;
    let line = FakeLine {
        id: backend.next_id,
        name: body["name"].as_str().unwrap_or_default().to_string(),
        description: body["description"].as_str().unwrap_or_default().to_string(),
        stops,
        schedules,
    };
    let response = line.to_json();
    backend.lines.push(line);

    Ok(Json(response))
}

async fn append_stop(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut backend = state.lock().unwrap();
    record(&mut backend, "POST", format!("/api/lines/{id}/stops"), Some(body.clone()))?;

    let stop: Stop = serde_json::from_value(body).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    let line = line_mut(&mut backend, id)?;
    line.stops.push(stop);

    Ok(Json(line.to_json()))
}

async fn patch_stop(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut backend = state.lock().unwrap();
    record(&mut backend, "PATCH", format!("/api/lines/{id}/stops"), Some(body.clone()))?;

    let index = body["index"].as_u64().ok_or(StatusCode::UNPROCESSABLE_ENTITY)? as usize;
    let line = line_mut(&mut backend, id)?;
    let stop = line.stops.get_mut(index).ok_or(StatusCode::BAD_REQUEST)?;

    if let Some(name) = body.get("name").and_then(Value::as_str) {
        stop.name = name.to_string();
    }
    if let Some(minutes) = body.get("travel_minutes_from_prev").and_then(Value::as_u64) {
        stop.travel_minutes_from_prev = minutes as u32;
    }

    Ok(Json(json!({"ok": true})))
}

async fn delete_stop(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<StatusCode, StatusCode> {
    let mut backend = state.lock().unwrap();
    record(&mut backend, "DELETE", format!("/api/lines/{id}/stops"), Some(body.clone()))?;

    let index = body["index"].as_u64().ok_or(StatusCode::UNPROCESSABLE_ENTITY)? as usize;
    let line = line_mut(&mut backend, id)?;
    if index >= line.stops.len() {
        return Err(StatusCode::BAD_REQUEST);
    }
    line.stops.remove(index);

    // Empty acknowledgement
    Ok(StatusCode::NO_CONTENT)
}

async fn replace_schedules(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut backend = state.lock().unwrap();
    record(&mut backend, "PUT", format!("/api/lines/{id}/schedules"), Some(body.clone()))?;

    let schedules: Vec<String> =
        serde_json::from_value(body["schedules"].clone()).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    line_mut(&mut backend, id)?.schedules = schedules;

    Ok(Json(json!({"ok": true})))
}

#[derive(Deserialize)]
struct EtaQuery {
    from_stop_index: usize,
}

async fn line_etas(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Query(query): Query<EtaQuery>,
) -> Result<Json<Value>, StatusCode> {
    let mut backend = state.lock().unwrap();
    record(
        &mut backend,
        "GET",
        format!("/api/lines/{id}/eta?from_stop_index={}", query.from_stop_index),
        None,
    )?;
    line_mut(&mut backend, id)?;

    Ok(Json(json!({"etas": backend.etas})))
}

async fn upload(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut received = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        received.push(ReceivedImage {
            field: name,
            file_name,
            content_type,
            bytes,
        });
    }

    let mut backend = state.lock().unwrap();
    if let Err(status) = record(&mut backend, "POST", "/api/ocr/upload".into(), None) {
        return status.into_response();
    }

    let has_image = received.iter().any(|f| f.field == "image");
    backend.images.extend(received);
    if !has_image {
        return StatusCode::BAD_REQUEST.into_response();
    }

    Json(backend.recognition.clone()).into_response()
}
