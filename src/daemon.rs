use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Json, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::config_store::{ConfigStore, Hosts, Settings};
use crate::error::{ElectrosError, Result};
use crate::services::probe::HttpProbe;
use crate::status::StatusTracker;

const INDEX_HTML: &str = include_str!("../web/electros.html");

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub tracker: Arc<StatusTracker>,
    pub page: String,
    pub web_root: Option<PathBuf>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = match &config.data_dir {
            Some(dir) => ConfigStore::new(dir),
            None => ConfigStore::default_location()?,
        };
        let probe = HttpProbe::with_timeout(Duration::from_secs(config.probe_timeout_secs))?;
        Ok(Self {
            store: Arc::new(store),
            tracker: Arc::new(StatusTracker::new(
                Arc::new(probe),
                config.first_observation,
            )),
            page: config.page.trim_start_matches('/').to_string(),
            web_root: config.web_root.clone(),
        })
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Deserialize)]
struct EchoRequest {
    x: String,
}

#[derive(Deserialize)]
struct CheckStatusRequest {
    url: String,
}

#[derive(Serialize, Deserialize)]
pub struct Configurations {
    pub config: Settings,
    pub hosts: Hosts,
}

#[derive(Deserialize)]
struct UpdateRequest {
    #[serde(default)]
    config_updates: Settings,
    #[serde(default)]
    hosts_updates: Hosts,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/echo", post(echo))
        .route("/api/check_status", post(check_status))
        .route("/api/status", get(status_snapshot))
        .route("/api/configurations", get(get_configurations))
        .route("/api/modify_configurations", post(modify_configurations))
        .route("/api/update_configurations", post(update_configurations))
        .route("/api/config", get(read_config).post(write_config))
        .route("/api/hosts", get(read_hosts).post(write_hosts))
        .route("/status_events", get(status_events))
        .fallback(static_file)
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn echo(Json(payload): Json<EchoRequest>) -> Json<String> {
    Json(format!("Hello from Electros! You sent: {}", payload.x))
}

async fn check_status(
    State(state): State<AppState>,
    Json(payload): Json<CheckStatusRequest>,
) -> Json<bool> {
    Json(state.tracker.check(&payload.url).await)
}

async fn status_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.tracker.snapshot().await)
}

async fn get_configurations(State(state): State<AppState>) -> Json<Configurations> {
    let (config, hosts) = state.store.read();
    Json(Configurations { config, hosts })
}

async fn modify_configurations(
    State(state): State<AppState>,
    Json(payload): Json<Configurations>,
) -> Json<bool> {
    info!(
        config = ?payload.config,
        hosts = ?payload.hosts,
        "modifying configurations"
    );
    match state.store.write(&payload.config, &payload.hosts) {
        Ok(()) => Json(true),
        Err(err) => {
            error!("Error: Unable to write configurations: {err}");
            Json(false)
        }
    }
}

async fn update_configurations(
    State(state): State<AppState>,
    Json(payload): Json<UpdateRequest>,
) -> Json<bool> {
    match state
        .store
        .update(payload.config_updates, payload.hosts_updates)
    {
        Ok(()) => Json(true),
        Err(err) => {
            error!("Error: Unable to update configurations: {err}");
            Json(false)
        }
    }
}

async fn read_config(State(state): State<AppState>) -> Json<Settings> {
    Json(state.store.read().0)
}

async fn read_hosts(State(state): State<AppState>) -> Json<Hosts> {
    Json(state.store.read().1)
}

/// Accepts either the bare settings object or one wrapped as `{"config": {...}}`.
pub fn unwrap_settings(body: Settings) -> Settings {
    if body.len() == 1 {
        if let Some(Value::Object(inner)) = body.get("config") {
            return inner.clone();
        }
    }
    body
}

async fn write_config(
    State(state): State<AppState>,
    Json(payload): Json<Settings>,
) -> Json<bool> {
    let settings = unwrap_settings(payload);
    match state.store.write_settings(&settings) {
        Ok(()) => Json(true),
        Err(err) => {
            error!("Error: Unable to write settings: {err}");
            Json(false)
        }
    }
}

async fn write_hosts(State(state): State<AppState>, Json(payload): Json<Hosts>) -> Json<bool> {
    match state.store.write_hosts(&payload) {
        Ok(()) => Json(true),
        Err(err) => {
            error!("Error: Unable to write hosts: {err}");
            Json(false)
        }
    }
}

async fn status_events(State(state): State<AppState>) -> impl IntoResponse {
    let mut receiver = state.tracker.subscribe();

    let body = Body::from_stream(async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(transition) => {
                    let payload = serde_json::to_string(&transition).unwrap_or_default();
                    let line = format!("data: {}\n\n", payload);
                    yield Ok::<Bytes, std::convert::Infallible>(Bytes::from(line));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    continue;
                }
                Err(_) => break,
            }
        }
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
}

async fn static_file(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    if path == state.page {
        return Html(INDEX_HTML).into_response();
    }
    let Some(file) = state
        .web_root
        .as_deref()
        .and_then(|root| resolve_static_path(root, uri.path()))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Maps a request path onto `root`, refusing anything that climbs out of it.
pub fn resolve_static_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') => return None,
            s => out.push(s),
        }
    }
    (out.as_path() != root).then_some(out)
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

pub async fn bind(config: &AppConfig) -> Result<TcpListener> {
    let addr = config.bind_addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|e| ElectrosError::Runtime(format!("unable to bind {addr}: {e}")))
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, dir = %state.store.dir().display(), "electros service listening");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ElectrosError::Runtime(e.to_string()))?;
    Ok(())
}
