// apiserver.rs

use askama::Template;
use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    http::{header, HeaderValue, Response},
    response::Html,
    response::IntoResponse,
    routing::*,
    Json, Router,
};
pub use axum_macros::debug_handler;
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::*;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    board: &'a str,
    fw_version: &'a str,
}

#[derive(Template)]
#[template(path = "camera.html")]
struct CameraTemplate<'a> {
    board: &'a str,
    width: u32,
    height: u32,
    refresh_ms: u64,
}

const CAMERA_REFRESH_MS: u64 = 1000;

#[derive(Debug, Serialize)]
pub struct StatusReply {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ScanReply {
    pub networks: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub error: String,
}

pub fn build_router(state: Arc<Pin<Box<MyState>>>) -> Router {
    // every capture is a fresh frame, browsers must not reuse an old one
    let no_cache =
        SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Router::new()
        .route("/", get(get_index))
        .route("/api/status", get(get_status))
        .route("/api/led/toggle", post(toggle_led))
        .route("/api/wifi/scan", post(scan_wifi))
        .route("/api/restart", post(restart))
        .route("/camera", get(get_camera_page))
        .route("/api/camera/capture", get(get_capture).layer(no_cache))
        .with_state(state)
}

pub async fn run_api_server(state: Arc<Pin<Box<MyState>>>) -> anyhow::Result<()> {
    let listen = format!("0.0.0.0:{}", state.config.port);
    let addr = listen.parse::<SocketAddr>()?;

    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening to {listen}");

    let ip = *state.ip_addr.read().await;
    info!("Access monitoring system at: http://{ip}");
    if state.camera_ready() {
        info!("Camera stream available at: http://{ip}/camera");
    }

    Ok(axum::serve(listener, app.into_make_service()).await?)
}

#[debug_handler]
pub async fn get_index(State(state): State<Arc<Pin<Box<MyState>>>>) -> Response<Body> {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_index()");

    let page = IndexTemplate {
        board: BOARD_NAME,
        fw_version: FW_VERSION,
    };
    match page.render() {
        Err(e) => {
            let err_msg = format!("Index template error: {e:?}\n");
            error!("{err_msg}");
            (StatusCode::INTERNAL_SERVER_ERROR, err_msg).into_response()
        }
        Ok(s) => (StatusCode::OK, Html(s)).into_response(),
    }
}

#[debug_handler]
pub async fn get_status(State(state): State<Arc<Pin<Box<MyState>>>>) -> (StatusCode, Json<SystemStats>) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_status()");

    (StatusCode::OK, Json(state.snapshot()))
}

#[debug_handler]
pub async fn toggle_led(State(state): State<Arc<Pin<Box<MyState>>>>) -> (StatusCode, Json<StatusReply>) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} toggle_led()");

    let status = match state.toggle_led() {
        true => "ON",
        false => "OFF",
    };
    (StatusCode::OK, Json(StatusReply { status }))
}

#[debug_handler]
pub async fn scan_wifi(State(state): State<Arc<Pin<Box<MyState>>>>) -> (StatusCode, Json<ScanReply>) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} scan_wifi()");

    let res = lock(&state.radio).scan();
    let networks = match res {
        Ok(aps) => aps.len(),
        Err(e) => {
            error!("WiFi scan failed: {e:#}");
            0
        }
    };
    (StatusCode::OK, Json(ScanReply { networks }))
}

#[debug_handler]
pub async fn restart(State(state): State<Arc<Pin<Box<MyState>>>>) -> (StatusCode, Json<StatusReply>) {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} restart()");

    // the reply has to reach the client before the chip goes down
    let delay = state.config.restart_delay;
    tokio::spawn(async move {
        sleep(delay).await;
        warn!("Restarting now.");
        state.system.restart();
    });

    (StatusCode::OK, Json(StatusReply { status: "restarting" }))
}

#[debug_handler]
pub async fn get_camera_page(State(state): State<Arc<Pin<Box<MyState>>>>) -> Response<Body> {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_camera_page()");

    if !state.camera_ready() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Camera not initialized",
        )
            .into_response();
    }

    let profile = lock(&state.camera).profile();
    let (width, height) = profile.map(|p| p.frame_size.dimensions()).unwrap_or_default();
    let page = CameraTemplate {
        board: BOARD_NAME,
        width,
        height,
        refresh_ms: CAMERA_REFRESH_MS,
    };
    match page.render() {
        Err(e) => {
            let err_msg = format!("Camera template error: {e:?}\n");
            error!("{err_msg}");
            (StatusCode::INTERNAL_SERVER_ERROR, err_msg).into_response()
        }
        Ok(s) => (StatusCode::OK, Html(s)).into_response(),
    }
}

#[debug_handler]
pub async fn get_capture(State(state): State<Arc<Pin<Box<MyState>>>>) -> Response<Body> {
    let cnt = state.api_cnt.fetch_add(1, Ordering::Relaxed);
    info!("#{cnt} get_capture()");

    if !state.camera_ready() {
        return camera_error(CameraError::NotInitialized);
    }

    let res = lock(&state.camera).capture();
    match res {
        Ok(frame) => {
            debug!("Captured {}x{} {} bytes", frame.width, frame.height, frame.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "image/jpeg")],
                frame.data,
            )
                .into_response()
        }
        Err(e) => {
            error!("{e}");
            camera_error(e)
        }
    }
}

fn camera_error(e: CameraError) -> Response<Body> {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorReply { error: e.to_string() }),
    )
        .into_response()
}

// EOF
