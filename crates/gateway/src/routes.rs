use crate::error::ApiError;
use crate::state::AppState;
use crate::ws::ws_handler;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;
use inference::{InferenceClient, Readiness};
use preprocess::RawImage;
use scanner::ScanSnapshot;
use serde::Serialize;
use tower_http::cors::CorsLayer;

#[derive(Debug, Serialize)]
pub struct ScanAccepted {
    pub session_id: u64,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub backend: Readiness,
}

pub fn router<C: InferenceClient>(state: AppState<C>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/scan", post(scan::<C>))
        .route("/api/reset", post(reset::<C>))
        .route("/api/state", get(current_state::<C>))
        .route("/api/image", get(current_image::<C>))
        .route("/ws", get(ws_handler::<C>))
        .route("/health", get(health::<C>))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn scan<C: InferenceClient>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let raw = RawImage::new(body, mime_type);
    if !raw.is_image_mime() {
        return Err(ApiError::UnsupportedMediaType(raw.mime_type().to_string()));
    }
    if raw.is_empty() {
        return Err(ApiError::EmptyBody);
    }

    let handle = state.scanner.upload(raw)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ScanAccepted {
            session_id: handle.session_id(),
        }),
    ))
}

async fn reset<C: InferenceClient>(State(state): State<AppState<C>>) -> StatusCode {
    state.scanner.reset();
    StatusCode::NO_CONTENT
}

async fn current_state<C: InferenceClient>(
    State(state): State<AppState<C>>,
) -> Json<ScanSnapshot> {
    Json(state.scanner.snapshot())
}

async fn current_image<C: InferenceClient>(
    State(state): State<AppState<C>>,
) -> Result<impl IntoResponse, ApiError> {
    let preview = state
        .scanner
        .snapshot()
        .image
        .ok_or(ApiError::NotFound("No image is loaded."))?;

    let raw = preview.raw();
    Ok((
        [(header::CONTENT_TYPE, raw.mime_type().to_string())],
        raw.bytes().clone(),
    ))
}

async fn health<C: InferenceClient>(State(state): State<AppState<C>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        backend: state.scanner.client().readiness(),
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found.")
}
