use crate::predict::Predictor;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use bytes::Bytes;
use inference::InferenceClient;
use inference::wire::ErrorBody;
use serde_json::Value;
use tower_http::cors::CorsLayer;

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

pub fn router<C: InferenceClient>(predictor: Predictor<C>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/predict", post(predict::<C>))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(predictor)
}

async fn predict<C: InferenceClient>(
    State(predictor): State<Predictor<C>>,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Request body is empty.");
    }

    let Ok(payload) = serde_json::from_slice::<Value>(&body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid JSON payload.");
    };

    let image = match payload.get("imageBase64").and_then(Value::as_str) {
        Some(image) if !image.trim().is_empty() => image.to_string(),
        _ => return error(StatusCode::BAD_REQUEST, "Field 'imageBase64' is required."),
    };

    match predictor.predict(image).await {
        Ok(response) => {
            tracing::debug!(
                ai_probability = response.ai_probability,
                label = response.predicted_label.as_deref(),
                "Prediction served"
            );
            Json(response).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Prediction failed");
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prediction failed: {}", e),
            )
        }
    }
}

async fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Route not found.")
}
