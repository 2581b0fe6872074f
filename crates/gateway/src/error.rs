use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inference::wire::ErrorBody;
use scanner::ScanError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request body is empty.")]
    EmptyBody,
    #[error("Unsupported content type '{0}'. Upload an image file.")]
    UnsupportedMediaType(String),
    #[error("{0}")]
    NotReady(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::EmptyBody => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(detail) => {
                tracing::error!(detail, "Gateway internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::NotReady => ApiError::NotReady(err.user_message()),
            other => ApiError::Internal(other.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_ready_maps_to_503_with_message() {
        let response = ApiError::from(ScanError::NotReady).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["error"],
            "Model is not ready yet. Please wait a moment and try again."
        );
    }

    #[tokio::test]
    async fn unsupported_media_type_names_the_type() {
        let response = ApiError::UnsupportedMediaType("text/plain".into()).into_response();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("text/plain"));
    }
}
