use axum::{Json, Router, http::StatusCode, routing::post};
use inference::wire::{ErrorBody, PredictRequest};
use inference::{
    InferenceClient, InferenceError, Label, RawOutput, RemoteClient, interpret,
};
use preprocess::PreparedInput;
use serde_json::{Value, json};

/// Serve `router` on an ephemeral port and return its predict URL.
async fn spawn_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/predict", addr)
}

fn encoded() -> PreparedInput {
    PreparedInput::Encoded("data:image/png;base64,iVBORw0KGgo=".into())
}

#[tokio::test]
async fn successful_prediction_is_interpreted_directly() {
    let url = spawn_service(Router::new().route(
        "/api/predict",
        post(|Json(req): Json<PredictRequest>| async move {
            assert!(req.image_base64.starts_with("data:image/png;base64,"));
            Json(json!({
                "ai_probability": 0.87,
                "human_probability": 0.13,
                "predicted_label": "AI Generated",
                "confidence": 0.87
            }))
        }),
    ))
    .await;
    let client = RemoteClient::new(url).unwrap();

    let output = client.classify(&encoded()).await.unwrap();

    assert_eq!(
        output,
        RawOutput::Probabilities {
            ai_probability: Some(0.87),
            human_probability: Some(0.13),
        }
    );
    let results = interpret(&output, client.score_semantics()).unwrap();
    assert_eq!(results[0].label, Label::AiGenerated);
    assert_eq!(results[0].confidence, 87.0);
    assert_eq!(results[1].confidence, 13.0);
}

#[tokio::test]
async fn non_success_status_is_a_network_error() {
    let url = spawn_service(Router::new().route(
        "/api/predict",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Prediction failed: model missing")),
            )
        }),
    ))
    .await;
    let client = RemoteClient::new(url).unwrap();

    let err = client.classify(&encoded()).await.unwrap_err();

    match err {
        InferenceError::Network(msg) => {
            assert!(msg.contains("500"), "{}", msg);
            assert!(msg.contains("model missing"), "{}", msg);
        }
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_a_protocol_error() {
    let url = spawn_service(
        Router::new().route("/api/predict", post(|| async { "definitely not json" })),
    )
    .await;
    let client = RemoteClient::new(url).unwrap();

    assert!(matches!(
        client.classify(&encoded()).await,
        Err(InferenceError::Protocol(_))
    ));
}

#[tokio::test]
async fn missing_probability_is_empty_output() {
    let url = spawn_service(Router::new().route(
        "/api/predict",
        post(|| async { Json::<Value>(json!({ "human_probability": 0.4 })) }),
    ))
    .await;
    let client = RemoteClient::new(url).unwrap();

    assert!(matches!(
        client.classify(&encoded()).await,
        Err(InferenceError::EmptyOutput(_))
    ));
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = RemoteClient::new(format!("http://{}/api/predict", addr)).unwrap();

    let err = client.classify(&encoded()).await.unwrap_err();

    assert!(matches!(err, InferenceError::Network(_)));
    assert!(err.is_backend_unavailable());
}
