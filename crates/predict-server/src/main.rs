use anyhow::Context;
use common::TelemetryGuard;
use inference::{EmbeddedClient, backend::ort::OrtBackend};
use predict_server::{Predictor, config::PredictServerConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PredictServerConfig::from_env()?;
    let _telemetry = TelemetryGuard::from_env("predict-server", config.environment)?;

    tracing::info!(model_path = %config.model_path, "Loading model");

    let model_path = config.model_path.clone();
    let provider = config.execution_provider;
    let client = EmbeddedClient::new(config.input_size, move || {
        OrtBackend::load_model_with_provider(&model_path, provider)
    });
    client
        .ensure_loaded()
        .await
        .with_context(|| format!("failed to load model from {}", config.model_path))?;

    let app = router(Predictor::new(client), config.max_body_bytes);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Model API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
