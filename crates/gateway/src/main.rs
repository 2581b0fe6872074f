use anyhow::Context;
use common::TelemetryGuard;
use gateway::{AppState, config::GatewayConfig, router};
use inference::{BackendClient, InferenceConfig};
use scanner::{ScanOrchestrator, ScannerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env();
    let _telemetry = TelemetryGuard::from_env("gateway", config.environment)?;

    let inference_config = InferenceConfig::from_env()?;
    let scanner_config =
        ScannerConfig::from_env()?.with_request_timeout(inference_config.request_timeout);

    tracing::info!(
        environment = config.environment.as_str(),
        backend = ?inference_config.backend,
        model_path = %inference_config.model_path,
        predict_url = %inference_config.predict_url,
        "Gateway starting"
    );

    let client = BackendClient::from_config(&inference_config)
        .context("failed to create inference client")?;
    let scanner = ScanOrchestrator::new(client, scanner_config);

    // Uploads are refused with a "not ready" message until this finishes.
    let warm = scanner.clone();
    tokio::spawn(async move {
        if warm.warm_up().await.is_ok() {
            tracing::info!("Backend ready");
        }
    });

    let app = router(AppState::new(scanner), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!("Gateway listening on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
