use crate::config::Environment;
use tracing_subscriber::{Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber: pretty output for development, JSON for
/// production.
///
/// Filtering follows `RUST_LOG` (defaults to "info"). Use
/// [`crate::TelemetryGuard::init`] instead when spans and metrics should also
/// be exported over OTLP.
pub fn setup_logging(environment: Environment) {
    install_subscriber(environment, None);
}

pub(crate) fn install_subscriber(
    environment: Environment,
    otel_layer: Option<Box<dyn Layer<Registry> + Send + Sync>>,
) {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let fmt_layer = match environment {
        Environment::Production => tracing_subscriber::fmt::layer()
            .json()
            .with_level(true)
            .boxed(),
        Environment::Development => tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
