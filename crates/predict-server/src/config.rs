use common::env_or;
use inference::ExecutionProvider;
use preprocess::DEFAULT_INPUT_SIZE;
use std::env;

pub use common::Environment;

#[derive(Debug, Clone)]
pub struct PredictServerConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub model_path: String,
    pub input_size: u32,
    pub execution_provider: ExecutionProvider,
    /// Largest accepted request body; data URIs are a third larger than the image
    pub max_body_bytes: usize,
}

impl PredictServerConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let host = env::var("MODEL_API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_or("MODEL_API_PORT", 8000);

        let model_path =
            env::var("MODEL_PATH").unwrap_or_else(|_| "model/model.onnx".to_string());

        let input_size = env_or("INPUT_SIZE", DEFAULT_INPUT_SIZE);
        if input_size == 0 {
            anyhow::bail!("INPUT_SIZE must be greater than zero");
        }

        let execution_provider = ExecutionProvider::try_from(
            env::var("EXECUTION_PROVIDER").unwrap_or_else(|_| "cpu".to_string()),
        )
        .map_err(anyhow::Error::msg)?;

        let max_body_bytes = env_or("MAX_BODY_BYTES", 20 * 1024 * 1024);

        Ok(Self {
            environment,
            host,
            port,
            model_path,
            input_size,
            execution_provider,
            max_body_bytes,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
