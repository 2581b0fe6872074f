use common::env_or;
use preprocess::DEFAULT_INPUT_SIZE;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// ONNX model executed in-process
    Embedded,
    /// HTTP prediction service
    Remote,
}

impl TryFrom<String> for BackendKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "embedded" | "local" | "onnx" => Ok(Self::Embedded),
            "remote" | "http" => Ok(Self::Remote),
            other => Err(format!(
                "{} is not a supported backend. Use either `embedded` or `remote`.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionProvider {
    Cpu,
    Cuda,
}

impl TryFrom<String> for ExecutionProvider {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!(
                "{} is not a supported execution provider. Use either `cpu` or `cuda`.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub backend: BackendKind,
    pub model_path: String,
    pub predict_url: String,
    /// Square side of the model input
    pub input_size: u32,
    pub request_timeout: Duration,
    pub execution_provider: ExecutionProvider,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = BackendKind::try_from(
            env::var("BACKEND").unwrap_or_else(|_| "embedded".to_string()),
        )
        .map_err(anyhow::Error::msg)?;

        let execution_provider = ExecutionProvider::try_from(
            env::var("EXECUTION_PROVIDER").unwrap_or_else(|_| "cpu".to_string()),
        )
        .map_err(anyhow::Error::msg)?;

        let model_path =
            env::var("MODEL_PATH").unwrap_or_else(|_| "model/model.onnx".to_string());

        let predict_url = env::var("PREDICT_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000/api/predict".to_string());

        let input_size = env_or("INPUT_SIZE", DEFAULT_INPUT_SIZE);
        if input_size == 0 {
            anyhow::bail!("INPUT_SIZE must be greater than zero");
        }

        let request_timeout = Duration::from_millis(env_or("REQUEST_TIMEOUT_MS", 30_000));

        Ok(Self {
            backend,
            model_path,
            predict_url,
            input_size,
            request_timeout,
            execution_provider,
        })
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Embedded,
            model_path: "model/model.onnx".to_string(),
            predict_url: "http://127.0.0.1:8000/api/predict".to_string(),
            input_size: DEFAULT_INPUT_SIZE,
            request_timeout: Duration::from_secs(30),
            execution_provider: ExecutionProvider::Cpu,
        }
    }
}
