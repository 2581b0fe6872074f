use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("model is not available: {0}")]
    BackendUnavailable(String),

    #[error("prediction service unreachable: {0}")]
    Network(String),

    #[error("unexpected response from prediction service: {0}")]
    Protocol(String),

    #[error("model returned empty output: {0}")]
    EmptyOutput(String),

    #[error("missing field in model output: {0}")]
    MissingField(String),

    #[error("backend did not respond within {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("inference failed: {0}")]
    Engine(String),

    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
}

impl InferenceError {
    /// Failures the user can only fix by making the backend reachable/ready.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            InferenceError::ModelLoad(_)
                | InferenceError::BackendUnavailable(_)
                | InferenceError::Network(_)
                | InferenceError::Timeout(_)
        )
    }
}
