use inference::InferenceError;
use preprocess::NormalizeError;
use thiserror::Error;

const BACKEND_GUIDANCE: &str =
    "Make sure the model is loaded and the prediction service is reachable.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Model is not ready yet. Please wait a moment and try again.")]
    NotReady,

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("scan task stopped unexpectedly: {0}")]
    Interrupted(String),
}

impl ScanError {
    /// The single string shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::NotReady => self.to_string(),
            ScanError::Inference(e) if e.is_backend_unavailable() => {
                format!("Prediction failed: {}. {}", e, BACKEND_GUIDANCE)
            }
            other => format!("Prediction failed: {}", other),
        }
    }
}
