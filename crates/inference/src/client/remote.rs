use super::{InferenceClient, Readiness};
use crate::error::InferenceError;
use crate::interpret::ScoreSemantics;
use crate::output::RawOutput;
use crate::wire::{ErrorBody, PredictRequest, PredictResponse};
use preprocess::{InputKind, PreparedInput};
use std::future::Future;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts data URIs to an HTTP prediction service.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RemoteClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, InferenceError> {
        Self::with_connect_timeout(endpoint, CONNECT_TIMEOUT)
    }

    pub fn with_connect_timeout(
        endpoint: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| InferenceError::Network(format!("could not build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl InferenceClient for RemoteClient {
    fn input_kind(&self) -> InputKind {
        InputKind::EncodedDataUri
    }

    fn score_semantics(&self) -> ScoreSemantics {
        ScoreSemantics::AiProbability
    }

    /// The service is only probed by real requests.
    fn readiness(&self) -> Readiness {
        Readiness::Ready
    }

    fn classify(
        &self,
        input: &PreparedInput,
    ) -> impl Future<Output = Result<RawOutput, InferenceError>> + Send {
        async move {
            let image = match input {
                PreparedInput::Encoded(uri) => uri.clone(),
                PreparedInput::Tensor(_) => {
                    return Err(InferenceError::UnsupportedInput(
                        "prediction service expects an encoded image, got a tensor".into(),
                    ));
                }
            };

            tracing::debug!(endpoint = %self.endpoint, payload_len = image.len(), "Sending prediction request");

            let response = self
                .http
                .post(&self.endpoint)
                .json(&PredictRequest {
                    image_base64: image,
                })
                .send()
                .await
                .map_err(|e| InferenceError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let detail = serde_json::from_str::<ErrorBody>(&body)
                    .map(|b| b.error)
                    .unwrap_or(body);
                tracing::warn!(%status, detail = %detail, "Prediction service rejected request");
                return Err(InferenceError::Network(format!(
                    "prediction service returned {}: {}",
                    status, detail
                )));
            }

            let body: PredictResponse = response
                .json()
                .await
                .map_err(|e| InferenceError::Protocol(e.to_string()))?;

            RawOutput::from_prediction(body)
        }
    }
}
