use inference::wire::PredictResponse;
use inference::{InferenceClient, InferenceError, Label, ai_probability};
use opentelemetry::{global, metrics::Histogram};
use preprocess::{NormalizeError, decode_data_uri};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("prediction task failed: {0}")]
    Task(String),
}

/// Runs one image through a loaded client and reports both probabilities.
pub struct Predictor<C: InferenceClient> {
    client: Arc<C>,
    duration: Histogram<f64>,
}

impl<C: InferenceClient> Clone for Predictor<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            duration: self.duration.clone(),
        }
    }
}

impl<C: InferenceClient> Predictor<C> {
    pub fn new(client: C) -> Self {
        let duration = global::meter("predict-server")
            .f64_histogram("predict_duration_seconds")
            .with_description("Time to answer one prediction request (decode + infer)")
            .with_unit("s")
            .build();

        Self {
            client: Arc::new(client),
            duration,
        }
    }

    /// `image` is a data URI or a bare base64 payload.
    pub async fn predict(&self, image: String) -> Result<PredictResponse, PredictError> {
        let started = Instant::now();
        let kind = self.client.input_kind();

        let prepared = tokio::task::spawn_blocking(move || {
            let _s = common::span!("normalize");
            let raw = decode_data_uri(&image)?;
            preprocess::normalize(&raw, kind)
        })
        .await
        .map_err(|e| PredictError::Task(e.to_string()))??;

        let output = self.client.classify(&prepared).await?;
        let ai = ai_probability(&output, self.client.score_semantics())?;

        self.duration.record(started.elapsed().as_secs_f64(), &[]);
        Ok(response_for(ai))
    }
}

pub fn response_for(ai: f32) -> PredictResponse {
    let human = 1.0 - ai;
    let label = if ai >= human {
        Label::AiGenerated
    } else {
        Label::LikelyReal
    };

    PredictResponse {
        ai_probability: Some(ai),
        human_probability: Some(human),
        predicted_label: Some(label.as_str().to_string()),
        confidence: Some(ai.max(human)),
    }
}
