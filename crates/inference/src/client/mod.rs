use crate::error::InferenceError;
use crate::interpret::ScoreSemantics;
use crate::output::RawOutput;
use preprocess::{InputKind, PreparedInput};
use serde::Serialize;
use std::future::Future;

pub mod embedded;
pub mod remote;

pub use embedded::EmbeddedClient;
pub use remote::RemoteClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Readiness {
    Loading,
    Ready,
    Unavailable(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// One classification strategy.
///
/// Implementations only validate the shape of what the backend returns;
/// meaning is assigned by [`crate::interpret`] using [`Self::score_semantics`].
pub trait InferenceClient: Send + Sync + 'static {
    /// Representation [`preprocess::normalize`] must produce for this client.
    fn input_kind(&self) -> InputKind;

    fn score_semantics(&self) -> ScoreSemantics;

    fn readiness(&self) -> Readiness;

    /// Prepare the backend ahead of the first scan.
    fn warm_up(&self) -> impl Future<Output = Result<(), InferenceError>> + Send {
        async { Ok(()) }
    }

    fn classify(
        &self,
        input: &PreparedInput,
    ) -> impl Future<Output = Result<RawOutput, InferenceError>> + Send;
}

/// Strategy selected at startup from [`crate::InferenceConfig`].
#[cfg(feature = "ort-backend")]
pub enum BackendClient {
    Embedded(EmbeddedClient<crate::backend::ort::OrtBackend>),
    Remote(RemoteClient),
}

#[cfg(feature = "ort-backend")]
impl BackendClient {
    pub fn from_config(config: &crate::InferenceConfig) -> Result<Self, InferenceError> {
        match config.backend {
            crate::BackendKind::Embedded => {
                let path = config.model_path.clone();
                let provider = config.execution_provider;
                Ok(Self::Embedded(EmbeddedClient::new(config.input_size, move || {
                    crate::backend::ort::OrtBackend::load_model_with_provider(&path, provider)
                })))
            }
            crate::BackendKind::Remote => Ok(Self::Remote(RemoteClient::new(
                config.predict_url.clone(),
            )?)),
        }
    }
}

#[cfg(feature = "ort-backend")]
impl InferenceClient for BackendClient {
    fn input_kind(&self) -> InputKind {
        match self {
            Self::Embedded(client) => client.input_kind(),
            Self::Remote(client) => client.input_kind(),
        }
    }

    fn score_semantics(&self) -> ScoreSemantics {
        match self {
            Self::Embedded(client) => client.score_semantics(),
            Self::Remote(client) => client.score_semantics(),
        }
    }

    fn readiness(&self) -> Readiness {
        match self {
            Self::Embedded(client) => client.readiness(),
            Self::Remote(client) => client.readiness(),
        }
    }

    fn warm_up(&self) -> impl Future<Output = Result<(), InferenceError>> + Send {
        async move {
            match self {
                Self::Embedded(client) => client.warm_up().await,
                Self::Remote(client) => client.warm_up().await,
            }
        }
    }

    fn classify(
        &self,
        input: &PreparedInput,
    ) -> impl Future<Output = Result<RawOutput, InferenceError>> + Send {
        async move {
            match self {
                Self::Embedded(client) => client.classify(input).await,
                Self::Remote(client) => client.classify(input).await,
            }
        }
    }
}
