use super::{InferenceClient, Readiness};
use crate::backend::InferenceBackend;
use crate::error::InferenceError;
use crate::interpret::ScoreSemantics;
use crate::output::RawOutput;
use common::span;
use preprocess::{InputKind, PreparedInput};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::OwnedMutexGuard;

type Loader<B> = Arc<dyn Fn() -> anyhow::Result<B> + Send + Sync>;

enum EngineState<B> {
    Unloaded,
    Loading,
    Ready(Arc<Mutex<B>>),
    Failed(String),
}

impl<B> Clone for EngineState<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Unloaded => Self::Unloaded,
            Self::Loading => Self::Loading,
            Self::Ready(engine) => Self::Ready(Arc::clone(engine)),
            Self::Failed(reason) => Self::Failed(reason.clone()),
        }
    }
}

/// Runs a locally loaded model.
///
/// The engine is created on first use (or by [`Self::ensure_loaded`]) and
/// shared by every scan afterwards. A failed load sticks until [`Self::reload`].
pub struct EmbeddedClient<B: InferenceBackend> {
    loader: Loader<B>,
    input_size: u32,
    state: Arc<RwLock<EngineState<B>>>,
    load_gate: Arc<tokio::sync::Mutex<()>>,
}

impl<B: InferenceBackend> EmbeddedClient<B> {
    pub fn new<F>(input_size: u32, loader: F) -> Self
    where
        F: Fn() -> anyhow::Result<B> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
            input_size,
            state: Arc::new(RwLock::new(EngineState::Unloaded)),
            load_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Load the model unless it is already loaded or has failed to load.
    ///
    /// Concurrent callers wait for the same load. A caller that gives up
    /// waiting does not abort it.
    pub async fn ensure_loaded(&self) -> Result<(), InferenceError> {
        let gate = Arc::clone(&self.load_gate).lock_owned().await;

        match self.current() {
            EngineState::Ready(_) => Ok(()),
            EngineState::Failed(reason) => Err(InferenceError::ModelLoad(reason)),
            EngineState::Unloaded | EngineState::Loading => self.load(gate).await,
        }
    }

    /// Drop the current engine (or failure) and load a fresh one.
    pub async fn reload(&self) -> Result<(), InferenceError> {
        let gate = Arc::clone(&self.load_gate).lock_owned().await;
        tracing::info!("Reloading model");
        self.load(gate).await
    }

    // The blocking task holds the gate until it has stored the outcome, so
    // dropping this future never leaves the slot in `Loading`.
    async fn load(&self, gate: OwnedMutexGuard<()>) -> Result<(), InferenceError> {
        self.set_state(EngineState::Loading);

        let loader = Arc::clone(&self.loader);
        let state = Arc::clone(&self.state);
        let input_size = self.input_size;

        tokio::task::spawn_blocking(move || {
            let _gate = gate;
            let _s = span!("load_model");

            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| loader())) {
                Ok(Ok(backend)) => Ok(backend),
                Ok(Err(e)) => Err(format!("{:#}", e)),
                Err(_) => Err("model loader panicked".to_string()),
            };

            match outcome {
                Ok(backend) => {
                    tracing::info!(input_size, "Model ready");
                    store(&state, EngineState::Ready(Arc::new(Mutex::new(backend))));
                    Ok(())
                }
                Err(reason) => {
                    tracing::error!(error = %reason, "Failed to load model");
                    store(&state, EngineState::Failed(reason.clone()));
                    Err(InferenceError::ModelLoad(reason))
                }
            }
        })
        .await
        .map_err(|e| InferenceError::ModelLoad(format!("model load task failed: {}", e)))?
    }

    async fn engine(&self) -> Result<Arc<Mutex<B>>, InferenceError> {
        match self.current() {
            EngineState::Ready(engine) => return Ok(engine),
            EngineState::Failed(reason) => return Err(InferenceError::BackendUnavailable(reason)),
            EngineState::Unloaded | EngineState::Loading => {}
        }

        self.ensure_loaded().await.map_err(|e| match e {
            InferenceError::ModelLoad(reason) => InferenceError::BackendUnavailable(reason),
            other => other,
        })?;

        match self.current() {
            EngineState::Ready(engine) => Ok(engine),
            EngineState::Failed(reason) => Err(InferenceError::BackendUnavailable(reason)),
            EngineState::Unloaded | EngineState::Loading => Err(
                InferenceError::BackendUnavailable("model did not finish loading".into()),
            ),
        }
    }

    fn current(&self) -> EngineState<B> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, next: EngineState<B>) {
        store(&self.state, next);
    }
}

fn store<B>(state: &RwLock<EngineState<B>>, next: EngineState<B>) {
    *state.write().unwrap_or_else(PoisonError::into_inner) = next;
}

impl<B: InferenceBackend> InferenceClient for EmbeddedClient<B> {
    fn input_kind(&self) -> InputKind {
        InputKind::Tensor {
            size: self.input_size,
        }
    }

    fn score_semantics(&self) -> ScoreSemantics {
        ScoreSemantics::NotAiProbability
    }

    fn readiness(&self) -> Readiness {
        match self.current() {
            EngineState::Ready(_) => Readiness::Ready,
            EngineState::Failed(reason) => Readiness::Unavailable(reason),
            EngineState::Unloaded | EngineState::Loading => Readiness::Loading,
        }
    }

    fn warm_up(&self) -> impl Future<Output = Result<(), InferenceError>> + Send {
        self.ensure_loaded()
    }

    fn classify(
        &self,
        input: &PreparedInput,
    ) -> impl Future<Output = Result<RawOutput, InferenceError>> + Send {
        async move {
            let tensor = match input {
                PreparedInput::Tensor(tensor) => tensor,
                PreparedInput::Encoded(_) => {
                    return Err(InferenceError::UnsupportedInput(
                        "embedded model expects a tensor, got an encoded image".into(),
                    ));
                }
            };

            let size = self.input_size as usize;
            if tensor.shape() != [1, size, size, 3] {
                return Err(InferenceError::UnsupportedInput(format!(
                    "expected tensor of shape [1, {size}, {size}, 3], got {:?}",
                    tensor.shape()
                )));
            }

            let engine = self.engine().await?;
            let tensor = tensor.clone();

            let outputs = tokio::task::spawn_blocking(move || {
                let _s = span!("classify");
                let mut backend = engine
                    .lock()
                    .map_err(|_| anyhow::anyhow!("model engine lock poisoned"))?;
                backend.infer(tensor.view())
            })
            .await
            .map_err(|e| InferenceError::Engine(format!("inference task failed: {}", e)))?
            .map_err(|e| InferenceError::Engine(format!("{:#}", e)))?;

            RawOutput::from_tensors(outputs)
        }
    }
}
