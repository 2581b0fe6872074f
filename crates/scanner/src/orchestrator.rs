use crate::config::ScannerConfig;
use crate::error::ScanError;
use crate::metrics::ScanMetrics;
use crate::progress::ProgressDriver;
use crate::state::{ScanPhase, ScanSnapshot};
use inference::{AnalysisResult, InferenceClient, InferenceError, interpret};
use preprocess::RawImage;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub type ScanOutcome = Result<[AnalysisResult; 2], ScanError>;

/// Drives single-image scans against one inference client.
///
/// Every upload starts a new session and supersedes the previous one; work
/// belonging to a superseded session still runs to completion but can no
/// longer change the published state.
pub struct ScanOrchestrator<C: InferenceClient> {
    inner: Arc<Inner<C>>,
}

impl<C: InferenceClient> Clone for ScanOrchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<C> {
    client: C,
    config: ScannerConfig,
    state: Arc<watch::Sender<ScanSnapshot>>,
    // Lock order: `driver`, then the watch channel.
    driver: Mutex<Option<ProgressDriver>>,
    metrics: ScanMetrics,
}

/// Awaitable outcome of one accepted upload.
pub struct ScanHandle {
    session_id: u64,
    task: JoinHandle<ScanOutcome>,
}

impl ScanHandle {
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Wait for the scan to finish. A superseded scan still reports its own
    /// outcome here, even though it was not published.
    pub async fn wait(self) -> ScanOutcome {
        self.task
            .await
            .unwrap_or_else(|e| Err(ScanError::Interrupted(e.to_string())))
    }
}

impl<C: InferenceClient> ScanOrchestrator<C> {
    pub fn new(client: C, config: ScannerConfig) -> Self {
        let (state, _) = watch::channel(ScanSnapshot::idle(0));

        Self {
            inner: Arc::new(Inner {
                client,
                config,
                state: Arc::new(state),
                driver: Mutex::new(None),
                metrics: ScanMetrics::new("scanner"),
            }),
        }
    }

    pub fn client(&self) -> &C {
        &self.inner.client
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Prepare the backend. A failure is shown on the idle screen until the
    /// next upload or reset.
    pub async fn warm_up(&self) -> Result<(), InferenceError> {
        let result = self.inner.client.warm_up().await;

        if let Err(e) = &result {
            let message = match e {
                InferenceError::ModelLoad(reason) => format!("Model load failed: {}", reason),
                other => format!("Model load failed: {}", other),
            };
            tracing::error!(error = %e, "Backend warm-up failed");
            self.inner.state.send_if_modified(|s| {
                if s.phase != ScanPhase::Idle {
                    return false;
                }
                s.error = Some(message);
                true
            });
        }

        result
    }

    /// Start scanning `raw`, superseding whatever session is current.
    ///
    /// Refused (without touching the current phase) while the backend is
    /// not ready. The refusal message is only shown when no scan is running.
    pub fn upload(&self, raw: RawImage) -> Result<ScanHandle, ScanError> {
        let readiness = self.inner.client.readiness();
        if !readiness.is_ready() {
            tracing::warn!(?readiness, "Upload refused, backend not ready");
            let message = ScanError::NotReady.user_message();
            // A running scan keeps its own display.
            self.inner.state.send_if_modified(|s| {
                if s.phase.is_active() {
                    return false;
                }
                s.error = Some(message);
                true
            });
            return Err(ScanError::NotReady);
        }

        let mut driver = self.inner.lock_driver();

        let mut session_id = 0;
        let preview = raw.clone();
        self.inner.state.send_modify(|s| {
            session_id = s.session_id + 1;
            *s = ScanSnapshot::preparing(session_id, preview);
        });

        let config = &self.inner.config;
        *driver = Some(ProgressDriver::start(
            Arc::clone(&self.inner.state),
            session_id,
            config.progress_tick,
            config.progress_step,
            config.progress_cap,
        ));
        drop(driver);

        tracing::info!(
            session_id,
            mime_type = raw.mime_type(),
            size_bytes = raw.len(),
            "Scan started"
        );

        let task = tokio::spawn(run_scan(Arc::clone(&self.inner), session_id, raw));

        Ok(ScanHandle { session_id, task })
    }

    /// Abandon the current session and return to an empty idle screen.
    pub fn reset(&self) {
        let mut driver = self.inner.lock_driver();
        driver.take();

        let mut session_id = 0;
        self.inner.state.send_modify(|s| {
            session_id = s.session_id + 1;
            *s = ScanSnapshot::idle(session_id);
        });

        tracing::info!(session_id, "Scan state reset");
    }
}

async fn run_scan<C: InferenceClient>(
    inner: Arc<Inner<C>>,
    session_id: u64,
    raw: RawImage,
) -> ScanOutcome {
    let started = Instant::now();
    let outcome = inner.scan(session_id, raw).await;
    inner.complete(session_id, &outcome, started);
    outcome
}

impl<C: InferenceClient> Inner<C> {
    async fn scan(&self, session_id: u64, raw: RawImage) -> ScanOutcome {
        let kind = self.client.input_kind();
        let prepared = tokio::task::spawn_blocking(move || {
            let _s = common::span!("normalize");
            preprocess::normalize(&raw, kind)
        })
        .await
        .map_err(|e| ScanError::Interrupted(e.to_string()))??;

        self.publish(session_id, |s| {
            s.phase = ScanPhase::Inferring;
        });
        tracing::debug!(session_id, input = prepared.kind(), "Input prepared");

        let timeout = self.config.request_timeout;
        let output = tokio::time::timeout(timeout, self.client.classify(&prepared))
            .await
            .map_err(|_| InferenceError::Timeout(timeout))??;

        Ok(interpret(&output, self.client.score_semantics())?)
    }

    fn complete(&self, session_id: u64, outcome: &ScanOutcome, started: Instant) {
        let mut driver = self.lock_driver();

        let applied = self.state.send_if_modified(|s| {
            if s.session_id != session_id {
                return false;
            }
            match outcome {
                Ok(results) => {
                    s.phase = ScanPhase::Succeeded;
                    s.progress = 100.0;
                    s.results = Some(*results);
                    s.error = None;
                }
                Err(e) => {
                    s.phase = ScanPhase::Failed;
                    s.progress = 0.0;
                    s.results = None;
                    s.image = None;
                    s.error = Some(e.user_message());
                }
            }
            true
        });

        // The slot only ever holds the current session's driver.
        if applied {
            driver.take();
        }
        drop(driver);

        let elapsed = started.elapsed();
        match (outcome, applied) {
            (_, false) => {
                tracing::info!(session_id, "Scan finished after being superseded, result dropped");
                self.metrics.record(elapsed, "superseded", false);
            }
            (Ok(results), true) => {
                tracing::info!(
                    session_id,
                    label = results[0].label.as_str(),
                    confidence = results[0].confidence,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Scan succeeded"
                );
                self.metrics.record(elapsed, "succeeded", false);
            }
            (Err(e), true) => {
                tracing::error!(session_id, error = %e, "Scan failed");
                self.metrics.record(elapsed, "failed", true);
            }
        }
    }

    /// Apply `update` only while `session_id` is still current.
    fn publish(&self, session_id: u64, update: impl FnOnce(&mut ScanSnapshot)) -> bool {
        self.state.send_if_modified(|s| {
            if s.session_id != session_id {
                return false;
            }
            update(s);
            true
        })
    }

    fn lock_driver(&self) -> std::sync::MutexGuard<'_, Option<ProgressDriver>> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
