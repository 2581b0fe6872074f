use common::env_or;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    pub progress_tick: Duration,
    /// Percentage points added per tick
    pub progress_step: f32,
    /// The indicator never passes this until the scan completes
    pub progress_cap: f32,
    /// Upper bound for one classify call
    pub request_timeout: Duration,
}

impl ScannerConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let progress_tick = Duration::from_millis(env_or(
            "PROGRESS_TICK_MS",
            defaults.progress_tick.as_millis() as u64,
        ));
        let progress_step = env_or("PROGRESS_STEP", defaults.progress_step);
        let progress_cap = env_or("PROGRESS_CAP", defaults.progress_cap);

        if progress_tick.is_zero() {
            anyhow::bail!("PROGRESS_TICK_MS must be greater than zero");
        }
        if !(progress_step > 0.0) {
            anyhow::bail!("PROGRESS_STEP must be positive, got {}", progress_step);
        }
        if !(progress_cap > 0.0 && progress_cap < 100.0) {
            anyhow::bail!("PROGRESS_CAP must be within (0, 100), got {}", progress_cap);
        }

        Ok(Self {
            progress_tick,
            progress_step,
            progress_cap,
            request_timeout: defaults.request_timeout,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            progress_tick: Duration::from_millis(50),
            progress_step: 2.5,
            progress_cap: 92.0,
            request_timeout: Duration::from_secs(30),
        }
    }
}
