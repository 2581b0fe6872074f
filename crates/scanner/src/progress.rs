use crate::state::ScanSnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Next indicator value: one step forward, never past `cap`, never backwards.
pub fn advance(progress: f32, step: f32, cap: f32) -> f32 {
    (progress + step).min(cap).max(progress)
}

/// Ticks the cosmetic progress indicator of one session.
///
/// The indicator is not tied to real work. The task is aborted when the
/// guard is dropped, and it stops by itself once the cap is reached or the
/// session is no longer the active one.
pub struct ProgressDriver {
    task: JoinHandle<()>,
}

impl ProgressDriver {
    pub fn start(
        state: Arc<watch::Sender<ScanSnapshot>>,
        session_id: u64,
        tick: Duration,
        step: f32,
        cap: f32,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;

                let mut finished = false;
                state.send_if_modified(|s| {
                    if s.session_id != session_id || !s.phase.is_active() {
                        finished = true;
                        return false;
                    }
                    let next = advance(s.progress, step, cap);
                    finished = next >= cap;
                    if next == s.progress {
                        return false;
                    }
                    s.progress = next;
                    true
                });

                if finished {
                    tracing::trace!(session_id, "Progress driver finished");
                    break;
                }
            }
        });

        Self { task }
    }
}

impl Drop for ProgressDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ScanPhase;
    use preprocess::RawImage;

    const TICK: Duration = Duration::from_millis(50);

    fn active(session_id: u64) -> Arc<watch::Sender<ScanSnapshot>> {
        let snapshot = ScanSnapshot::preparing(session_id, RawImage::new(vec![0u8], "image/png"));
        Arc::new(watch::channel(snapshot).0)
    }

    fn progress(state: &watch::Sender<ScanSnapshot>) -> f32 {
        state.borrow().progress
    }

    #[test]
    fn advance_stops_at_cap() {
        assert_eq!(advance(0.0, 2.5, 92.0), 2.5);
        assert_eq!(advance(90.0, 2.5, 92.0), 92.0);
        assert_eq!(advance(92.0, 2.5, 92.0), 92.0);
        // Steps that do not divide the cap still land on it.
        assert_eq!(advance(91.0, 3.0, 92.0), 92.0);
    }

    #[test]
    fn advance_never_decreases() {
        assert_eq!(advance(95.0, 2.5, 92.0), 95.0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_fixed_interval() {
        let state = active(1);
        let _driver = ProgressDriver::start(Arc::clone(&state), 1, TICK, 2.5, 92.0);

        time::sleep(Duration::from_millis(525)).await;

        assert_eq!(progress(&state), 25.0);
    }

    #[tokio::test(start_paused = true)]
    async fn holds_at_cap() {
        let state = active(1);
        let _driver = ProgressDriver::start(Arc::clone(&state), 1, TICK, 2.5, 92.0);

        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(progress(&state), 92.0);
        assert_eq!(state.borrow().phase, ScanPhase::Preparing);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_ticking() {
        let state = active(1);
        let driver = ProgressDriver::start(Arc::clone(&state), 1, TICK, 2.5, 92.0);

        time::sleep(Duration::from_millis(125)).await;
        drop(driver);
        let frozen = progress(&state);
        time::sleep(Duration::from_secs(1)).await;

        assert_eq!(frozen, 5.0);
        assert_eq!(progress(&state), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_other_sessions() {
        let state = active(2);
        let _driver = ProgressDriver::start(Arc::clone(&state), 1, TICK, 2.5, 92.0);

        time::sleep(Duration::from_millis(500)).await;

        assert_eq!(progress(&state), 0.0);
    }
}
