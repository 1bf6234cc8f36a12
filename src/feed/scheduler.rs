use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::controller::FeedSyncController;
use super::source::IntelSource;

/// Background task that boots a controller and then polls it on a fixed cadence.
///
/// Ticks never overlap a running poll: the loop awaits each poll before
/// waiting for the next tick, and a tick that finds another poll in flight
/// (a manual refresh, say) is skipped. Stopping or dropping the scheduler
/// aborts the task, which cancels the boot narration and every future tick.
pub struct PollScheduler {
    handle: JoinHandle<()>,
}

impl PollScheduler {
    /// Spawn the sync task. `interval` of `None` boots and polls once only.
    pub fn spawn<S: IntelSource>(
        controller: FeedSyncController<S>,
        interval: Option<Duration>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            controller.initialize().await;

            let Some(period) = interval else {
                tracing::debug!("Periodic polling disabled");
                return;
            };

            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if controller.is_torn_down() {
                    break;
                }
                if controller.try_poll().await.is_none() {
                    tracing::debug!("Poll still in flight, skipping tick");
                }
            }
            tracing::debug!("Poll scheduler exited");
        });

        Self { handle }
    }

    /// Cancel the task. No poll starts after this returns.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
