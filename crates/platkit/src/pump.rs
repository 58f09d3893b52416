//! Background callback pump.
//!
//! Hosts without a frame loop of their own can hand the client to a
//! [`CallbackPump`], which calls `run_callbacks` at a fixed rate on a tokio
//! task:
//!
//! ```ignore
//! let client = Arc::new(PlatformClient::builder().build(native)?);
//! let pump = client.spawn_pump().expect("pump_rate_hz > 0");
//! // ... await call results, read packets ...
//! pump.stop().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use platkit_native::Native;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::PlatformClient;

/// A tokio task driving [`PlatformClient::run_callbacks`].
///
/// Missed ticks are skipped, not replayed: a late run drains everything
/// queued since the last one anyway. Dropping the pump aborts the task.
#[derive(Debug)]
pub struct CallbackPump {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl CallbackPump {
    /// Spawns the pump on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, or if `period` is zero.
    pub fn start<N: Native>(client: Arc<PlatformClient<N>>, period: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::debug!(
                period_ms = period.as_secs_f64() * 1000.0,
                "callback pump started"
            );

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        let routed = client.run_callbacks();
                        if routed > 0 {
                            tracing::trace!(routed, "callbacks dispatched");
                        }
                    }
                }
            }
            tracing::debug!("callback pump stopped");
        });

        Self {
            stop: Some(stop_tx),
            task,
        }
    }

    /// `false` once the task has exited.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the pump and waits for its task to exit. The client's `Arc`
    /// held by the task is released before this returns.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            // The task may already be gone.
            let _ = stop.send(());
        }
        if let Err(err) = (&mut self.task).await {
            tracing::warn!(%err, "callback pump task ended abnormally");
        }
    }
}

impl Drop for CallbackPump {
    fn drop(&mut self) {
        self.task.abort();
    }
}
