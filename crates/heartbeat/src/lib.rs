//! Periodic liveness pings to the chat backend.
//!
//! The scheduler owns one tokio task that fires `send_heartbeat` on a fixed
//! period until it is stopped. It never shares a task with request handling,
//! so a slow backend only delays the next ping.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use {
    tokio::{
        task::JoinHandle,
        time::{Instant, MissedTickBehavior},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {httpchat_common::LocalIdentity, httpchat_remote::RemoteChatGateway};

pub const DEFAULT_HEARTBEAT_PERIOD: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("heartbeat scheduler is already running")]
    AlreadyRunning,
    #[error("heartbeat period must be greater than zero")]
    ZeroPeriod,
}

struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Cancellable fixed-period heartbeat.
///
/// `Stopped -> Running -> Stopped`. Ticks that overrun the period are not
/// queued: the next ping is scheduled one period after the late one fires.
pub struct HeartbeatScheduler {
    gateway: Arc<dyn RemoteChatGateway>,
    identity: LocalIdentity,
    period: Duration,
    ticks: Arc<AtomicU64>,
    running: Option<Running>,
}

impl HeartbeatScheduler {
    pub fn new(gateway: Arc<dyn RemoteChatGateway>, identity: LocalIdentity) -> Self {
        Self {
            gateway,
            identity,
            period: DEFAULT_HEARTBEAT_PERIOD,
            ticks: Arc::new(AtomicU64::new(0)),
            running: None,
        }
    }

    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Heartbeat attempts made since the scheduler was created.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Spawn the heartbeat task. The first ping goes out one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.running.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        if self.period.is_zero() {
            return Err(SchedulerError::ZeroPeriod);
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_heartbeat(
            Arc::clone(&self.gateway),
            self.identity.clone(),
            self.period,
            Arc::clone(&self.ticks),
            cancel.clone(),
        ));
        info!(
            username = %self.identity,
            period_ms = self.period.as_millis() as u64,
            "heartbeat started"
        );
        self.running = Some(Running { cancel, task });
        Ok(())
    }

    /// Stop issuing pings and wait for the task to exit.
    ///
    /// A ping already in flight is allowed to finish. No-op when stopped.
    pub async fn stop(&mut self) {
        let Some(Running { cancel, task }) = self.running.take() else {
            return;
        };
        cancel.cancel();
        if let Err(e) = task.await {
            warn!(error = %e, "heartbeat task ended abnormally");
        }
        info!(ticks = self.tick_count(), "heartbeat stopped");
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }
}

async fn run_heartbeat(
    gateway: Arc<dyn RemoteChatGateway>,
    identity: LocalIdentity,
    period: Duration,
    ticks: Arc<AtomicU64>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let n = ticks.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(tick = n, "sending ping");
                gateway.send_heartbeat(&identity).await;
            },
        }
    }
}
