// src/polling/session.rs

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::StatusSource;
use crate::config::PollConfig;
use crate::models::{ApiResult, RequestId, StatusResponse, VideoStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    Idle,
    Checking,
    Completed,
    Failed,
    Errored,
    TimedOut,
}

impl PollPhase {
    pub fn is_stopped(self) -> bool {
        !matches!(self, PollPhase::Idle | PollPhase::Checking)
    }
}

/// What a viewer of one session can observe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollSnapshot {
    pub request_id: RequestId,
    pub phase: PollPhase,
    /// Latest status reported by the API, replaced on every successful check.
    pub status: Option<StatusResponse>,
    /// Message of the check that ended the session with `Errored` or `TimedOut`.
    pub error: Option<String>,
    /// Status checks issued so far.
    pub attempts: u32,
}

impl PollSnapshot {
    pub fn idle(request_id: RequestId) -> Self {
        Self {
            request_id,
            phase: PollPhase::Idle,
            status: None,
            error: None,
            attempts: 0,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.phase.is_stopped()
    }
}

/// Snapshot channel guarded by a liveness flag.
///
/// Teardown clears the flag under the same lock every update takes, so once
/// `shut` returns no update can reach subscribers.
struct Shared {
    live: Mutex<bool>,
    tx: watch::Sender<PollSnapshot>,
}

impl Shared {
    fn update<R>(&self, f: impl FnOnce(&mut PollSnapshot) -> R) -> Option<R> {
        let live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        if !*live {
            return None;
        }
        let mut out = None;
        self.tx.send_modify(|snapshot| out = Some(f(snapshot)));
        out
    }

    fn shut(&self) -> bool {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *live, false)
    }
}

/// One polling session for one request id.
///
/// The session starts checking immediately and keeps at most one status
/// check in flight: the next check is scheduled only after the previous
/// response has been applied. Dropping the session tears it down.
pub struct PollSession {
    request_id: RequestId,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl PollSession {
    /// Starts polling `request_id`. Must be called within a tokio runtime.
    pub fn start(source: Arc<dyn StatusSource>, request_id: RequestId, config: PollConfig) -> Self {
        let (tx, _rx) = watch::channel(PollSnapshot::idle(request_id.clone()));
        let shared = Arc::new(Shared {
            live: Mutex::new(true),
            tx,
        });

        shared.update(|snapshot| snapshot.phase = PollPhase::Checking);
        log::info!("🔄 Polling started for {}", request_id);

        let task = tokio::spawn(run(source, request_id.clone(), config, shared.clone()));

        Self {
            request_id,
            shared,
            task,
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn snapshot(&self) -> PollSnapshot {
        self.shared.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.shared.tx.subscribe()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.tx.borrow().is_stopped()
    }

    /// Receivers currently subscribed to snapshots.
    pub fn subscribers(&self) -> usize {
        self.shared.tx.receiver_count()
    }

    /// Cancels any pending or in-flight check. Idempotent.
    pub fn stop(&self) {
        if self.shared.shut() {
            log::info!("⏹️  Polling torn down for {}", self.request_id);
        }
        self.task.abort();
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(source: Arc<dyn StatusSource>, request_id: RequestId, config: PollConfig, shared: Arc<Shared>) {
    let mut attempts: u32 = 0;

    loop {
        if let Some(max) = config.max_attempts {
            if attempts >= max {
                log::warn!("⌛ Giving up on {} after {} status checks", request_id, attempts);
                shared.update(|snapshot| {
                    snapshot.phase = PollPhase::TimedOut;
                    snapshot.error = Some(format!(
                        "Status check timed out after {} attempts",
                        attempts
                    ));
                });
                return;
            }
        }

        attempts += 1;
        let result = source.check_video_status(&request_id).await;

        match shared.update(|snapshot| apply(snapshot, result, attempts)) {
            Some(false) => {}
            // stopped, or torn down while the check was in flight
            Some(true) | None => return,
        }

        tokio::time::sleep(config.interval).await;
    }
}

/// Applies one check result. Returns true when polling must stop.
fn apply(snapshot: &mut PollSnapshot, result: ApiResult<StatusResponse>, attempts: u32) -> bool {
    snapshot.attempts = attempts;

    match result {
        ApiResult::Success(status) => {
            snapshot.phase = match status.status {
                VideoStatus::Completed => PollPhase::Completed,
                VideoStatus::Failed => PollPhase::Failed,
                VideoStatus::Pending | VideoStatus::Submitted | VideoStatus::Processing => PollPhase::Checking,
            };
            log::debug!(
                "Status for {} is {} (attempt {}, progress {:?})",
                snapshot.request_id,
                status.status,
                attempts,
                status.progress
            );
            if snapshot.phase.is_stopped() {
                log::info!("🏁 {} finished with status {}", snapshot.request_id, status.status);
            }
            snapshot.status = Some(status);
        }
        ApiResult::Failure { error, .. } => {
            log::error!("Status check for {} failed: {}", snapshot.request_id, error);
            snapshot.phase = PollPhase::Errored;
            snapshot.error = Some(error);
        }
    }

    snapshot.phase.is_stopped()
}
