//! Idle-session timeout, the one explicit timeout in the system.
//!
//! A timer task signs the session out after a fixed stretch of inactivity;
//! any activity resets it via `touch`. The sign-out callback fires at most
//! once. Dropping the handle cancels the timer without firing.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

pub struct IdleSession {
    activity: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl IdleSession {
    /// Start the timer. `on_idle` runs on expiry (forced sign-out in the
    /// original design).
    pub fn spawn<F>(timeout: Duration, on_idle: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (activity, mut receiver) = mpsc::channel::<()>(8);
        let task = tokio::spawn(async move {
            loop {
                match tokio::time::timeout(timeout, receiver.recv()).await {
                    // Activity observed; restart the countdown.
                    Ok(Some(())) => continue,
                    // Handle dropped: session ended normally.
                    Ok(None) => return,
                    Err(_elapsed) => {
                        info!(timeout_secs = timeout.as_secs(), "idle session expired, signing out");
                        on_idle();
                        return;
                    }
                }
            }
        });
        Self { activity, task }
    }

    /// Record user activity, resetting the countdown. A session that has
    /// already expired ignores this.
    pub async fn touch(&self) {
        let _ = self.activity.send(()).await;
    }

    pub fn is_expired(&self) -> bool {
        self.task.is_finished()
    }
}
