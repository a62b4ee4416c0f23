use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Time left until `expires_at`, or None once the instant has passed
/// or was never supplied. Never negative.
pub fn remaining(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Duration> {
    let expires_at = expires_at?;
    let left = expires_at - now;
    if left <= Duration::zero() {
        None
    } else {
        Some(left)
    }
}

/// "MM:SS" countdown display; hours roll into the minutes field.
pub fn format_remaining(left: Duration) -> String {
    let secs = left.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// A cancellable once-per-tick countdown task. The current formatted
/// value is published through a watch channel: `Some("MM:SS")` while
/// counting, `None` once expired. No task is spawned at all when the
/// expiry instant is absent or already past.
pub struct CountdownClock;

pub struct CountdownHandle {
    rx: watch::Receiver<Option<String>>,
    task: Option<JoinHandle<()>>,
}

impl CountdownClock {
    pub fn start(expires_at: Option<DateTime<Utc>>, tick: std::time::Duration) -> CountdownHandle {
        let initial = remaining(expires_at, Utc::now());
        let (tx, rx) = watch::channel(initial.map(format_remaining));

        let Some(expires_at) = expires_at else {
            return CountdownHandle { rx, task: None };
        };
        if initial.is_none() {
            // Already past: report expired immediately, no timer
            return CountdownHandle { rx, task: None };
        }

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick fires immediately; the initial value is
            // already in the channel
            interval.tick().await;
            loop {
                interval.tick().await;
                let left = remaining(Some(expires_at), Utc::now());
                let expired = left.is_none();
                if tx.send(left.map(format_remaining)).is_err() {
                    break;
                }
                if expired {
                    break;
                }
            }
        });

        CountdownHandle { rx, task: Some(task) }
    }
}

impl CountdownHandle {
    /// Latest published value. None means expired or no hold tracked.
    pub fn current(&self) -> Option<String> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the timer task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
