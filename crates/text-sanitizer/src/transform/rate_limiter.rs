use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Sliding-window ceiling on outbound calls, shared by every worker.
///
/// At most `max_calls` calls may start inside any trailing `period`. The
/// check-and-record step runs under the mutex; waiting happens with the lock
/// released and the check is repeated after waking.
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            period,
            calls: Mutex::new(VecDeque::with_capacity(max_calls.max(1))),
        }
    }

    /// Wait until a call slot is free, then claim it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut calls = self.calls.lock();
                let now = Instant::now();
                Self::prune(&mut calls, now, self.period);

                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    debug!(
                        "Rate limiter: {} calls in the last {} seconds",
                        calls.len(),
                        self.period.as_secs()
                    );
                    return;
                }

                match calls.front() {
                    Some(oldest) => self.period.saturating_sub(now.duration_since(*oldest)),
                    None => Duration::ZERO,
                }
            };

            debug!("Rate limit reached. Sleeping for {:.2} seconds", wait.as_secs_f64());
            sleep(wait).await;
        }
    }

    /// Calls currently counted against the window
    pub fn in_window(&self) -> usize {
        let mut calls = self.calls.lock();
        Self::prune(&mut calls, Instant::now(), self.period);
        calls.len()
    }

    fn prune(calls: &mut VecDeque<Instant>, now: Instant, period: Duration) {
        while let Some(oldest) = calls.front() {
            if now.duration_since(*oldest) >= period {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}
