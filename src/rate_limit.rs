use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Sliding-window limiter: at most `rate_num` admissions in any trailing
/// `rate_time`.
///
/// The window holds the instants of admitted requests, oldest first. Expired
/// entries are dropped lazily on each check, there is no background timer.
/// `Instant` is monotonic, so entries are pushed in non-decreasing order and
/// trimming can stop at the first entry still inside the window.
#[derive(Debug)]
pub struct RateLimiter {
    window: Mutex<VecDeque<Instant>>,
    rate_num: usize,
    rate_time: Duration,
}

impl RateLimiter {
    pub fn new(rate_num: usize, rate_time: Duration) -> Self {
        Self {
            window: Mutex::new(VecDeque::new()),
            rate_num,
            rate_time,
        }
    }

    // Admit or deny a request arriving now
    pub fn check(&self) -> bool {
        self.check_at(Instant::now())
    }

    pub fn check_at(&self, now: Instant) -> bool {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);

        while let Some(&oldest) = window.front() {
            if now.saturating_duration_since(oldest) < self.rate_time {
                break;
            }
            window.pop_front();
        }

        if window.len() < self.rate_num {
            window.push_back(now);
            true
        } else {
            false
        }
    }

    // Number of admissions currently counted against the window
    pub fn in_window(&self) -> usize {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
