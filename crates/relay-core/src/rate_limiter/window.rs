//! Sliding window request counter

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Admits at most `max_requests` within any trailing `window`
#[derive(Debug)]
pub struct SlidingWindow {
    window: Duration,
    max_requests: u32,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindow {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            window,
            max_requests,
            timestamps: Mutex::new(VecDeque::with_capacity(max_requests as usize)),
        }
    }

    /// Create with requests per minute
    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(60))
    }

    /// Record a request if the window has room
    ///
    /// On rejection returns how long until the oldest recorded request
    /// leaves the window.
    pub fn try_record(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut timestamps = self.timestamps.lock();
        Self::evict(&mut timestamps, now, self.window);

        if timestamps.len() < self.max_requests as usize {
            timestamps.push_back(now);
            return Ok(());
        }

        let wait = timestamps
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(self.window);
        Err(wait)
    }

    /// Requests currently counted in the window
    pub fn current_count(&self) -> usize {
        let mut timestamps = self.timestamps.lock();
        Self::evict(&mut timestamps, Instant::now(), self.window);
        timestamps.len()
    }

    fn evict(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(front) = timestamps.front() {
            if now.duration_since(*front) >= window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}
