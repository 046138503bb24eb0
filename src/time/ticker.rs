use embassy_time::{Duration, Instant, Timer};

/// Alternating key-down / key-up periods, scheduled from the previous edge rather than
/// from when the caller got round to waiting, so a slow `apply_settings` does not
/// stretch the cycle.
pub struct KeyingTicker {
    measured_from: Instant,
    on: Duration,
    off: Duration,
    key_down: bool,
}

impl KeyingTicker {
    /// Starts key-up; the first `next` returns at the first key-down edge.
    pub fn new(on: Duration, off: Duration) -> Self {
        Self {
            measured_from: Instant::now(),
            on,
            off,
            key_down: false,
        }
    }

    /// Waits for the next edge and returns whether the key is down after it.
    pub async fn next(&mut self) -> bool {
        let hold = if self.key_down { self.on } else { self.off };
        let expires_at = self.measured_from + hold;
        if expires_at > Instant::now() {
            Timer::at(expires_at).await;
        }
        self.measured_from = expires_at;
        self.key_down = !self.key_down;
        self.key_down
    }
}
