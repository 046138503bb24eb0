use embassy_time::{Duration, Instant};

/// Logs how long a block took when dropped. Buffer regeneration at the full 15000 words
/// is the slow path worth watching.
pub struct StopWatch {
    label: &'static str,
    started: Instant,
}

impl StopWatch {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now() - self.started
    }
}

impl Drop for StopWatch {
    fn drop(&mut self) {
        defmt::info!("{} took {} us", self.label, self.elapsed().as_micros());
    }
}
