//! Presentation pacing: a fixed pause after every emitted event so a human
//! or a renderer can follow the schedule.

use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::trace;

/// Injectable delay applied after each event. A zero delay never blocks.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
    jitter: bool,
}

impl Pacer {
    pub fn new(delay: Duration, jitter: bool) -> Self {
        Self { delay, jitter }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, false)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_enabled(&self) -> bool {
        !self.delay.is_zero()
    }

    fn next_delay(&self) -> Duration {
        if self.jitter {
            let factor: f64 = rand::thread_rng().gen_range(0.5..1.5);
            self.delay.mul_f64(factor)
        } else {
            self.delay
        }
    }

    /// Sleep for one pacing step on the calling thread.
    pub fn pause(&self) {
        if !self.is_enabled() {
            return;
        }
        let wait = self.next_delay();
        trace!(?wait, "pacing");
        thread::sleep(wait);
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::disabled()
    }
}
