//! Wall-clock timing record for a run.

use std::time::{Duration, Instant};

/// Opened just before the first enqueue, closed when the run is observed
/// complete. Backed by [`Instant`], so readings never go backwards.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    started: Instant,
    stopped: Option<Instant>,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stopped: None,
        }
    }

    /// Close the record. Later calls keep the first end instant.
    pub fn stop(&mut self) {
        if self.stopped.is_none() {
            self.stopped = Some(Instant::now());
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_some()
    }

    /// Time since start, frozen once stopped.
    pub fn elapsed(&self) -> Duration {
        match self.stopped {
            Some(end) => end.duration_since(self.started),
            None => self.started.elapsed(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}
