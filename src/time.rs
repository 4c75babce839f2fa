use std::time::{Duration, Instant};

pub struct Stopwatch {
    start: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            start: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn start_new() -> Self {
        let mut sw = Self::new();
        sw.start();

        sw
    }

    pub fn start(&mut self) {
        if self.start.is_none() {
            self.start = Some(Instant::now());
        }
    }

    pub fn stop(&mut self) {
        self.elapsed = self.elapsed();
        self.start = None;
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match self.start {
            Some(start) => self.elapsed + start.elapsed(),
            None => self.elapsed,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Slice of a frame that opportunistic work may spend.
pub struct FrameBudget {
    stopwatch: Stopwatch,
    budget: Duration,
}

impl FrameBudget {
    pub fn start(budget: Duration) -> Self {
        Self {
            stopwatch: Stopwatch::start_new(),
            budget,
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.stopwatch.elapsed() < self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.stopwatch.elapsed())
    }

    pub fn spent(&self) -> Duration {
        self.stopwatch.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_stopwatch_keeps_its_time() {
        let mut sw = Stopwatch::start_new();
        std::thread::sleep(Duration::from_millis(2));
        sw.stop();

        let elapsed = sw.elapsed();
        assert!(elapsed >= Duration::from_millis(2));
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(), elapsed);
    }

    #[test]
    fn zero_budget_is_spent_immediately() {
        let budget = FrameBudget::start(Duration::ZERO);
        assert!(!budget.has_remaining());
        assert_eq!(budget.remaining(), Duration::ZERO);

        let generous = FrameBudget::start(Duration::from_secs(60));
        assert!(generous.has_remaining());
    }
}
