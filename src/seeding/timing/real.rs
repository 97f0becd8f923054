use std::time::{Duration, Instant};

/// Timer that tracks elapsed time when timing is enabled.
pub struct Timer(Instant);

impl Timer {
    #[inline]
    pub fn start() -> Self {
        Self(Instant::now())
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// Wall-clock time per seeding phase, summed over iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeedingTimings {
    pub fill: Duration,
    pub pairs: Duration,
    pub extend: Duration,
    pub build: Duration,
}

impl SeedingTimings {
    #[inline]
    pub fn total(&self) -> Duration {
        self.fill + self.pairs + self.extend + self.build
    }
}

/// Accumulates phase timings during one event.
#[derive(Default)]
pub struct TimingBuilder {
    timings: SeedingTimings,
}

impl TimingBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_fill(&mut self, d: Duration) {
        self.timings.fill = d;
    }

    #[inline]
    pub fn add_pairs(&mut self, d: Duration) {
        self.timings.pairs += d;
    }

    #[inline]
    pub fn add_extend(&mut self, d: Duration) {
        self.timings.extend += d;
    }

    #[inline]
    pub fn add_build(&mut self, d: Duration) {
        self.timings.build += d;
    }

    #[inline]
    pub fn finish(self) -> SeedingTimings {
        self.timings
    }
}
