use std::time::Duration;

/// Dummy timer when `timing` is disabled (zero-sized).
pub struct Timer;

impl Timer {
    #[inline(always)]
    pub fn start() -> Self {
        Self
    }

    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        Duration::ZERO
    }
}

/// Dummy phase timings when `timing` is disabled (zero-sized).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeedingTimings;

impl SeedingTimings {
    #[inline(always)]
    pub fn total(&self) -> Duration {
        Duration::ZERO
    }
}

/// Dummy builder when `timing` is disabled (zero-sized).
#[derive(Default)]
pub struct TimingBuilder;

impl TimingBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }
    #[inline(always)]
    pub fn set_fill(&mut self, _d: Duration) {}
    #[inline(always)]
    pub fn add_pairs(&mut self, _d: Duration) {}
    #[inline(always)]
    pub fn add_extend(&mut self, _d: Duration) {}
    #[inline(always)]
    pub fn add_build(&mut self, _d: Duration) {}
    #[inline(always)]
    pub fn finish(self) -> SeedingTimings {
        SeedingTimings
    }
}
