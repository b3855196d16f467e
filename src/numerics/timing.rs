#![allow(unused)]
use std::cell::RefCell;
use std::time::Duration;

#[derive(Default, Clone)]
pub struct TimingStats {
    pub sweep_times: Vec<Duration>,
    pub total_time: Duration,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "timing")]
    pub fn log_summary(&self) {
        if self.sweep_times.is_empty() {
            return;
        }

        let total_sweeps: Duration = self.sweep_times.iter().sum();
        let overhead = self.total_time.saturating_sub(total_sweeps);
        let slowest = self.sweep_times.iter().max().copied().unwrap_or_default();

        log::info!(
            "relaxation timing: total {:.3}s, {} sweeps, avg {:.3}ms, max {:.3}ms, overhead {:.3}ms",
            self.total_time.as_secs_f64(),
            self.sweep_times.len(),
            total_sweeps.as_secs_f64() * 1000.0 / self.sweep_times.len() as f64,
            slowest.as_secs_f64() * 1000.0,
            overhead.as_secs_f64() * 1000.0
        );
    }

    #[cfg(not(feature = "timing"))]
    pub fn log_summary(&self) {}
}

#[cfg(feature = "timing")]
thread_local! {
    static TIMING_STATS: RefCell<TimingStats> = RefCell::new(TimingStats::new());
}

#[cfg(feature = "timing")]
pub fn reset_timing() {
    TIMING_STATS.with(|stats| {
        *stats.borrow_mut() = TimingStats::new();
    });
}

#[cfg(not(feature = "timing"))]
pub fn reset_timing() {}

#[cfg(feature = "timing")]
pub fn record_sweep<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    TIMING_STATS.with(|stats| {
        stats.borrow_mut().sweep_times.push(elapsed);
    });
    result
}

#[cfg(not(feature = "timing"))]
pub fn record_sweep<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(feature = "timing")]
pub fn finalize_timing(total_time: Duration) -> TimingStats {
    TIMING_STATS.with(|stats| {
        let mut s = stats.borrow_mut();
        s.total_time = total_time;
        s.clone()
    })
}

#[cfg(not(feature = "timing"))]
pub fn finalize_timing(_total_time: Duration) -> TimingStats {
    TimingStats::new()
}

pub fn finalize_and_log(total_time: Duration) {
    finalize_timing(total_time).log_summary();
}
