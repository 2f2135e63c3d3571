//! Per-iteration wall-clock breakdown of a solve, collected behind the
//! `timing` feature. Without the feature every recorder just runs its closure.
#![allow(unused)]
use std::cell::RefCell;
use std::time::Duration;

/// The two timed phases of an outer iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Relaxation,
    Boundary,
}

/// One outer iteration: a relaxation followed by a boundary update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IterationTiming {
    pub relaxation: Duration,
    pub boundary: Duration,
    pub sweeps: usize,
}

impl IterationTiming {
    /// Mean time of one Jacobi sweep in this iteration's relaxation.
    pub fn per_sweep(&self) -> Duration {
        if self.sweeps == 0 {
            return Duration::ZERO;
        }
        self.relaxation / self.sweeps as u32
    }
}

#[derive(Clone, Debug, Default)]
pub struct TimingStats {
    /// Boundary update done once before the first relaxation.
    pub initial_boundary: Duration,
    pub iterations: Vec<IterationTiming>,
    pub total_time: Duration,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute `elapsed` to `phase`. A relaxation opens a new iteration; a
    /// boundary update closes the open one, or is the initial update if none
    /// is open yet.
    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        match phase {
            Phase::Relaxation => self.iterations.push(IterationTiming {
                relaxation: elapsed,
                ..IterationTiming::default()
            }),
            Phase::Boundary => match self.iterations.last_mut() {
                Some(last) => last.boundary += elapsed,
                None => self.initial_boundary += elapsed,
            },
        }
    }

    pub fn record_sweeps(&mut self, count: usize) {
        if let Some(last) = self.iterations.last_mut() {
            last.sweeps = count;
        }
    }

    pub fn total_sweeps(&self) -> usize {
        self.iterations.iter().map(|it| it.sweeps).sum()
    }

    pub fn relaxation_time(&self) -> Duration {
        self.iterations.iter().map(|it| it.relaxation).sum()
    }

    pub fn boundary_time(&self) -> Duration {
        self.initial_boundary + self.iterations.iter().map(|it| it.boundary).sum::<Duration>()
    }

    /// Index and timing of the iteration with the longest relaxation.
    pub fn slowest(&self) -> Option<(usize, &IterationTiming)> {
        self.iterations
            .iter()
            .enumerate()
            .max_by_key(|(_, it)| it.relaxation)
    }

    #[cfg(feature = "timing")]
    pub fn print_summary(&self) {
        if self.iterations.is_empty() {
            return;
        }
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        let n = self.iterations.len();
        let relax = self.relaxation_time();
        let boundary = self.boundary_time();
        let overhead = self.total_time.saturating_sub(relax + boundary);
        let sweeps = self.total_sweeps();
        let fewest = self.iterations.iter().map(|it| it.sweeps).min().unwrap_or(0);
        let most = self.iterations.iter().map(|it| it.sweeps).max().unwrap_or(0);

        println!("\n{}", "=".repeat(60));
        println!("{:^60}", "RELAXATION TIMING");
        println!("{}", "=".repeat(60));
        println!("Total:          {:.3}s over {n} iterations", self.total_time.as_secs_f64());
        println!(
            "Relaxation:     {:>9.3}ms  ({:.1}% of total)",
            ms(relax),
            100.0 * relax.as_secs_f64() / self.total_time.as_secs_f64().max(f64::EPSILON)
        );
        println!(
            "Boundary:       {:>9.3}ms  ({:.3}ms initial)",
            ms(boundary),
            ms(self.initial_boundary)
        );
        println!("Other:          {:>9.3}ms", ms(overhead));
        println!("{}", "-".repeat(60));
        println!(
            "Sweeps:         {sweeps} total, {:.1} per iteration ({fewest}..{most})",
            sweeps as f64 / n as f64
        );
        if sweeps > 0 {
            println!("Per sweep:      {:>9.3}us", relax.as_secs_f64() * 1e6 / sweeps as f64);
        }
        if let Some((i, it)) = self.slowest() {
            println!(
                "Slowest:        iteration {} ({:.3}ms, {} sweeps)",
                i + 1,
                ms(it.relaxation),
                it.sweeps
            );
        }
        println!("{}\n", "=".repeat(60));
    }

    #[cfg(not(feature = "timing"))]
    pub fn print_summary(&self) {}
}

#[cfg(feature = "timing")]
thread_local! {
    static TIMING_STATS: RefCell<TimingStats> = RefCell::new(TimingStats::new());
}

#[cfg(feature = "timing")]
pub fn reset_timing() {
    TIMING_STATS.with(|stats| *stats.borrow_mut() = TimingStats::new());
}

#[cfg(not(feature = "timing"))]
pub fn reset_timing() {}

#[cfg(feature = "timing")]
fn record_phase<F, R>(phase: Phase, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = std::time::Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    TIMING_STATS.with(|stats| stats.borrow_mut().record(phase, elapsed));
    result
}

#[cfg(not(feature = "timing"))]
fn record_phase<F, R>(_phase: Phase, f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

pub fn record_relaxation<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    record_phase(Phase::Relaxation, f)
}

pub fn record_boundary_update<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    record_phase(Phase::Boundary, f)
}

#[cfg(feature = "timing")]
pub fn record_sweeps(count: usize) {
    TIMING_STATS.with(|stats| stats.borrow_mut().record_sweeps(count));
}

#[cfg(not(feature = "timing"))]
pub fn record_sweeps(_count: usize) {}

#[cfg(feature = "timing")]
pub fn finalize_and_print(total_time: Duration) {
    let stats = TIMING_STATS.with(|stats| {
        let mut s = stats.borrow_mut();
        s.total_time = total_time;
        s.clone()
    });
    stats.print_summary();
}

#[cfg(not(feature = "timing"))]
pub fn finalize_and_print(_total_time: Duration) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn phases_are_grouped_per_iteration() {
        let mut stats = TimingStats::new();
        stats.record(Phase::Boundary, ms(1));
        stats.record(Phase::Relaxation, ms(40));
        stats.record_sweeps(20);
        stats.record(Phase::Boundary, ms(2));
        stats.record(Phase::Relaxation, ms(90));
        stats.record_sweeps(30);
        stats.record(Phase::Boundary, ms(3));

        assert_eq!(stats.initial_boundary, ms(1));
        assert_eq!(stats.iterations.len(), 2);
        assert_eq!(stats.iterations[0].boundary, ms(2));
        assert_eq!(stats.iterations[0].per_sweep(), ms(2));
        assert_eq!(stats.total_sweeps(), 50);
        assert_eq!(stats.relaxation_time(), ms(130));
        assert_eq!(stats.boundary_time(), ms(6));
        assert_eq!(stats.slowest().map(|(i, _)| i), Some(1));
    }

    #[test]
    fn sweeps_before_any_relaxation_are_ignored() {
        let mut stats = TimingStats::new();
        stats.record_sweeps(7);
        assert_eq!(stats.total_sweeps(), 0);
        assert_eq!(IterationTiming::default().per_sweep(), Duration::ZERO);
    }
}
