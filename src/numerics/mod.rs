pub mod jacobi;
pub mod solver;
pub mod timing;

/// Relative change `|b - a| / |a|` of two non-negative magnitudes (norms,
/// averages). A zero reference yields 0 when nothing moved and infinity
/// otherwise.
pub fn relative_change(previous: f64, current: f64) -> f64 {
    let diff = (current - previous).abs();
    if previous == 0.0 {
        if diff == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        diff / previous.abs()
    }
}

/// When the outer (boundary update + relaxation) loop stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StoppingRule {
    /// Rate-of-change heuristic: stop once the change `Δ` between successive
    /// iterations starts growing again (`Δ_k - Δ_{k-1} > 0`), but never before
    /// `min_iterations` iterations. `Δ_0` is taken as 1.
    ///
    /// Fragile: a transient bump stops it early, and a change that decays
    /// monotonically forever never stops it (the iteration ceiling does).
    RateIncrease { min_iterations: usize },
    /// Stop once the change drops below the tolerance.
    BelowTolerance(f64),
}

impl StoppingRule {
    /// `iteration` counts from 1.
    pub fn should_stop(&self, iteration: usize, previous_change: f64, change: f64) -> bool {
        match *self {
            StoppingRule::RateIncrease { min_iterations } => {
                change - previous_change > 0.0 && iteration >= min_iterations
            }
            StoppingRule::BelowTolerance(tol) => change < tol,
        }
    }
}

/// Convergence control of one relaxation (inner Jacobi) loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxationSettings {
    /// Sweeps stop once the relative L2-norm change falls below this.
    pub tolerance: f64,
    pub max_sweeps: usize,
}

impl RelaxationSettings {
    pub fn grid() -> Self {
        Self {
            tolerance: 1e-14,
            max_sweeps: 1_000_000,
        }
    }

    pub fn composite() -> Self {
        Self {
            tolerance: 5e-6,
            max_sweeps: 1_000_000,
        }
    }
}

impl Default for RelaxationSettings {
    fn default() -> Self {
        Self::composite()
    }
}

/// Convergence control of the outer loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationSettings {
    pub stopping: StoppingRule,
    pub max_iterations: usize,
    pub relaxation: RelaxationSettings,
}

impl IterationSettings {
    pub fn grid() -> Self {
        Self {
            stopping: StoppingRule::RateIncrease { min_iterations: 3 },
            max_iterations: 10_000,
            relaxation: RelaxationSettings::grid(),
        }
    }

    pub fn composite() -> Self {
        Self {
            stopping: StoppingRule::BelowTolerance(1e-5),
            max_iterations: 100_000,
            relaxation: RelaxationSettings::composite(),
        }
    }
}

impl Default for IterationSettings {
    fn default() -> Self {
        Self::composite()
    }
}
