use crate::error::ConfigError;
#[allow(unused)]
use crate::numerics::timing::{
    finalize_and_print, record_boundary_update, record_relaxation, record_sweeps, reset_timing,
};
use crate::numerics::IterationSettings;
use crate::physics::ThermalModel;
use crate::physics::convection::Convection;
use log::{debug, info, warn};
use thiserror::Error;

#[cfg(feature = "timing")]
use std::time::Instant;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("relaxation did not settle within {sweeps} sweeps (last change {change:.3e})")]
    RelaxationStalled { sweeps: usize, change: f64 },
    #[error("failed to converge within {iterations} iterations (last change {change:.3e})")]
    NonConvergence { iterations: usize, change: f64 },
    #[error("temperature field became non-finite at iteration {0}")]
    NonFinite(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug)]
pub struct SolverResult {
    pub iterations: usize,
    /// Jacobi sweeps summed over every relaxation.
    pub sweeps: usize,
    pub final_change: f64,
    /// Change recorded after each outer iteration.
    pub history: Vec<f64>,
}

/// Alternates relaxation and boundary update until the stopping rule fires.
pub struct IterativeSolver {
    pub settings: IterationSettings,
    pub convection: Convection,
}

impl IterativeSolver {
    pub fn new(settings: IterationSettings, convection: Convection) -> Self {
        Self {
            settings,
            convection,
        }
    }

    pub fn solve<M: ThermalModel>(&self, model: &mut M) -> Result<SolverResult, SolverError> {
        reset_timing();

        #[cfg(feature = "timing")]
        let solve_start = Instant::now();

        model.initialize()?;
        record_boundary_update(|| model.update_boundary(&self.convection))?;

        let mut previous = model.snapshot()?;
        let mut previous_change = 1.0;
        let mut history = Vec::new();
        let mut total_sweeps = 0;

        debug!(
            "iterating: {:?} convection, {:?}, at most {} iterations",
            self.convection.mode, self.settings.stopping, self.settings.max_iterations
        );

        for iteration in 1..=self.settings.max_iterations {
            let sweeps = record_relaxation(|| model.relax(&self.settings.relaxation))?;
            record_sweeps(sweeps);
            total_sweeps += sweeps;

            record_boundary_update(|| model.update_boundary(&self.convection))?;

            if !model.is_finite() {
                warn!("non-finite temperature at iteration {iteration}");
                return Err(SolverError::NonFinite(iteration));
            }

            let current = model.snapshot()?;
            let change = model.change(&previous, &current);
            history.push(change);

            debug!(
                "{iteration:>5} | change {change:>10.3e} | delta {:>10.3e} | sweeps {sweeps}",
                change - previous_change
            );

            let stop = self
                .settings
                .stopping
                .should_stop(iteration, previous_change, change);
            previous = current;
            previous_change = change;

            if stop {
                #[cfg(feature = "timing")]
                finalize_and_print(solve_start.elapsed());

                info!(
                    "converged after {iteration} iterations ({total_sweeps} sweeps), change {change:.3e}"
                );
                return Ok(SolverResult {
                    iterations: iteration,
                    sweeps: total_sweeps,
                    final_change: change,
                    history,
                });
            }
        }

        #[cfg(feature = "timing")]
        finalize_and_print(solve_start.elapsed());

        warn!(
            "no convergence after {} iterations, last change {previous_change:.3e}",
            self.settings.max_iterations
        );
        Err(SolverError::NonConvergence {
            iterations: self.settings.max_iterations,
            change: previous_change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerics::{RelaxationSettings, StoppingRule};

    /// Replays a fixed sequence of snapshot values.
    struct Scripted {
        values: Vec<f64>,
        cursor: usize,
        relaxations: usize,
        boundary_updates: usize,
    }

    impl Scripted {
        fn new(values: Vec<f64>) -> Self {
            Self {
                values,
                cursor: 0,
                relaxations: 0,
                boundary_updates: 0,
            }
        }
    }

    impl ThermalModel for Scripted {
        type Snapshot = f64;

        fn initialize(&mut self) -> Result<(), SolverError> {
            Ok(())
        }

        fn update_boundary(&mut self, _: &Convection) -> Result<(), SolverError> {
            self.boundary_updates += 1;
            Ok(())
        }

        fn relax(&mut self, _: &RelaxationSettings) -> Result<usize, SolverError> {
            self.relaxations += 1;
            self.cursor += 1;
            Ok(2)
        }

        fn snapshot(&self) -> Result<f64, SolverError> {
            Ok(self.values[self.cursor.min(self.values.len() - 1)])
        }

        fn change(&self, previous: &f64, current: &f64) -> f64 {
            (current - previous).abs()
        }

        fn is_finite(&self) -> bool {
            self.snapshot().map(f64::is_finite).unwrap_or(false)
        }
    }

    fn solver(stopping: StoppingRule, max_iterations: usize) -> IterativeSolver {
        IterativeSolver::new(
            IterationSettings {
                stopping,
                max_iterations,
                relaxation: RelaxationSettings::grid(),
            },
            Convection::default(),
        )
    }

    #[test]
    fn rate_rule_runs_at_least_three_iterations() {
        // Changes: 0.5, 0.6 (growing at iteration 2), 0.7, ...
        let mut model = Scripted::new(vec![0.0, 0.5, 1.1, 1.8, 2.6]);
        let result = solver(StoppingRule::RateIncrease { min_iterations: 3 }, 10)
            .solve(&mut model)
            .unwrap();
        assert_eq!(result.iterations, 3);
        assert_eq!(result.sweeps, 6);
        assert_eq!(model.relaxations, 3);
        assert_eq!(model.boundary_updates, 4);
    }

    #[test]
    fn rate_rule_keeps_going_while_change_shrinks() {
        // Changes: 0.4, 0.2, 0.1, 0.05, 0.1
        let mut model = Scripted::new(vec![0.0, 0.4, 0.6, 0.7, 0.75, 0.85]);
        let result = solver(StoppingRule::RateIncrease { min_iterations: 3 }, 10)
            .solve(&mut model)
            .unwrap();
        assert_eq!(result.iterations, 5);
        assert!((result.final_change - 0.1).abs() < 1e-12);
        assert_eq!(result.history.len(), 5);
    }

    #[test]
    fn ceiling_reports_non_convergence() {
        let mut model = Scripted::new(vec![0.0, 1.0, 1.5, 1.75, 1.875, 1.9375]);
        let err = solver(StoppingRule::BelowTolerance(1e-6), 4)
            .solve(&mut model)
            .unwrap_err();
        assert!(matches!(err, SolverError::NonConvergence { iterations: 4, .. }));
    }

    #[test]
    fn non_finite_field_is_reported() {
        let mut model = Scripted::new(vec![0.0, 1.0, f64::NAN]);
        let err = solver(StoppingRule::BelowTolerance(1e-6), 10)
            .solve(&mut model)
            .unwrap_err();
        assert!(matches!(err, SolverError::NonFinite(2)));
    }
}
