use thiserror::Error;

use crate::discretization::generator::Axis;

/// Result alias for geometry and parameter validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid geometry or material parameters. Always fatal: the caller has to
/// fix its inputs and rebuild.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("material id must be >= 0, got {0}")]
    NegativeMaterialId(i32),

    #[error("step must be positive, got {0}")]
    NonPositiveStep(f64),

    #[error("empty {axis} extent [{start}, {stop})")]
    EmptyExtent { axis: Axis, start: f64, stop: f64 },

    #[error("step {step} does not evenly divide the {axis} extent {span}")]
    StepDoesNotDivide { axis: Axis, span: f64, step: f64 },

    #[error("conductivity must be positive, got {0}")]
    NonPositiveConductivity(f64),

    #[error("step sizes differ: {expected} vs {found}")]
    StepMismatch { expected: f64, found: f64 },

    #[error("{axis} start {start} is not a multiple of step {step}")]
    OffLattice { axis: Axis, start: f64, step: f64 },

    #[error("material {0} registered twice with different parameters")]
    ConflictingMaterial(i32),

    #[error("grid has no ghost border")]
    MissingGhostBorder,

    #[error("material {0} is not part of this composite")]
    UnknownMaterial(i32),

    #[error("unknown convection mode '{0}', expected 'natural' or 'forced'")]
    UnknownConvectionMode(String),
}
