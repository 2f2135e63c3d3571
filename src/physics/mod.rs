pub mod bc;
pub mod convection;

use crate::error::{ConfigError, ConfigResult};
use crate::numerics::RelaxationSettings;
use crate::numerics::solver::SolverError;
use convection::Convection;

/// Tag of a ghost (fictitious) or interface cell.
pub const GHOST: i32 = -1;
/// Tag of an ambient cell outside every material region.
pub const AMBIENT: i32 = -2;

pub type MaterialId = i32;

/// How a tag matrix entry classifies its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Interior(MaterialId),
    Ghost,
    Ambient,
}

impl CellKind {
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            t if t >= 0 => CellKind::Interior(t),
            GHOST => CellKind::Ghost,
            _ => CellKind::Ambient,
        }
    }
}

/// Physical constants of one homogeneous material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    /// Thermal conductivity k.
    pub conductivity: f64,
    /// Volumetric power density q.
    pub source: f64,
    /// Uniform starting temperature [K].
    pub initial_guess: f64,
}

impl Material {
    pub fn new(
        id: MaterialId,
        conductivity: f64,
        source: f64,
        initial_guess: f64,
    ) -> ConfigResult<Self> {
        if id < 0 {
            return Err(ConfigError::NegativeMaterialId(id));
        }
        if !(conductivity > 0.0) {
            return Err(ConfigError::NonPositiveConductivity(conductivity));
        }
        Ok(Self {
            id,
            conductivity,
            source,
            initial_guess,
        })
    }

    /// Per-sweep source contribution `step² · (q/k) / 4` of the 5-point stencil.
    pub fn source_increment(&self, step: f64) -> f64 {
        step * step * (self.source / self.conductivity) / 4.0
    }
}

/// A discretized thermal problem that the iteration driver can advance.
///
/// One outer iteration is a full relaxation followed by a boundary update;
/// the driver compares successive snapshots to decide when to stop.
pub trait ThermalModel {
    /// State compared between outer iterations.
    type Snapshot;

    /// Reset the unknowns to their starting values, if the model does that.
    fn initialize(&mut self) -> Result<(), SolverError>;

    /// Recompute ghost/interface values from the current field.
    fn update_boundary(&mut self, convection: &Convection) -> Result<(), SolverError>;

    /// Jacobi-sweep to convergence with the boundary held fixed.
    /// Returns the number of sweeps taken.
    fn relax(&mut self, settings: &RelaxationSettings) -> Result<usize, SolverError>;

    fn snapshot(&self) -> Result<Self::Snapshot, SolverError>;

    /// Relative change between two snapshots.
    fn change(&self, previous: &Self::Snapshot, current: &Self::Snapshot) -> f64;

    fn is_finite(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_classify_cells() {
        assert_eq!(CellKind::from_tag(0), CellKind::Interior(0));
        assert_eq!(CellKind::from_tag(3), CellKind::Interior(3));
        assert_eq!(CellKind::from_tag(GHOST), CellKind::Ghost);
        assert_eq!(CellKind::from_tag(AMBIENT), CellKind::Ambient);
    }

    #[test]
    fn material_validation() {
        assert_eq!(
            Material::new(-1, 1.0, 0.0, 300.0),
            Err(ConfigError::NegativeMaterialId(-1))
        );
        assert_eq!(
            Material::new(0, 0.0, 0.0, 300.0),
            Err(ConfigError::NonPositiveConductivity(0.0))
        );
        let m = Material::new(0, 0.5, 2.0, 300.0).unwrap();
        assert!((m.source_increment(0.2) - 0.04).abs() < 1e-15);
    }
}
