use nalgebra::{DMatrix, DMatrixView};

use super::generator::{Axis, Footprint, half_open_points, lattice_index};
use crate::error::{ConfigError, ConfigResult};
use crate::numerics::jacobi::{
    has_interior, interior, interior_sweep_pointwise, interior_sweep_shifted,
};
use crate::numerics::solver::{IterativeSolver, SolverError, SolverResult};
use crate::numerics::{IterationSettings, RelaxationSettings, relative_change};
use crate::physics::bc::{Edge, convective_ghost_value};
use crate::physics::convection::{Convection, ConvectionMode};
use crate::physics::{GHOST, Material, ThermalModel};

/// Which formulation of the interior Jacobi update to run. Both give the same
/// field up to rounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SweepKernel {
    /// Explicit loop over interior cells.
    Pointwise,
    /// Sum of four shifted matrix blocks.
    #[default]
    Shifted,
}

impl SweepKernel {
    pub fn apply(self, values: &DMatrix<f64>, increment: f64) -> DMatrix<f64> {
        match self {
            SweepKernel::Pointwise => interior_sweep_pointwise(values, increment),
            SweepKernel::Shifted => interior_sweep_shifted(values, increment),
        }
    }
}

/// A uniform rectangular mesh of one homogeneous material, optionally padded
/// with a ring of ghost points carrying the boundary condition.
///
/// Matrices are indexed `(row, col) = (y, x)`.
#[derive(Clone, Debug)]
pub struct Grid {
    xpts: Vec<f64>,
    ypts: Vec<f64>,
    values: DMatrix<f64>,
    tags: DMatrix<i32>,
    material: Material,
    step: f64,
    with_ghost: bool,
    kernel: SweepKernel,
}

impl Grid {
    /// Mesh the rectangle `[x.0, x.1) x [y.0, y.1)` with spacing `step`.
    ///
    /// `step` has to divide both extents.
    pub fn new(
        x: (f64, f64),
        y: (f64, f64),
        step: f64,
        material: Material,
        with_ghost: bool,
    ) -> ConfigResult<Self> {
        // Re-validate: the fields of `Material` are public.
        let material = Material::new(
            material.id,
            material.conductivity,
            material.source,
            material.initial_guess,
        )?;
        let xpts = half_open_points(x.0, x.1, step, Axis::X)?;
        let ypts = half_open_points(y.0, y.1, step, Axis::Y)?;

        let (nr, nc) = if with_ghost {
            (ypts.len() + 2, xpts.len() + 2)
        } else {
            (ypts.len(), xpts.len())
        };

        let mut tags = DMatrix::from_element(nr, nc, material.id);
        if with_ghost {
            tags.row_mut(0).fill(GHOST);
            tags.row_mut(nr - 1).fill(GHOST);
            tags.column_mut(0).fill(GHOST);
            tags.column_mut(nc - 1).fill(GHOST);
        }

        Ok(Self {
            xpts,
            ypts,
            values: DMatrix::zeros(nr, nc),
            tags,
            material,
            step,
            with_ghost,
            kernel: SweepKernel::default(),
        })
    }

    pub fn with_kernel(mut self, kernel: SweepKernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn xpts(&self) -> &[f64] {
        &self.xpts
    }

    pub fn ypts(&self) -> &[f64] {
        &self.ypts
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Direct access to the field, e.g. to impose fixed ghost values before
    /// [`Grid::relax_with`].
    pub fn values_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.values
    }

    pub fn tags(&self) -> &DMatrix<i32> {
        &self.tags
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn has_ghost(&self) -> bool {
        self.with_ghost
    }

    /// Values without the outer ring.
    pub fn interior_values(&self) -> DMatrixView<'_, f64> {
        interior(&self.values)
    }

    /// Lattice indices covered by the mesh points, for composite assembly.
    pub fn footprint(&self) -> ConfigResult<Footprint> {
        let x0 = lattice_index(self.xpts[0], self.step, Axis::X)?;
        let y0 = lattice_index(self.ypts[0], self.step, Axis::Y)?;
        Ok(Footprint {
            x: (x0, x0 + self.xpts.len() as i64 - 1),
            y: (y0, y0 + self.ypts.len() as i64 - 1),
        })
    }

    pub fn fill_interior(&mut self, temperature: f64) {
        let (nr, nc) = self.values.shape();
        if has_interior(&self.values) {
            self.values
                .view_mut((1, 1), (nr - 2, nc - 2))
                .fill(temperature);
        }
    }

    /// One Jacobi sweep of the interior, returned without touching `self`.
    pub fn sweep(&self, kernel: SweepKernel) -> DMatrix<f64> {
        kernel.apply(&self.values, self.material.source_increment(self.step))
    }

    /// Sweep until the relative L2-norm change of the interior drops below
    /// the tolerance. The outer ring is held fixed. The field is only
    /// written back once the loop has settled.
    pub fn relax_with(
        &mut self,
        kernel: SweepKernel,
        settings: &RelaxationSettings,
    ) -> Result<usize, SolverError> {
        if !has_interior(&self.values) {
            return Ok(0);
        }

        let increment = self.material.source_increment(self.step);
        let mut current = self.values.clone();
        let mut change = f64::INFINITY;

        for sweep in 1..=settings.max_sweeps {
            let next = kernel.apply(&current, increment);
            change = relative_change(interior(&current).norm(), interior(&next).norm());
            current = next;
            if change < settings.tolerance {
                self.values = current;
                return Ok(sweep);
            }
        }

        Err(SolverError::RelaxationStalled {
            sweeps: settings.max_sweeps,
            change,
        })
    }

    /// Recompute every ghost point from the two interior points behind it.
    /// Corners are left alone.
    pub fn update_boundary(&mut self, convection: &Convection) -> ConfigResult<()> {
        if !self.with_ghost {
            return Err(ConfigError::MissingGhostBorder);
        }

        let shape = self.values.shape();
        let mut next = self.values.clone();
        for edge in Edge::ALL {
            let inward = edge.inward();
            for cell in edge.ghost_cells(shape) {
                let (Some(adjacent), Some(second)) =
                    (inward.walk(cell, 1, shape), inward.walk(cell, 2, shape))
                else {
                    continue;
                };
                let t_adjacent = self.values[adjacent];
                next[cell] = convective_ghost_value(
                    t_adjacent,
                    self.values[second],
                    convection.coefficient(t_adjacent),
                    self.step,
                    self.material.conductivity,
                    convection.ambient,
                );
            }
        }
        self.values = next;
        Ok(())
    }

    /// Solve from the initial guess with the rate-increase stopping rule.
    pub fn iterate(&mut self, mode: ConvectionMode) -> Result<SolverResult, SolverError> {
        self.iterate_with(IterationSettings::grid(), Convection::new(mode))
    }

    pub fn iterate_with(
        &mut self,
        settings: IterationSettings,
        convection: Convection,
    ) -> Result<SolverResult, SolverError> {
        IterativeSolver::new(settings, convection).solve(self)
    }
}

impl ThermalModel for Grid {
    type Snapshot = DMatrix<f64>;

    fn initialize(&mut self) -> Result<(), SolverError> {
        if !self.with_ghost {
            return Err(ConfigError::MissingGhostBorder.into());
        }
        self.fill_interior(self.material.initial_guess);
        Ok(())
    }

    fn update_boundary(&mut self, convection: &Convection) -> Result<(), SolverError> {
        Grid::update_boundary(self, convection).map_err(SolverError::from)
    }

    fn relax(&mut self, settings: &RelaxationSettings) -> Result<usize, SolverError> {
        self.relax_with(self.kernel, settings)
    }

    fn snapshot(&self) -> Result<DMatrix<f64>, SolverError> {
        Ok(self.interior_values().clone_owned())
    }

    fn change(&self, previous: &DMatrix<f64>, current: &DMatrix<f64>) -> f64 {
        relative_change(previous.norm(), current.norm())
    }

    fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::convection::AMBIENT_TEMPERATURE;

    fn material(q: f64, t_guess: f64) -> Material {
        Material::new(0, 0.15, q, t_guess).unwrap()
    }

    #[test]
    fn ghost_ring_layout() {
        let grid = Grid::new((0.0, 1.0), (0.0, 0.5), 0.25, material(0.0, 300.0), true).unwrap();
        assert_eq!(grid.xpts().len(), 4);
        assert_eq!(grid.ypts().len(), 2);
        assert_eq!(grid.tags().shape(), (4, 6));
        assert_eq!(grid.values().shape(), grid.tags().shape());
        for j in 0..6 {
            assert_eq!(grid.tags()[(0, j)], GHOST);
            assert_eq!(grid.tags()[(3, j)], GHOST);
        }
        for i in 0..4 {
            assert_eq!(grid.tags()[(i, 0)], GHOST);
            assert_eq!(grid.tags()[(i, 5)], GHOST);
        }
        assert!(grid.interior_values().iter().all(|&v| v == 0.0));
        assert_eq!(grid.tags()[(1, 1)], 0);
        assert_eq!(grid.tags()[(2, 4)], 0);
    }

    #[test]
    fn without_ghost_every_cell_is_material() {
        let m = Material::new(4, 1.0, 0.0, 300.0).unwrap();
        let grid = Grid::new((0.0, 1.0), (0.0, 1.0), 0.5, m, false).unwrap();
        assert_eq!(grid.tags().shape(), (2, 2));
        assert!(grid.tags().iter().all(|&t| t == 4));
    }

    #[test]
    fn single_cell_without_ghost_has_empty_interior() {
        let mut grid =
            Grid::new((0.0, 1.0), (0.0, 1.0), 1.0, material(0.5, 300.0), false).unwrap();
        grid.values_mut()[(0, 0)] = 310.0;
        assert_eq!(grid.interior_values().shape(), (0, 0));
        for kernel in [SweepKernel::Pointwise, SweepKernel::Shifted] {
            assert_eq!(&grid.sweep(kernel), grid.values());
        }
        let sweeps = grid.relax_with(SweepKernel::Shifted, &RelaxationSettings::grid()).unwrap();
        assert_eq!(sweeps, 0);
        assert_eq!(grid.values()[(0, 0)], 310.0);
    }

    #[test]
    fn rejects_negative_material() {
        let mut m = material(0.0, 300.0);
        m.id = -3;
        let err = Grid::new((0.0, 1.0), (0.0, 1.0), 0.5, m, true).unwrap_err();
        assert_eq!(err, ConfigError::NegativeMaterialId(-3));
    }

    #[test]
    fn rejects_step_not_dividing_extent() {
        let err = Grid::new((0.0, 1.0), (0.0, 0.7), 0.2, material(0.0, 300.0), true).unwrap_err();
        assert!(matches!(err, ConfigError::StepDoesNotDivide { axis: Axis::Y, .. }));
    }

    #[test]
    fn footprint_in_lattice_units() {
        let grid = Grid::new((3.0, 17.0), (0.0, 1.0), 0.2, material(0.5, 343.0), true).unwrap();
        let fp = grid.footprint().unwrap();
        assert_eq!(fp.x, (15, 84));
        assert_eq!(fp.y, (0, 4));
    }

    #[test]
    fn boundary_update_uses_both_interior_points() {
        let mut grid =
            Grid::new((0.0, 1.0), (0.0, 1.0), 0.25, material(0.0, 0.0), true).unwrap();
        // Interior columns at 373 K and 350 K next to the left ghost column.
        for i in 1..5 {
            grid.values_mut()[(i, 1)] = 373.0;
            grid.values_mut()[(i, 2)] = 350.0;
        }
        grid.update_boundary(&Convection::default()).unwrap();

        let h = 1.31e-6 * 80f64.cbrt();
        let expected = 2.0 * h * 0.25 * 80.0 / 0.15 + 350.0;
        for i in 1..5 {
            assert!((grid.values()[(i, 0)] - expected).abs() < 1e-12);
        }
        // Corners untouched.
        assert_eq!(grid.values()[(0, 0)], 0.0);
        assert_eq!(grid.values()[(5, 5)], 0.0);
    }

    #[test]
    fn boundary_update_needs_ghost_ring() {
        let mut grid =
            Grid::new((0.0, 1.0), (0.0, 1.0), 0.5, material(0.0, 300.0), false).unwrap();
        assert_eq!(
            grid.update_boundary(&Convection::default()),
            Err(ConfigError::MissingGhostBorder)
        );
    }

    #[test]
    fn relaxation_holds_ring_fixed() {
        let mut grid =
            Grid::new((0.0, 1.0), (0.0, 1.0), 0.25, material(0.0, 300.0), true).unwrap();
        grid.values_mut().fill(AMBIENT_TEMPERATURE);
        grid.fill_interior(350.0);
        let sweeps = grid.relax_with(SweepKernel::Pointwise, &RelaxationSettings::grid()).unwrap();
        assert!(sweeps > 1);
        assert_eq!(grid.values()[(0, 2)], AMBIENT_TEMPERATURE);
        for v in grid.interior_values().iter() {
            assert!((v - AMBIENT_TEMPERATURE).abs() < 1e-9, "{v}");
        }
    }

    #[test]
    fn stalled_relaxation_is_reported() {
        let mut grid =
            Grid::new((0.0, 2.0), (0.0, 2.0), 0.25, material(0.0, 300.0), true).unwrap();
        grid.fill_interior(400.0);
        let settings = RelaxationSettings {
            tolerance: 1e-14,
            max_sweeps: 3,
        };
        let before = grid.values().clone();
        let err = grid.relax_with(SweepKernel::Shifted, &settings).unwrap_err();
        assert!(matches!(err, SolverError::RelaxationStalled { sweeps: 3, .. }));
        assert_eq!(grid.values(), &before);
    }
}
