use std::collections::BTreeMap;

use nalgebra::DMatrix;

use super::generator::{Axis, Footprint, Frame, lattice_index};
use super::grid::Grid;
use crate::error::{ConfigError, ConfigResult};
use crate::numerics::jacobi::periodic_sweep;
use crate::numerics::solver::{IterativeSolver, SolverError, SolverResult};
use crate::numerics::{IterationSettings, RelaxationSettings, relative_change};
use crate::physics::bc::{Direction, convective_ghost_value};
use crate::physics::convection::{AMBIENT_TEMPERATURE, Convection, ConvectionMode};
use crate::physics::{AMBIENT, CellKind, GHOST, Material, MaterialId, ThermalModel};

/// One registered mesh: its material and where it sits on the lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub material: Material,
    pub footprint: Footprint,
}

/// Several single-material grids sharing one lattice frame.
///
/// Tags: `id >= 0` interior of that material, [`GHOST`] for interface and
/// boundary points, [`AMBIENT`] for unoccupied air.
#[derive(Clone, Debug)]
pub struct CompositeGrid {
    frame: Frame,
    values: DMatrix<f64>,
    tags: DMatrix<i32>,
    /// Append-only, one row per registered grid.
    regions: Vec<Region>,
    materials: BTreeMap<MaterialId, Material>,
    /// Material whose first region is watched for convergence.
    monitor: MaterialId,
}

impl CompositeGrid {
    pub fn new(a: &Grid, b: &Grid) -> ConfigResult<Self> {
        if a.step() != b.step() {
            return Err(ConfigError::StepMismatch {
                expected: a.step(),
                found: b.step(),
            });
        }
        let step = a.step();
        let (fa, fb) = (a.footprint()?, b.footprint()?);

        let mut materials = BTreeMap::new();
        insert_material(&mut materials, *a.material())?;
        insert_material(&mut materials, *b.material())?;

        let frame = Frame::new(step, fa.union(&fb));
        let (nr, nc) = frame.shape();
        let mut tags = DMatrix::from_element(nr, nc, AMBIENT);

        // Both rings first, then both interiors: a ring cell that lands inside
        // the other material becomes interior.
        mark_ring(&mut tags, &frame, &fa);
        mark_ring(&mut tags, &frame, &fb);
        fill_footprint(&mut tags, &frame, &fa, a.material().id);
        fill_footprint(&mut tags, &frame, &fb, b.material().id);

        let values = DMatrix::from_fn(nr, nc, |i, j| match CellKind::from_tag(tags[(i, j)]) {
            CellKind::Interior(id) => materials
                .get(&id)
                .map_or(AMBIENT_TEMPERATURE, |m: &Material| m.initial_guess),
            CellKind::Ghost | CellKind::Ambient => AMBIENT_TEMPERATURE,
        });

        log::debug!(
            "composite of materials {} and {}: {}x{} cells",
            a.material().id,
            b.material().id,
            nr,
            nc
        );

        Ok(Self {
            frame,
            values,
            tags,
            regions: vec![
                Region {
                    material: *a.material(),
                    footprint: fa,
                },
                Region {
                    material: *b.material(),
                    footprint: fb,
                },
            ],
            materials,
            monitor: 0,
        })
    }

    /// Grow the frame to include `other` and stamp it in.
    ///
    /// Existing tags and values are carried over untouched, except where
    /// `other`'s interior physically overlaps them.
    pub fn merge(&mut self, other: &Grid) -> ConfigResult<&mut Self> {
        if other.step() != self.frame.step {
            return Err(ConfigError::StepMismatch {
                expected: self.frame.step,
                found: other.step(),
            });
        }
        let footprint = other.footprint()?;
        let material = *other.material();
        let mut materials = self.materials.clone();
        insert_material(&mut materials, material)?;

        let frame = Frame::new(self.frame.step, self.frame.span.union(&footprint));
        let (nr, nc) = frame.shape();
        let offset = frame.offset_of(&self.frame);

        let mut tags = DMatrix::from_element(nr, nc, AMBIENT);
        let mut values = DMatrix::from_element(nr, nc, AMBIENT_TEMPERATURE);
        tags.view_mut(offset, self.tags.shape())
            .copy_from(&self.tags);
        values
            .view_mut(offset, self.values.shape())
            .copy_from(&self.values);
        let previous = tags.clone();

        mark_ring(&mut tags, &frame, &footprint);
        fill_footprint(&mut tags, &frame, &footprint, material.id);

        // The new ring may have landed on interior points of earlier regions
        // that border `other`; those stay interior.
        for region in &self.regions {
            restore_interior(&mut tags, &previous, &frame, &region.footprint);
        }

        let (r0, c0) = frame.to_matrix(footprint.x.0, footprint.y.0);
        values
            .view_mut((r0, c0), (footprint.height(), footprint.width()))
            .fill(material.initial_guess);

        log::debug!(
            "merged material {} at x {:?}, y {:?}: {}x{} cells",
            material.id,
            footprint.x,
            footprint.y,
            nr,
            nc
        );

        self.frame = frame;
        self.tags = tags;
        self.values = values;
        self.materials = materials;
        self.regions.push(Region {
            material,
            footprint,
        });
        Ok(self)
    }

    /// Watch `id`'s first region when deciding convergence.
    pub fn set_monitor(&mut self, id: MaterialId) -> ConfigResult<()> {
        if !self.materials.contains_key(&id) {
            return Err(ConfigError::UnknownMaterial(id));
        }
        self.monitor = id;
        Ok(())
    }

    pub fn monitor(&self) -> MaterialId {
        self.monitor
    }

    pub fn step(&self) -> f64 {
        self.frame.step
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// x coordinates of the frame, ring excluded.
    pub fn xpts(&self) -> Vec<f64> {
        self.frame.x_points()
    }

    /// y coordinates of the frame, ring excluded.
    pub fn ypts(&self) -> Vec<f64> {
        self.frame.y_points()
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn tags(&self) -> &DMatrix<i32> {
        &self.tags
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Matrix `(row, col)` of the lattice point at `(x, y)`, if it lies in the
    /// frame.
    pub fn index_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let ix = lattice_index(x, self.frame.step, Axis::X).ok()?;
        let iy = lattice_index(y, self.frame.step, Axis::Y).ok()?;
        self.frame
            .span
            .contains(ix, iy)
            .then(|| self.frame.to_matrix(ix, iy))
    }

    /// Per-cell `step² · (q/k) / 4`, taken from each cell's own material.
    pub fn source_field(&self) -> DMatrix<f64> {
        let step = self.frame.step;
        let (nr, nc) = self.tags.shape();
        DMatrix::from_fn(nr, nc, |i, j| match CellKind::from_tag(self.tags[(i, j)]) {
            CellKind::Interior(id) => self
                .materials
                .get(&id)
                .map_or(0.0, |m| m.source_increment(step)),
            _ => 0.0,
        })
    }

    /// One Jacobi sweep over the whole matrix, returned without touching
    /// `self`.
    pub fn sweep(&self) -> DMatrix<f64> {
        periodic_sweep(&self.values, &self.source_field())
    }

    /// Sweep until the relative L2-norm change of the whole matrix drops
    /// below the tolerance. Ghost and ambient points take part; the next
    /// boundary update resets them.
    pub fn relax_with(&mut self, settings: &RelaxationSettings) -> Result<usize, SolverError> {
        let increment = self.source_field();
        let mut current = self.values.clone();
        let mut change = f64::INFINITY;

        for sweep in 1..=settings.max_sweeps {
            let next = periodic_sweep(&current, &increment);
            change = relative_change(current.norm(), next.norm());
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

    /// Reset ambient points to the ambient temperature and recompute every
    /// ghost/interface point from the material points next to it.
    pub fn update_boundary(&mut self, convection: &Convection) {
        let (nr, nc) = self.values.shape();
        let mut next = self.values.clone();
        for i in 0..nr {
            for j in 0..nc {
                match CellKind::from_tag(self.tags[(i, j)]) {
                    CellKind::Ghost => next[(i, j)] = self.interface_value((i, j), convection),
                    CellKind::Ambient => next[(i, j)] = convection.ambient,
                    CellKind::Interior(_) => {}
                }
            }
        }
        self.values = next;
    }

    /// Average of the convective ghost values seen from each neighbouring
    /// material point. A point with no material neighbour (an outer corner)
    /// cannot influence the interior and gets the ambient temperature.
    fn interface_value(&self, cell: (usize, usize), convection: &Convection) -> f64 {
        let shape = self.values.shape();
        let step = self.frame.step;

        let candidates: Vec<f64> = Direction::ALL
            .iter()
            .filter_map(|dir| {
                let neighbour = dir.walk(cell, 1, shape)?;
                let CellKind::Interior(id) = CellKind::from_tag(self.tags[neighbour]) else {
                    return None;
                };
                let second = dir.walk(cell, 2, shape)?;
                let material = self.materials.get(&id)?;
                let t_neighbour = self.values[neighbour];
                Some(convective_ghost_value(
                    t_neighbour,
                    self.values[second],
                    convection.coefficient(t_neighbour),
                    step,
                    material.conductivity,
                    convection.ambient,
                ))
            })
            .collect();

        if candidates.is_empty() {
            convection.ambient
        } else {
            candidates.iter().sum::<f64>() / candidates.len() as f64
        }
    }

    /// Mean temperature over the monitored material's first footprint.
    pub fn monitored_average(&self) -> ConfigResult<f64> {
        let region = self
            .regions
            .iter()
            .find(|r| r.material.id == self.monitor)
            .ok_or(ConfigError::UnknownMaterial(self.monitor))?;
        let fp = region.footprint;
        let origin = self.frame.to_matrix(fp.x.0, fp.y.0);
        Ok(self
            .values
            .view(origin, (fp.height(), fp.width()))
            .mean())
    }

    /// Solve with the default composite settings.
    pub fn iterate(&mut self, mode: ConvectionMode) -> Result<SolverResult, SolverError> {
        self.iterate_with(IterationSettings::composite(), Convection::new(mode))
    }

    pub fn iterate_with(
        &mut self,
        settings: IterationSettings,
        convection: Convection,
    ) -> Result<SolverResult, SolverError> {
        IterativeSolver::new(settings, convection).solve(self)
    }
}

impl ThermalModel for CompositeGrid {
    type Snapshot = f64;

    fn initialize(&mut self) -> Result<(), SolverError> {
        // Fails early if the monitored material is missing.
        self.monitored_average()?;
        Ok(())
    }

    fn update_boundary(&mut self, convection: &Convection) -> Result<(), SolverError> {
        CompositeGrid::update_boundary(self, convection);
        Ok(())
    }

    fn relax(&mut self, settings: &RelaxationSettings) -> Result<usize, SolverError> {
        self.relax_with(settings)
    }

    fn snapshot(&self) -> Result<f64, SolverError> {
        Ok(self.monitored_average()?)
    }

    fn change(&self, previous: &f64, current: &f64) -> f64 {
        relative_change(*previous, *current)
    }

    fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

fn insert_material(
    materials: &mut BTreeMap<MaterialId, Material>,
    material: Material,
) -> ConfigResult<()> {
    match materials.get(&material.id) {
        Some(existing) if *existing != material => {
            Err(ConfigError::ConflictingMaterial(material.id))
        }
        Some(_) => Ok(()),
        None => {
            materials.insert(material.id, material);
            Ok(())
        }
    }
}

/// Tag the one-cell ring around a footprint as ghost.
fn mark_ring(tags: &mut DMatrix<i32>, frame: &Frame, fp: &Footprint) {
    let (r0, c0) = frame.to_matrix(fp.x.0 - 1, fp.y.0 - 1);
    let (r1, c1) = frame.to_matrix(fp.x.1 + 1, fp.y.1 + 1);
    for r in r0..=r1 {
        tags[(r, c0)] = GHOST;
        tags[(r, c1)] = GHOST;
    }
    for c in c0..=c1 {
        tags[(r0, c)] = GHOST;
        tags[(r1, c)] = GHOST;
    }
}

fn fill_footprint(tags: &mut DMatrix<i32>, frame: &Frame, fp: &Footprint, id: MaterialId) {
    let origin = frame.to_matrix(fp.x.0, fp.y.0);
    tags.view_mut(origin, (fp.height(), fp.width())).fill(id);
}

/// Undo ghost tags written over material points of an earlier footprint.
fn restore_interior(
    tags: &mut DMatrix<i32>,
    previous: &DMatrix<i32>,
    frame: &Frame,
    fp: &Footprint,
) {
    let (r0, c0) = frame.to_matrix(fp.x.0, fp.y.0);
    for r in r0..r0 + fp.height() {
        for c in c0..c0 + fp.width() {
            if tags[(r, c)] == GHOST && previous[(r, c)] >= 0 {
                tags[(r, c)] = previous[(r, c)];
            }
        }
    }
}
