use crate::discretization::composite::CompositeGrid;
use crate::numerics::solver::SolverResult;
use crate::physics::convection::ConvectionMode;
use crate::physics::{CellKind, MaterialId};
use std::collections::BTreeMap;

/// Temperature statistics of one material over all of its regions.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialStats {
    pub id: MaterialId,
    pub cells: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

pub struct SimulationSummary {
    pub label: String,
    pub mode: ConvectionMode,

    // Frame info
    pub step: f64,
    pub shape: (usize, usize),
    pub extent_x: (f64, f64),
    pub extent_y: (f64, f64),
    pub num_regions: usize,
    pub ghost_cells: usize,
    pub ambient_cells: usize,

    // Results
    pub materials: Vec<MaterialStats>,
    pub monitored_average: Option<f64>,

    // Solver info
    pub iterations: Option<usize>,
    pub sweeps: Option<usize>,
    pub final_change: Option<f64>,
}

impl SimulationSummary {
    pub fn from_composite(label: &str, mode: ConvectionMode, composite: &CompositeGrid) -> Self {
        let xpts = composite.xpts();
        let ypts = composite.ypts();
        let extent = |pts: &[f64]| {
            (
                pts.first().copied().unwrap_or(0.0),
                pts.last().copied().unwrap_or(0.0),
            )
        };

        let mut ghost_cells = 0;
        let mut ambient_cells = 0;
        let mut per_material: BTreeMap<MaterialId, MaterialStats> = BTreeMap::new();
        for (&tag, &t) in composite.tags().iter().zip(composite.values().iter()) {
            match CellKind::from_tag(tag) {
                CellKind::Ghost => ghost_cells += 1,
                CellKind::Ambient => ambient_cells += 1,
                CellKind::Interior(id) => {
                    let stats = per_material.entry(id).or_insert(MaterialStats {
                        id,
                        cells: 0,
                        mean: 0.0,
                        min: f64::INFINITY,
                        max: f64::NEG_INFINITY,
                    });
                    stats.cells += 1;
                    stats.mean += t;
                    stats.min = stats.min.min(t);
                    stats.max = stats.max.max(t);
                }
            }
        }
        let materials = per_material
            .into_values()
            .map(|mut s| {
                s.mean /= s.cells as f64;
                s
            })
            .collect();

        Self {
            label: label.to_string(),
            mode,
            step: composite.step(),
            shape: composite.tags().shape(),
            extent_x: extent(xpts.as_slice()),
            extent_y: extent(ypts.as_slice()),
            num_regions: composite.regions().len(),
            ghost_cells,
            ambient_cells,
            materials,
            monitored_average: composite.monitored_average().ok(),
            iterations: None,
            sweeps: None,
            final_change: None,
        }
    }

    pub fn add_solver_info(&mut self, result: &SolverResult) {
        self.iterations = Some(result.iterations);
        self.sweeps = Some(result.sweeps);
        self.final_change = Some(result.final_change);
    }

    /// Hottest material by peak temperature.
    pub fn hottest(&self) -> Option<&MaterialStats> {
        self.materials
            .iter()
            .max_by(|a, b| a.max.total_cmp(&b.max))
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("{} ({:?} convection)", self.label.to_uppercase(), self.mode);
        println!("{}", "=".repeat(60));
        println!(
            "Frame:         {}x{} cells, step {} mm, {} regions",
            self.shape.0, self.shape.1, self.step, self.num_regions
        );
        println!(
            "Extent:        x {:.1}..{:.1} mm, y {:.1}..{:.1} mm",
            self.extent_x.0, self.extent_x.1, self.extent_y.0, self.extent_y.1
        );
        println!(
            "Cells:         {} interface, {} ambient",
            self.ghost_cells, self.ambient_cells
        );
        if let (Some(iter), Some(sweeps)) = (self.iterations, self.sweeps) {
            println!("Iterations:    {} ({} sweeps)", iter, sweeps);
        }
        if let Some(change) = self.final_change {
            println!("Final change:  {:.3e}", change);
        }
        if let Some(avg) = self.monitored_average {
            println!(
                "Monitored:     {:.2} K ({:.2} °C)",
                avg,
                avg - 273.0
            );
        }
        println!("{}", "-".repeat(60));
        for s in &self.materials {
            println!(
                "  material {}: {:>6} cells  mean {:>8.2} K  min {:>8.2} K  max {:>8.2} K",
                s.id, s.cells, s.mean, s.min, s.max
            );
        }
        if let Some(s) = self.hottest() {
            println!("Peak:          {:.2} K in material {}", s.max, s.id);
        }
        println!("{}\n", "=".repeat(60));
    }
}
