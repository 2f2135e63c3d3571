use super::materials;
use crate::discretization::composite::CompositeGrid;
use crate::discretization::grid::Grid;
use crate::error::ConfigResult;
use crate::physics::Material;

/// Width and height of a rectangular block [mm].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slab {
    pub width: f64,
    pub height: f64,
}

/// A base plate carrying `fin_count` evenly spaced vertical fins. The base
/// starts at x = 0 and spans every fin, with no overhang past the last one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinnedSink {
    pub material: Material,
    pub base_height: f64,
    pub fin_count: usize,
    pub fin_height: f64,
    /// Air gap between neighbouring fins.
    pub fin_gap: f64,
    pub fin_thickness: f64,
}

impl FinnedSink {
    pub fn base_width(&self) -> f64 {
        let pitch = self.fin_gap + self.fin_thickness;
        pitch * self.fin_count.saturating_sub(1) as f64 + self.fin_thickness
    }

    /// Left edge of fin `i`.
    pub fn fin_x(&self, i: usize) -> f64 {
        (self.fin_gap + self.fin_thickness) * i as f64
    }
}

/// Die, ceramic cap and optional finned sink, stacked bottom to top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatSinkLayout {
    pub step: f64,
    pub die: Material,
    pub die_size: Slab,
    /// Die offset from the cap's left edge.
    pub die_x: f64,
    pub cap: Material,
    pub cap_size: Slab,
    pub sink: Option<FinnedSink>,
}

impl Default for HeatSinkLayout {
    /// 14 x 1 mm die under a 20 x 2 mm cap, on a 4 mm base with seven
    /// 30 mm fins 5 mm apart, sampled every 0.2 mm.
    fn default() -> Self {
        Self {
            step: 0.2,
            die: materials::microprocessor(),
            die_size: Slab {
                width: 14.0,
                height: 1.0,
            },
            die_x: 3.0,
            cap: materials::ceramic(),
            cap_size: Slab {
                width: 20.0,
                height: 2.0,
            },
            sink: Some(FinnedSink {
                material: materials::sink(),
                base_height: 4.0,
                fin_count: 7,
                fin_height: 30.0,
                fin_gap: 5.0,
                fin_thickness: 1.0,
            }),
        }
    }
}

impl HeatSinkLayout {
    /// The die and cap alone.
    pub fn bare_package() -> Self {
        Self {
            sink: None,
            ..Self::default()
        }
    }

    pub fn with_sink(mut self, sink: Option<FinnedSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Horizontal shift centring the cap on the sink base, rounded to the
    /// nearest lattice point so every block stays on the shared lattice.
    pub fn centring_shift(&self) -> f64 {
        match &self.sink {
            Some(sink) => {
                let raw = (sink.base_width() - self.cap_size.width) / 2.0;
                (raw / self.step).round() * self.step
            }
            None => 0.0,
        }
    }

    /// Grids in merge order: die, cap, then the sink base and its fins.
    pub fn grids(&self) -> ConfigResult<Vec<Grid>> {
        let shift = self.centring_shift();
        let die_x = self.die_x + shift;
        let cap_y = self.die_size.height;

        let mut grids = vec![
            Grid::new(
                (die_x, die_x + self.die_size.width),
                (0.0, self.die_size.height),
                self.step,
                self.die,
                true,
            )?,
            Grid::new(
                (shift, shift + self.cap_size.width),
                (cap_y, cap_y + self.cap_size.height),
                self.step,
                self.cap,
                true,
            )?,
        ];

        if let Some(sink) = &self.sink {
            let base_y = cap_y + self.cap_size.height;
            let fin_y = base_y + sink.base_height;
            grids.push(Grid::new(
                (0.0, sink.base_width()),
                (base_y, fin_y),
                self.step,
                sink.material,
                true,
            )?);
            for i in 0..sink.fin_count {
                let x = sink.fin_x(i);
                grids.push(Grid::new(
                    (x, x + sink.fin_thickness),
                    (fin_y, fin_y + sink.fin_height),
                    self.step,
                    sink.material,
                    true,
                )?);
            }
        }
        Ok(grids)
    }

    /// Assemble the composite. The die is the monitored material.
    pub fn build(&self) -> ConfigResult<CompositeGrid> {
        let grids = self.grids()?;
        let mut composite = CompositeGrid::new(&grids[0], &grids[1])?;
        for grid in &grids[2..] {
            composite.merge(grid)?;
        }
        composite.set_monitor(self.die.id)?;
        log::info!(
            "assembled {} regions on a {}x{} frame",
            composite.regions().len(),
            composite.tags().nrows(),
            composite.tags().ncols()
        );
        Ok(composite)
    }
}
