use std::fmt;

use crate::error::{ConfigError, ConfigResult};

/// Slack, in step units, allowed when snapping a coordinate onto the lattice.
const LATTICE_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Number of points produced by stepping over `[start, stop)`.
///
/// The step has to divide the span exactly (up to rounding drift), otherwise
/// the last cell would silently be cut short.
pub fn point_count(start: f64, stop: f64, step: f64, axis: Axis) -> ConfigResult<usize> {
    if !(step > 0.0) {
        return Err(ConfigError::NonPositiveStep(step));
    }
    if !(stop > start) {
        return Err(ConfigError::EmptyExtent { axis, start, stop });
    }
    let span = stop - start;
    let ratio = span / step;
    let count = ratio.round();
    if (ratio - count).abs() > LATTICE_TOLERANCE * count.max(1.0) {
        return Err(ConfigError::StepDoesNotDivide { axis, span, step });
    }
    Ok(count as usize)
}

/// Coordinates `start, start + step, ...` over the half-open interval
/// `[start, stop)`. `stop` itself is never produced.
pub fn half_open_points(start: f64, stop: f64, step: f64, axis: Axis) -> ConfigResult<Vec<f64>> {
    let n = point_count(start, stop, step, axis)?;
    Ok((0..n).map(|i| start + i as f64 * step).collect())
}

/// Snap a coordinate onto the integer lattice of the given step.
pub fn lattice_index(coord: f64, step: f64, axis: Axis) -> ConfigResult<i64> {
    let ratio = coord / step;
    let index = ratio.round();
    if (ratio - index).abs() > LATTICE_TOLERANCE * index.abs().max(1.0) {
        return Err(ConfigError::OffLattice {
            axis,
            start: coord,
            step,
        });
    }
    Ok(index as i64)
}

/// Inclusive lattice index range `[first, last]` covered by a region's
/// interior points along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    pub x: (i64, i64),
    pub y: (i64, i64),
}

impl Footprint {
    pub fn width(&self) -> usize {
        (self.x.1 - self.x.0 + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.y.1 - self.y.0 + 1) as usize
    }

    pub fn contains(&self, ix: i64, iy: i64) -> bool {
        (self.x.0..=self.x.1).contains(&ix) && (self.y.0..=self.y.1).contains(&iy)
    }

    /// Smallest footprint covering both.
    pub fn union(&self, other: &Footprint) -> Footprint {
        Footprint {
            x: (self.x.0.min(other.x.0), self.x.1.max(other.x.1)),
            y: (self.y.0.min(other.y.0), self.y.1.max(other.y.1)),
        }
    }
}

/// A rectangular window of the step lattice, padded with a one-cell ring.
///
/// Matrix shape is `(ny + 2, nx + 2)`: row 0 / column 0 hold the ring in front
/// of the first lattice point, so lattice point `(ix, iy)` lives at
/// `(iy - y0 + 1, ix - x0 + 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub step: f64,
    pub span: Footprint,
}

impl Frame {
    pub fn new(step: f64, span: Footprint) -> Self {
        Self { step, span }
    }

    pub fn nx(&self) -> usize {
        self.span.width()
    }

    pub fn ny(&self) -> usize {
        self.span.height()
    }

    /// `(rows, cols)` of the padded value/tag matrices.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny() + 2, self.nx() + 2)
    }

    /// Matrix `(row, col)` of a lattice point. Ring cells one step outside the
    /// span are addressable too.
    pub fn to_matrix(&self, ix: i64, iy: i64) -> (usize, usize) {
        (
            (iy - self.span.y.0 + 1) as usize,
            (ix - self.span.x.0 + 1) as usize,
        )
    }

    /// Offset, in matrix cells, of `inner`'s origin inside this frame.
    pub fn offset_of(&self, inner: &Frame) -> (usize, usize) {
        (
            (inner.span.y.0 - self.span.y.0) as usize,
            (inner.span.x.0 - self.span.x.0) as usize,
        )
    }

    pub fn x_points(&self) -> Vec<f64> {
        (self.span.x.0..=self.span.x.1)
            .map(|i| i as f64 * self.step)
            .collect()
    }

    pub fn y_points(&self) -> Vec<f64> {
        (self.span.y.0..=self.span.y.1)
            .map(|i| i as f64 * self.step)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_stepping_excludes_stop() {
        let pts = half_open_points(0.0, 1.0, 0.25, Axis::X).unwrap();
        assert_eq!(pts, vec![0.0, 0.25, 0.5, 0.75]);

        let pts = half_open_points(3.0, 17.0, 0.2, Axis::X).unwrap();
        assert_eq!(pts.len(), 70);
        assert!(pts.iter().all(|&x| x < 17.0));
    }

    #[test]
    fn rejects_step_that_does_not_divide() {
        let err = point_count(0.0, 1.0, 0.3, Axis::Y).unwrap_err();
        assert!(matches!(err, ConfigError::StepDoesNotDivide { axis: Axis::Y, .. }));
    }

    #[test]
    fn rejects_degenerate_extents() {
        assert!(matches!(
            point_count(1.0, 1.0, 0.5, Axis::X),
            Err(ConfigError::EmptyExtent { .. })
        ));
        assert!(matches!(
            point_count(0.0, 1.0, 0.0, Axis::X),
            Err(ConfigError::NonPositiveStep(_))
        ));
    }

    #[test]
    fn lattice_snapping_absorbs_drift() {
        assert_eq!(lattice_index(8.6, 0.2, Axis::X).unwrap(), 43);
        assert_eq!(lattice_index(0.1 + 0.2, 0.1, Axis::X).unwrap(), 3);
        assert!(lattice_index(0.3, 0.2, Axis::X).is_err());
    }

    #[test]
    fn frame_maps_lattice_to_padded_matrix() {
        let frame = Frame::new(
            0.5,
            Footprint {
                x: (2, 5),
                y: (-1, 0),
            },
        );
        assert_eq!(frame.shape(), (4, 6));
        assert_eq!(frame.to_matrix(2, -1), (1, 1));
        assert_eq!(frame.to_matrix(6, 1), (3, 5));
        assert_eq!(frame.x_points(), vec![1.0, 1.5, 2.0, 2.5]);
    }
}
