//! Jacobi sweeps of the 5-point Laplacian with a source term.
//!
//! Every kernel reads the previous field and writes a fresh one, so the
//! order in which cells are visited never matters.

use nalgebra::{DMatrix, DMatrixView};

/// Interior `(rows-2) x (cols-2)` block, i.e. everything but the outer ring.
/// Empty when the matrix has no ring to strip.
pub fn interior(values: &DMatrix<f64>) -> DMatrixView<'_, f64> {
    if !has_interior(values) {
        return values.view((0, 0), (0, 0));
    }
    let (nr, nc) = values.shape();
    values.view((1, 1), (nr - 2, nc - 2))
}

/// At least one cell lies inside the outer ring.
pub fn has_interior(values: &DMatrix<f64>) -> bool {
    let (nr, nc) = values.shape();
    nr >= 3 && nc >= 3
}

/// Cell-by-cell sweep over the interior; the outer ring is copied unchanged.
pub fn interior_sweep_pointwise(values: &DMatrix<f64>, increment: f64) -> DMatrix<f64> {
    let (nr, nc) = values.shape();
    let mut next = values.clone();
    if !has_interior(values) {
        return next;
    }
    for i in 1..nr - 1 {
        for j in 1..nc - 1 {
            next[(i, j)] = 0.25
                * (values[(i - 1, j)] + values[(i + 1, j)] + values[(i, j - 1)] + values[(i, j + 1)])
                + increment;
        }
    }
    next
}

/// Same update as [`interior_sweep_pointwise`], written as the sum of four
/// shifted copies of the field.
pub fn interior_sweep_shifted(values: &DMatrix<f64>, increment: f64) -> DMatrix<f64> {
    if !has_interior(values) {
        return values.clone();
    }
    let (nr, nc) = values.shape();
    let block = (nr - 2, nc - 2);

    let mut acc = values.view((0, 1), block).clone_owned();
    acc += values.view((2, 1), block);
    acc += values.view((1, 0), block);
    acc += values.view((1, 2), block);
    acc *= 0.25;
    acc.add_scalar_mut(increment);

    let mut next = values.clone();
    next.view_mut((1, 1), block).copy_from(&acc);
    next
}

/// Sweep over the whole matrix with wrap-around neighbours at the edges, then
/// add the per-cell source increment.
pub fn periodic_sweep(values: &DMatrix<f64>, increment: &DMatrix<f64>) -> DMatrix<f64> {
    let (nr, nc) = values.shape();
    DMatrix::from_fn(nr, nc, |i, j| {
        let up = values[((i + 1) % nr, j)];
        let down = values[((i + nr - 1) % nr, j)];
        let right = values[(i, (j + 1) % nc)];
        let left = values[(i, (j + nc - 1) % nc)];
        0.25 * (up + down + left + right) + increment[(i, j)]
    })
}
