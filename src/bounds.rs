//! Conversion between CF-style paired bounds and simple cell edges
//!
//! CF conventions store cell bounds as an `(N, 2)` array of `[lower, upper]`
//! pairs. The regridding engine wants the `N + 1` cell edges instead, which
//! only exist when neighbouring cells share their common edge exactly.

use crate::errors::{RegridError, Result};
use ndarray::{Array1, Array2, ArrayView2};

/// Converts `(N, 2)` contiguous bounds into `N + 1` edges.
///
/// Contiguity is checked with exact equality: `bounds[i + 1, 0]` must equal
/// `bounds[i, 1]` for every `i`.
///
/// # Errors
///
/// Returns [`RegridError::InvalidBounds`] for an empty or non `N x 2` array,
/// and [`RegridError::NonContiguousBounds`] at the first gap or overlap.
pub fn bounds_cf_to_simple_1d(cf_bounds: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
    let (n, width) = cf_bounds.dim();
    if width != 2 {
        return Err(RegridError::InvalidBounds {
            message: format!("expected shape (N, 2), got ({}, {})", n, width),
        });
    }
    if n == 0 {
        return Err(RegridError::InvalidBounds {
            message: "bounds array is empty".to_string(),
        });
    }

    for i in 0..n - 1 {
        let upper = cf_bounds[[i, 1]];
        let next_lower = cf_bounds[[i + 1, 0]];
        if upper != next_lower {
            return Err(RegridError::NonContiguousBounds {
                index: i,
                upper,
                next_lower,
            });
        }
    }

    let mut simple = Array1::zeros(n + 1);
    simple
        .slice_mut(ndarray::s![..n])
        .assign(&cf_bounds.column(0));
    simple[n] = cf_bounds[[n - 1, 1]];
    Ok(simple)
}

/// Builds `(N, 2)` bounds from `N + 1` edges. Inverse of [`bounds_cf_to_simple_1d`].
#[must_use]
pub fn simple_1d_to_bounds_cf(edges: &[f64]) -> Array2<f64> {
    let n = edges.len().saturating_sub(1);
    Array2::from_shape_fn((n, 2), |(i, j)| edges[i + j])
}

/// Guesses contiguous bounds for monotonic points by placing edges halfway
/// between neighbours and extrapolating half a step at each end.
///
/// A single point gets no bounds since there is no spacing to infer from.
#[must_use]
pub fn guess_bounds(points: &[f64]) -> Option<Array2<f64>> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len();
    let mut edges = Vec::with_capacity(n + 1);
    edges.push(points[0] - (points[1] - points[0]) / 2.0);
    for pair in points.windows(2) {
        edges.push((pair[0] + pair[1]) / 2.0);
    }
    edges.push(points[n - 1] + (points[n - 1] - points[n - 2]) / 2.0);

    Some(simple_1d_to_bounds_cf(&edges))
}

/// [`guess_bounds`] for latitudes: when every point lies in `[-90, 90]` the
/// guessed bounds are clipped to that range, so a grid with points on the
/// poles gets half-width polar cells.
#[must_use]
pub fn guess_latitude_bounds(points: &[f64]) -> Option<Array2<f64>> {
    let mut bounds = guess_bounds(points)?;
    if points.iter().all(|p| (-90.0..=90.0).contains(p)) {
        bounds.mapv_inplace(|b| b.clamp(-90.0, 90.0));
    }
    Some(bounds)
}
