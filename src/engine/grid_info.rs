//! Engine-side description of a rectilinear target grid

use crate::errors::{RegridError, Result};
use ndarray::Array1;

/// Slack allowed when comparing a circular grid's span with 360 degrees
const SPAN_TOLERANCE: f64 = 1e-6;

/// Cell centres and edges of a longitude/latitude grid
#[derive(Debug, Clone)]
pub struct GridInfo {
    lon: Array1<f64>,
    lat: Array1<f64>,
    lon_bounds: Array1<f64>,
    lat_bounds: Array1<f64>,
    circular: bool,
}

impl GridInfo {
    /// Builds a grid descriptor from points and `N + 1` edges per axis.
    ///
    /// `circular` marks a longitude axis that wraps around the globe.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::InvalidGrid`] when an axis is empty, edge counts
    /// do not match the points, edges are not strictly monotonic, latitude
    /// edges leave `[-90, 90]`, or a circular longitude axis spans more than
    /// 360 degrees.
    pub fn new(
        lon: Array1<f64>,
        lat: Array1<f64>,
        lon_bounds: Array1<f64>,
        lat_bounds: Array1<f64>,
        circular: bool,
    ) -> Result<Self> {
        check_axis("longitude", &lon, &lon_bounds)?;
        check_axis("latitude", &lat, &lat_bounds)?;
        if lat_bounds.iter().any(|&b| !(-90.0..=90.0).contains(&b)) {
            return Err(RegridError::InvalidGrid {
                message: "latitude bounds must lie within [-90, 90]".to_string(),
            });
        }

        let span = (lon_bounds[lon_bounds.len() - 1] - lon_bounds[0]).abs();
        if circular && span > 360.0 + SPAN_TOLERANCE {
            return Err(RegridError::InvalidGrid {
                message: format!(
                    "circular grid longitude bounds span {} degrees, more than a full turn",
                    span
                ),
            });
        }
        if circular && span < 360.0 - SPAN_TOLERANCE {
            tracing::warn!(span, "circular grid whose longitude bounds do not span 360 degrees");
        }

        Ok(Self {
            lon,
            lat,
            lon_bounds,
            lat_bounds,
            circular,
        })
    }

    /// `(n_lat, n_lon)`, the layout of regridded data
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    /// Total number of grid cells
    #[must_use]
    pub fn size(&self) -> usize {
        self.lat.len() * self.lon.len()
    }

    #[must_use]
    pub fn circular(&self) -> bool {
        self.circular
    }

    #[must_use]
    pub fn lon(&self) -> &Array1<f64> {
        &self.lon
    }

    #[must_use]
    pub fn lat(&self) -> &Array1<f64> {
        &self.lat
    }

    #[must_use]
    pub fn lon_bounds(&self) -> &Array1<f64> {
        &self.lon_bounds
    }

    #[must_use]
    pub fn lat_bounds(&self) -> &Array1<f64> {
        &self.lat_bounds
    }

    /// Flat index of the cell at latitude row `j`, longitude column `i`
    #[must_use]
    pub fn cell_index(&self, j: usize, i: usize) -> usize {
        j * self.lon.len() + i
    }
}

fn check_axis(name: &str, points: &Array1<f64>, edges: &Array1<f64>) -> Result<()> {
    if points.is_empty() {
        return Err(RegridError::InvalidGrid {
            message: format!("{} axis has no points", name),
        });
    }
    if edges.len() != points.len() + 1 {
        return Err(RegridError::InvalidGrid {
            message: format!(
                "{} has {} points but {} edges, expected {}",
                name,
                points.len(),
                edges.len(),
                points.len() + 1
            ),
        });
    }
    let edges = edges.to_vec();
    let increasing = edges.windows(2).all(|w| w[1] > w[0]);
    let decreasing = edges.windows(2).all(|w| w[1] < w[0]);
    if !(increasing || decreasing) {
        return Err(RegridError::InvalidGrid {
            message: format!("{} edges are not strictly monotonic", name),
        });
    }
    Ok(())
}
