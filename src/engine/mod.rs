//! Regridding engine: source mesh and target grid descriptors plus the
//! sparse operator built from them
//!
//! This module is organized into:
//! - `mesh_info`: unstructured source mesh descriptor
//! - `grid_info`: rectilinear target grid descriptor
//! - `weights`: parallel area-overlap weight generation
//! - `regridder`: the reusable operator and its application to masked data

pub mod grid_info;
pub mod mesh_info;
pub mod regridder;
pub mod weights;

pub use grid_info::GridInfo;
pub use mesh_info::MeshInfo;
pub use regridder::Regridder;

use crate::errors::{RegridError, Result};

/// Smallest tolerance actually applied, absorbing rounding in weight sums
pub const MDTOL_FLOOR: f64 = 1e-8;

/// Checks that a missing-data tolerance lies in `[0, 1]`.
///
/// # Errors
///
/// Returns [`RegridError::InvalidMdtol`] otherwise, including for NaN.
pub fn validate_mdtol(mdtol: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&mdtol) {
        Ok(mdtol)
    } else {
        Err(RegridError::InvalidMdtol(mdtol))
    }
}
