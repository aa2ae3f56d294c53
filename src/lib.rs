//! mesh_regrid: regridding from unstructured meshes to rectilinear grids
//!
//! A Rust library for moving data defined on the faces of an unstructured 2D
//! mesh (UGRID conventions) onto a regular latitude/longitude grid with
//! first-order conservative weights.
//!
//! ## Key Features
//!
//! - **Prepare/perform split**: build the sparse operator once, apply it to
//!   many cubes with different missing-data tolerances
//! - **Labeled cubes**: metadata and non-mesh coordinates carry over to the
//!   regridded result
//! - **Masked data**: `mdtol` controls how much missing source data a target
//!   cell tolerates before it is masked
//! - **Parallel weights**: face/cell overlaps are computed with Rayon
//! - **NetCDF support**: read UGRID mesh data and CF grids, write results
//!
//! ## Module Organization
//!
//! - [`scheme`]: cube-level regridding (`prepare`, `perform`, `MeshToGridRegridder`)
//! - [`engine`]: `MeshInfo`, `GridInfo` and the sparse `Regridder`
//! - [`cube`], [`coords`], [`mesh`], [`masked`]: the labeled data model
//! - [`bounds`]: CF bounds conversion
//! - [`netcdf_io`]: NetCDF reading and writing
//! - [`metadata`]: cube and mesh summaries
//! - [`parallel`]: thread pool configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mesh_regrid::prelude::*;
//! use netcdf::open;
//!
//! let source = open("mesh_data.nc").unwrap();
//! let target = open("grid.nc").unwrap();
//!
//! let src_cube = read_mesh_cube(&source, "temperature").unwrap();
//! let grid_cube = read_grid_cube(&target, None, None).unwrap();
//!
//! // Mask any target cell that is less than half covered by valid data
//! let regridder = MeshToGridRegridder::new(&src_cube, &grid_cube, 0.5).unwrap();
//! let result = regridder.regrid(&src_cube).unwrap();
//!
//! NetCDFWriter::new(std::path::Path::new("regridded.nc"))
//!     .write_cube(&result)
//!     .unwrap();
//! ```

// Core modules
pub mod bounds;
pub mod coords;
pub mod cube;
pub mod engine;
pub mod errors;
pub mod masked;
pub mod mesh;
pub mod metadata;
pub mod netcdf_io;
pub mod parallel;
pub mod scheme;

// Direct re-exports for the public API
pub use bounds::bounds_cf_to_simple_1d;
pub use coords::{AttrValue, AuxCoord, CoordMetadata, CoordRef, DimCoord};
pub use cube::{Cube, CubeMetadata};
pub use engine::{GridInfo, MeshInfo, Regridder};
pub use errors::*;
pub use masked::MaskedArray;
pub use mesh::{Connectivity, Mesh, MeshLocation};
pub use scheme::{
    perform, prepare, regrid_unstructured_to_rectilinear, MeshToGridRegridder, RegridInfo,
};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::coords::{AuxCoord, CoordMetadata, DimCoord};
    pub use crate::cube::{Cube, CubeMetadata};
    pub use crate::errors::{RegridError, Result};
    pub use crate::masked::MaskedArray;
    pub use crate::mesh::{Connectivity, Mesh, MeshLocation};
    pub use crate::netcdf_io::{read_grid_cube, read_mesh_cube, NetCDFWriter};
    pub use crate::parallel::ParallelConfig;
    pub use crate::scheme::{regrid_unstructured_to_rectilinear, MeshToGridRegridder};
}
