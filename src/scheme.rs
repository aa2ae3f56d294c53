//! Unstructured-to-rectilinear regridding for cubes
//!
//! Work is split in two: [`prepare`] builds the engine operator from a
//! source mesh cube and a target grid cube, and [`perform`] applies it to
//! realized data and rebuilds a labeled result cube. [`MeshToGridRegridder`]
//! keeps a prepared operator around so it can be applied to many cubes that
//! share the same mesh.

use crate::bounds::bounds_cf_to_simple_1d;
use crate::coords::{guess_axis, CoordAxis, DimCoord};
use crate::cube::Cube;
use crate::engine::{validate_mdtol, GridInfo, MeshInfo, Regridder};
use crate::errors::{RegridError, Result};
use crate::masked::MaskedArray;
use crate::mesh::{Mesh, MeshLocation};
use std::sync::Arc;

/// Everything [`perform`] needs, as produced by [`prepare`]
#[derive(Debug, Clone)]
pub struct RegridInfo {
    /// Cube dimension the source mesh is bound to
    pub mesh_dim: usize,
    pub grid_x: DimCoord,
    pub grid_y: DimCoord,
    pub regridder: Arc<Regridder>,
}

/// Describes a mesh for the engine.
///
/// # Errors
///
/// Returns [`RegridError::UnsupportedTopology`] unless the mesh is 2D, and
/// whatever [`MeshInfo::with_mask`] rejects about the connectivity.
pub fn mesh_to_mesh_info(mesh: &Mesh) -> Result<MeshInfo> {
    if mesh.topology_dimension != 2 {
        return Err(RegridError::UnsupportedTopology {
            dimension: mesh.topology_dimension,
        });
    }
    let connectivity = &mesh.face_node_connectivity;
    MeshInfo::with_mask(
        mesh.node_points(),
        connectivity.indices.view(),
        connectivity.start_index,
        connectivity.mask_view(),
    )
}

/// Describes the horizontal grid of a cube for the engine.
///
/// Uses the `longitude` and `latitude` coordinates, which must be dimension
/// coordinates with contiguous bounds. Units and coordinate systems are
/// taken as they are.
///
/// # Errors
///
/// Returns [`RegridError::CoordinateNotFound`], [`RegridError::NotDimCoord`],
/// [`RegridError::MissingBounds`] or a bounds conversion error.
pub fn cube_to_grid_info(cube: &Cube) -> Result<GridInfo> {
    let lon = cube.coord("longitude")?.as_dim()?;
    let lat = cube.coord("latitude")?.as_dim()?;

    let lon_bounds = lon.bounds().ok_or_else(|| RegridError::MissingBounds {
        name: lon.name().to_string(),
    })?;
    let lat_bounds = lat.bounds().ok_or_else(|| RegridError::MissingBounds {
        name: lat.name().to_string(),
    })?;

    GridInfo::new(
        lon.points().clone(),
        lat.points().clone(),
        bounds_cf_to_simple_1d(lon_bounds.view())?,
        bounds_cf_to_simple_1d(lat_bounds.view())?,
        lon.circular,
    )
}

/// Finds the X and Y dimension coordinates of a cube.
///
/// # Errors
///
/// Returns [`RegridError::CoordinateNotFound`] unless exactly one X and one
/// Y dimension coordinate can be identified.
pub fn get_xy_dim_coords(cube: &Cube) -> Result<(DimCoord, DimCoord)> {
    let find = |axis: CoordAxis, label: &str| -> Result<DimCoord> {
        let mut matches = cube
            .dim_coords()
            .filter(|(c, _)| guess_axis(&c.metadata) == Some(axis))
            .map(|(c, _)| c);
        match (matches.next(), matches.next()) {
            (Some(c), None) => Ok(c.clone()),
            (None, _) => Err(RegridError::CoordinateNotFound {
                name: format!("{} dimension coordinate", label),
            }),
            (Some(_), Some(_)) => Err(RegridError::Generic(format!(
                "Cube has more than one {} dimension coordinate",
                label
            ))),
        }
    };
    Ok((find(CoordAxis::X, "X")?, find(CoordAxis::Y, "Y")?))
}

/// Builds the result cube around regridded data.
///
/// `grid_y` is bound to `mesh_dim` and `grid_x` to `mesh_dim + 1`.
/// Metadata is copied from `src_cube`, as are its coordinates that do not
/// touch the mesh dimension, with dimensions after the mesh shifted by one.
///
/// # Errors
///
/// Returns [`RegridError::ShapeMismatch`] if the data does not fit the
/// coordinates.
pub fn create_cube(
    data: MaskedArray,
    src_cube: &Cube,
    mesh_dim: usize,
    grid_x: &DimCoord,
    grid_y: &DimCoord,
) -> Result<Cube> {
    let mut new_cube = Cube::new(data).with_metadata(src_cube.metadata.clone());

    new_cube.add_dim_coord(grid_x.clone(), mesh_dim + 1)?;
    new_cube.add_dim_coord(grid_y.clone(), mesh_dim)?;

    let remap = |dim: usize| if dim > mesh_dim { dim + 1 } else { dim };

    for (coord, dim) in src_cube.dim_coords() {
        if dim != mesh_dim {
            new_cube.add_dim_coord(coord.clone(), remap(dim))?;
        }
    }

    for (coord, dims) in src_cube.aux_coords() {
        if dims.contains(&mesh_dim) {
            continue;
        }
        let new_dims: Vec<usize> = dims.iter().map(|&d| remap(d)).collect();
        new_cube.add_aux_coord(coord.clone(), &new_dims)?;
    }

    Ok(new_cube)
}

/// Builds a reusable regridding operator from a mesh cube to a grid cube.
///
/// # Errors
///
/// Fails if the target has no usable X/Y dimension coordinates, the source
/// has no mesh or its data is not on faces, the mesh is not 2D, or the grid
/// bounds are missing or not contiguous.
pub fn prepare(src_mesh_cube: &Cube, target_grid_cube: &Cube) -> Result<RegridInfo> {
    let (grid_x, grid_y) = get_xy_dim_coords(target_grid_cube)?;

    let binding = src_mesh_cube
        .mesh_binding()
        .ok_or(RegridError::MissingMesh)?;
    if binding.location != MeshLocation::Face {
        return Err(RegridError::UnsupportedLocation {
            location: binding.location.to_string(),
        });
    }
    let mesh_dim = binding.dim;

    let meshinfo = mesh_to_mesh_info(&binding.mesh)?;
    let gridinfo = cube_to_grid_info(target_grid_cube)?;

    tracing::debug!(
        mesh_dim,
        faces = meshinfo.size(),
        grid_shape = ?gridinfo.shape(),
        "preparing mesh to grid regridder"
    );

    let regridder = Regridder::new(meshinfo, gridinfo)?;

    Ok(RegridInfo {
        mesh_dim,
        grid_x,
        grid_y,
        regridder: Arc::new(regridder),
    })
}

/// Applies a prepared operator to a cube's realized data.
///
/// # Errors
///
/// Returns [`RegridError::InvalidMdtol`] for a tolerance outside `[0, 1]`,
/// and shape errors if the cube does not match the operator.
pub fn perform(src_cube: &Cube, regrid_info: &RegridInfo, mdtol: f64) -> Result<Cube> {
    let mdtol = validate_mdtol(mdtol)?;
    let RegridInfo {
        mesh_dim,
        grid_x,
        grid_y,
        regridder,
    } = regrid_info;

    let new_data = regridder.regrid_along_axis(src_cube.data(), *mesh_dim, mdtol)?;

    create_cube(new_data, src_cube, *mesh_dim, grid_x, grid_y)
}

/// Regrids a mesh cube onto the grid of another cube in one step.
///
/// # Errors
///
/// See [`prepare`] and [`perform`].
pub fn regrid_unstructured_to_rectilinear(
    src_cube: &Cube,
    grid_cube: &Cube,
    mdtol: f64,
) -> Result<Cube> {
    let regrid_info = prepare(src_cube, grid_cube)?;
    perform(src_cube, &regrid_info, mdtol)
}

/// A prepared mesh-to-grid operator applied to any cube on the same mesh.
///
/// Only the presence of a mesh is checked when regridding; the mesh is not
/// compared against the one the operator was built from.
#[derive(Debug, Clone)]
pub struct MeshToGridRegridder {
    mdtol: f64,
    grid_x: DimCoord,
    grid_y: DimCoord,
    regridder: Arc<Regridder>,
}

impl MeshToGridRegridder {
    /// Default missing-data tolerance: any unmasked overlap produces a value
    pub const DEFAULT_MDTOL: f64 = 1.0;

    /// Prepares an operator from `src_mesh_cube` to `target_grid_cube`.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::InvalidMdtol`] before doing any work if the
    /// tolerance is out of range, then anything [`prepare`] returns.
    pub fn new(src_mesh_cube: &Cube, target_grid_cube: &Cube, mdtol: f64) -> Result<Self> {
        let mdtol = validate_mdtol(mdtol)?;
        let RegridInfo {
            grid_x,
            grid_y,
            regridder,
            ..
        } = prepare(src_mesh_cube, target_grid_cube)?;

        Ok(Self {
            mdtol,
            grid_x,
            grid_y,
            regridder,
        })
    }

    #[must_use]
    pub fn mdtol(&self) -> f64 {
        self.mdtol
    }

    #[must_use]
    pub fn grid_x(&self) -> &DimCoord {
        &self.grid_x
    }

    #[must_use]
    pub fn grid_y(&self) -> &DimCoord {
        &self.grid_y
    }

    #[must_use]
    pub fn regridder(&self) -> &Regridder {
        &self.regridder
    }

    /// Regrids `cube`, which must carry a mesh.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::MissingMesh`] if the cube has no mesh and a
    /// shape error if the mesh dimension does not fit the operator.
    pub fn regrid(&self, cube: &Cube) -> Result<Cube> {
        let mesh_dim = cube.mesh_dim().ok_or(RegridError::MissingMesh)?;

        let regrid_info = RegridInfo {
            mesh_dim,
            grid_x: self.grid_x.clone(),
            grid_y: self.grid_y.clone(),
            regridder: Arc::clone(&self.regridder),
        };

        perform(cube, &regrid_info, self.mdtol)
    }
}
