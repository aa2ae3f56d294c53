//! Labeled data cubes
//!
//! A [`Cube`] couples masked data with metadata, coordinates bound to its
//! dimensions, and optionally an unstructured mesh bound to one dimension.

use crate::coords::{AttrValue, AuxCoord, CoordRef, DimCoord};
use crate::errors::{RegridError, Result};
use crate::masked::MaskedArray;
use crate::mesh::{Mesh, MeshLocation};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Phenomenon description carried by a cube
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CubeMetadata {
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub var_name: Option<String>,
    pub units: Option<String>,
    pub attributes: BTreeMap<String, AttrValue>,
    pub cell_methods: Vec<String>,
}

impl CubeMetadata {
    /// Standard name, then long name, then var name, then `"unknown"`
    #[must_use]
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .or(self.var_name.as_deref())
            .unwrap_or("unknown")
    }
}

/// Association between a cube dimension and a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBinding {
    pub mesh: Arc<Mesh>,
    pub location: MeshLocation,
    pub dim: usize,
}

/// Masked data with labeled coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    data: MaskedArray,
    pub metadata: CubeMetadata,
    dim_coords: Vec<(DimCoord, usize)>,
    aux_coords: Vec<(AuxCoord, Vec<usize>)>,
    mesh: Option<MeshBinding>,
}

impl Cube {
    /// A cube with no coordinates and empty metadata
    #[must_use]
    pub fn new(data: MaskedArray) -> Self {
        Self {
            data,
            metadata: CubeMetadata::default(),
            dim_coords: Vec::new(),
            aux_coords: Vec::new(),
            mesh: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: CubeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    #[must_use]
    pub fn data(&self) -> &MaskedArray {
        &self.data
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Binds a dimension coordinate to `dim`.
    ///
    /// # Errors
    ///
    /// Fails if `dim` is out of range, already has a dimension coordinate,
    /// or has a length different from the coordinate.
    pub fn add_dim_coord(&mut self, coord: DimCoord, dim: usize) -> Result<()> {
        self.check_dims(coord.name(), &[dim], &[coord.len()])?;
        if let Some(existing) = self.dim_coord_for(dim) {
            return Err(RegridError::ShapeMismatch {
                message: format!(
                    "dimension {} already described by coordinate '{}'",
                    dim,
                    existing.name()
                ),
            });
        }
        self.dim_coords.push((coord, dim));
        Ok(())
    }

    /// Binds an auxiliary coordinate to `dims`; scalar coordinates use `&[]`.
    ///
    /// # Errors
    ///
    /// Fails if the coordinate shape does not match the cube along `dims`.
    pub fn add_aux_coord(&mut self, coord: AuxCoord, dims: &[usize]) -> Result<()> {
        let shape = coord.shape().to_vec();
        self.check_dims(coord.name(), dims, &shape)?;
        self.aux_coords.push((coord, dims.to_vec()));
        Ok(())
    }

    fn check_dims(&self, name: &str, dims: &[usize], coord_shape: &[usize]) -> Result<()> {
        if dims.len() != coord_shape.len() {
            return Err(RegridError::ShapeMismatch {
                message: format!(
                    "coordinate '{}' has {} dimensions but was bound to {:?}",
                    name,
                    coord_shape.len(),
                    dims
                ),
            });
        }
        for (&dim, &len) in dims.iter().zip(coord_shape) {
            match self.shape().get(dim) {
                Some(&cube_len) if cube_len == len => {}
                Some(&cube_len) => {
                    return Err(RegridError::ShapeMismatch {
                        message: format!(
                            "coordinate '{}' has length {} but cube dimension {} has length {}",
                            name, len, dim, cube_len
                        ),
                    })
                }
                None => {
                    return Err(RegridError::ShapeMismatch {
                        message: format!(
                            "coordinate '{}' bound to dimension {} of a {}-dimensional cube",
                            name,
                            dim,
                            self.ndim()
                        ),
                    })
                }
            }
        }
        Ok(())
    }

    /// Dimension coordinates with the dimension each describes
    pub fn dim_coords(&self) -> impl Iterator<Item = (&DimCoord, usize)> {
        self.dim_coords.iter().map(|(c, d)| (c, *d))
    }

    /// Auxiliary coordinates with the dimensions each spans
    pub fn aux_coords(&self) -> impl Iterator<Item = (&AuxCoord, &[usize])> {
        self.aux_coords.iter().map(|(c, d)| (c, d.as_slice()))
    }

    /// Auxiliary coordinates spanning no dimension
    pub fn scalar_coords(&self) -> impl Iterator<Item = &AuxCoord> {
        self.aux_coords()
            .filter(|(_, dims)| dims.is_empty())
            .map(|(c, _)| c)
    }

    #[must_use]
    pub fn dim_coord_for(&self, dim: usize) -> Option<&DimCoord> {
        self.dim_coords
            .iter()
            .find(|(_, d)| *d == dim)
            .map(|(c, _)| c)
    }

    /// Finds a coordinate by standard, long or var name.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::CoordinateNotFound`] if nothing matches.
    pub fn coord(&self, name: &str) -> Result<CoordRef<'_>> {
        if let Some((c, _)) = self.dim_coords.iter().find(|(c, _)| c.metadata.matches(name)) {
            return Ok(CoordRef::Dim(c));
        }
        if let Some((c, _)) = self.aux_coords.iter().find(|(c, _)| c.metadata.matches(name)) {
            return Ok(CoordRef::Aux(c));
        }
        Err(RegridError::CoordinateNotFound {
            name: name.to_string(),
        })
    }

    /// Dimensions spanned by the named coordinate
    #[must_use]
    pub fn coord_dims(&self, name: &str) -> Option<Vec<usize>> {
        if let Some((_, d)) = self.dim_coords.iter().find(|(c, _)| c.metadata.matches(name)) {
            return Some(vec![*d]);
        }
        self.aux_coords
            .iter()
            .find(|(c, _)| c.metadata.matches(name))
            .map(|(_, d)| d.clone())
    }

    /// Binds a mesh to `dim`.
    ///
    /// # Errors
    ///
    /// Fails if `dim` is out of range or its length differs from the number
    /// of mesh elements at `location`.
    pub fn set_mesh(&mut self, mesh: Arc<Mesh>, location: MeshLocation, dim: usize) -> Result<()> {
        let len = *self.shape().get(dim).ok_or_else(|| RegridError::ShapeMismatch {
            message: format!(
                "mesh bound to dimension {} of a {}-dimensional cube",
                dim,
                self.ndim()
            ),
        })?;
        if let Some(expected) = mesh.location_size(location) {
            if expected != len {
                return Err(RegridError::ShapeMismatch {
                    message: format!(
                        "mesh has {} {}s but cube dimension {} has length {}",
                        expected, location, dim, len
                    ),
                });
            }
        }
        self.mesh = Some(MeshBinding {
            mesh,
            location,
            dim,
        });
        Ok(())
    }

    #[must_use]
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref().map(|b| b.mesh.as_ref())
    }

    #[must_use]
    pub fn mesh_binding(&self) -> Option<&MeshBinding> {
        self.mesh.as_ref()
    }

    /// The cube dimension the mesh is bound to
    #[must_use]
    pub fn mesh_dim(&self) -> Option<usize> {
        self.mesh.as_ref().map(|b| b.dim)
    }
}
