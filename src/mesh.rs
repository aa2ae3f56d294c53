//! UGRID-style unstructured meshes
//!
//! A mesh is a set of nodes plus a face-node connectivity table. Faces may
//! have different node counts; unused trailing slots in the table are masked.

use crate::coords::AuxCoord;
use crate::errors::{RegridError, Result};
use ndarray::{Array2, ArrayView2};
use std::fmt;

/// Where on the mesh a cube's data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshLocation {
    Node,
    Edge,
    Face,
}

impl MeshLocation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Face => "face",
        }
    }

    /// Parses a UGRID `location` attribute value
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "node" => Some(Self::Node),
            "edge" => Some(Self::Edge),
            "face" => Some(Self::Face),
            _ => None,
        }
    }
}

impl fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Face-node connectivity table
#[derive(Debug, Clone, PartialEq)]
pub struct Connectivity {
    /// `(n_faces, max_nodes_per_face)` node indices
    pub indices: Array2<i64>,
    /// Index that denotes the first node, usually 0 or 1
    pub start_index: i64,
    /// `true` for unused slots of faces with fewer than `max_nodes_per_face` nodes
    pub mask: Option<Array2<bool>>,
}

impl Connectivity {
    #[must_use]
    pub fn new(indices: Array2<i64>, start_index: i64) -> Self {
        Self {
            indices,
            start_index,
            mask: None,
        }
    }

    /// Adds a mask for ragged faces.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::ShapeMismatch`] if the mask shape differs from the indices.
    pub fn with_mask(mut self, mask: Array2<bool>) -> Result<Self> {
        if mask.dim() != self.indices.dim() {
            return Err(RegridError::ShapeMismatch {
                message: format!(
                    "connectivity mask shape {:?} does not match indices shape {:?}",
                    mask.shape(),
                    self.indices.shape()
                ),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    /// Masks every slot equal to `fill_value`
    #[must_use]
    pub fn with_fill_value(self, fill_value: i64) -> Self {
        let mask = self.indices.mapv(|i| i == fill_value);
        Self {
            mask: Some(mask),
            ..self
        }
    }

    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.indices.nrows()
    }

    #[must_use]
    pub fn mask_view(&self) -> Option<ArrayView2<'_, bool>> {
        self.mask.as_ref().map(|m| m.view())
    }
}

/// An unstructured mesh: node coordinates plus face connectivity
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub var_name: Option<String>,
    pub topology_dimension: usize,
    /// Node x (longitude) and y (latitude) coordinates
    pub node_coords: (AuxCoord, AuxCoord),
    pub face_node_connectivity: Connectivity,
}

impl Mesh {
    /// Creates a mesh.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::ShapeMismatch`] if the node coordinates are not
    /// 1D arrays of equal length.
    pub fn new(
        topology_dimension: usize,
        node_x: AuxCoord,
        node_y: AuxCoord,
        face_node_connectivity: Connectivity,
    ) -> Result<Self> {
        if node_x.points.ndim() != 1 || node_x.shape() != node_y.shape() {
            return Err(RegridError::ShapeMismatch {
                message: format!(
                    "node coordinates must be 1D and of equal length, got {:?} and {:?}",
                    node_x.shape(),
                    node_y.shape()
                ),
            });
        }
        Ok(Self {
            var_name: None,
            topology_dimension,
            node_coords: (node_x, node_y),
            face_node_connectivity,
        })
    }

    #[must_use]
    pub fn with_var_name(mut self, var_name: &str) -> Self {
        self.var_name = Some(var_name.to_string());
        self
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.node_coords.0.points.len()
    }

    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.face_node_connectivity.num_faces()
    }

    /// Number of elements at `location`, when known
    #[must_use]
    pub fn location_size(&self, location: MeshLocation) -> Option<usize> {
        match location {
            MeshLocation::Node => Some(self.num_nodes()),
            MeshLocation::Face => Some(self.num_faces()),
            MeshLocation::Edge => None,
        }
    }

    /// `(n_nodes, 2)` array of `[x, y]` node positions
    #[must_use]
    pub fn node_points(&self) -> Array2<f64> {
        let (x, y) = &self.node_coords;
        let n = self.num_nodes();
        let x = x.points.iter().copied().collect::<Vec<_>>();
        let y = y.points.iter().copied().collect::<Vec<_>>();
        Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { x[i] } else { y[i] })
    }
}
