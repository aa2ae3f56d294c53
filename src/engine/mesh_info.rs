//! Engine-side description of an unstructured source mesh

use crate::errors::{RegridError, Result};
use ndarray::{Array2, ArrayView2};

/// Node positions and face polygons of a 2D mesh, ready for weight generation
#[derive(Debug, Clone)]
pub struct MeshInfo {
    node_coords: Array2<f64>,
    start_index: i64,
    /// Zero-based node indices of each face, masked slots removed
    faces: Vec<Vec<usize>>,
}

impl MeshInfo {
    /// Builds a mesh descriptor from `(n_nodes, 2)` `[lon, lat]` node
    /// coordinates and `(n_faces, max_nodes)` face-node connectivity.
    ///
    /// # Errors
    ///
    /// See [`MeshInfo::with_mask`].
    pub fn new(
        node_coords: Array2<f64>,
        face_node_connectivity: ArrayView2<'_, i64>,
        start_index: i64,
    ) -> Result<Self> {
        Self::with_mask(node_coords, face_node_connectivity, start_index, None)
    }

    /// Like [`MeshInfo::new`], skipping connectivity slots where `mask` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::InvalidConnectivity`] if node coordinates are not
    /// `(n, 2)`, an index falls outside the node range once `start_index` is
    /// removed, or a face has fewer than three nodes.
    pub fn with_mask(
        node_coords: Array2<f64>,
        face_node_connectivity: ArrayView2<'_, i64>,
        start_index: i64,
        mask: Option<ArrayView2<'_, bool>>,
    ) -> Result<Self> {
        if node_coords.ncols() != 2 {
            return Err(RegridError::InvalidConnectivity {
                message: format!(
                    "node coordinates must have shape (n, 2), got {:?}",
                    node_coords.shape()
                ),
            });
        }
        if let Some(m) = &mask {
            if m.dim() != face_node_connectivity.dim() {
                return Err(RegridError::ShapeMismatch {
                    message: format!(
                        "connectivity mask shape {:?} does not match indices shape {:?}",
                        m.shape(),
                        face_node_connectivity.shape()
                    ),
                });
            }
        }

        let n_nodes = node_coords.nrows();
        let mut faces = Vec::with_capacity(face_node_connectivity.nrows());
        for (f, row) in face_node_connectivity.outer_iter().enumerate() {
            let mut nodes = Vec::with_capacity(row.len());
            for (k, &raw) in row.iter().enumerate() {
                if mask.as_ref().map_or(false, |m| m[[f, k]]) {
                    continue;
                }
                let idx = raw - start_index;
                if idx < 0 || idx as usize >= n_nodes {
                    return Err(RegridError::InvalidConnectivity {
                        message: format!(
                            "face {} refers to node {} (start index {}) but the mesh has {} nodes",
                            f, raw, start_index, n_nodes
                        ),
                    });
                }
                nodes.push(idx as usize);
            }
            if nodes.len() < 3 {
                return Err(RegridError::InvalidConnectivity {
                    message: format!("face {} has only {} nodes", f, nodes.len()),
                });
            }
            faces.push(nodes);
        }

        tracing::debug!(
            nodes = n_nodes,
            faces = faces.len(),
            start_index,
            "built mesh descriptor"
        );

        Ok(Self {
            node_coords,
            start_index,
            faces,
        })
    }

    /// Number of faces, which is the length of the source data axis
    #[must_use]
    pub fn size(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.node_coords.nrows()
    }

    #[must_use]
    pub fn start_index(&self) -> i64 {
        self.start_index
    }

    #[must_use]
    pub fn node_coords(&self) -> &Array2<f64> {
        &self.node_coords
    }

    /// Zero-based node indices of face `face`
    #[must_use]
    pub fn face_nodes(&self, face: usize) -> &[usize] {
        &self.faces[face]
    }

    /// `[lon, lat]` vertices of face `face` in connectivity order
    #[must_use]
    pub fn face_polygon(&self, face: usize) -> Vec<[f64; 2]> {
        self.faces[face]
            .iter()
            .map(|&n| [self.node_coords[[n, 0]], self.node_coords[[n, 1]]])
            .collect()
    }
}
