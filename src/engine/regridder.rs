//! Sparse regridding operator

use super::grid_info::GridInfo;
use super::mesh_info::MeshInfo;
use super::weights::compute_weights;
use super::{validate_mdtol, MDTOL_FLOOR};
use crate::errors::{RegridError, Result};
use crate::masked::MaskedArray;
use crate::parallel::ParallelConfig;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use ndarray::{ArrayD, ArrayView1, ArrayViewMut1, Axis, IxDyn, Zip};

/// Conservative mesh-to-grid operator.
///
/// Built once from a source mesh and target grid, then applied to any
/// number of data arrays with any missing-data tolerance.
#[derive(Debug, Clone)]
pub struct Regridder {
    src: MeshInfo,
    tgt: GridInfo,
    /// `(n_target_cells, n_source_faces)` area weights
    weight_matrix: CsrMatrix<f64>,
}

impl Regridder {
    /// Computes weights between `src` faces and `tgt` cells on the current
    /// thread pool.
    ///
    /// # Errors
    ///
    /// See [`Regridder::with_config`].
    pub fn new(src: MeshInfo, tgt: GridInfo) -> Result<Self> {
        Self::with_config(src, tgt, &ParallelConfig::default())
    }

    /// Computes weights with the thread count given by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::ThreadPoolError`] if a dedicated pool cannot be
    /// built.
    pub fn with_config(src: MeshInfo, tgt: GridInfo, config: &ParallelConfig) -> Result<Self> {
        let triplets = config.install(|| compute_weights(&src, &tgt))?;

        let mut coo = CooMatrix::new(tgt.size(), src.size());
        for &(row, col, weight) in &triplets {
            coo.push(row, col, weight);
        }
        let weight_matrix = CsrMatrix::from(&coo);

        tracing::info!(
            source_faces = src.size(),
            target_cells = tgt.size(),
            nonzeros = weight_matrix.nnz(),
            threads = config.effective_threads(),
            "computed regridding weights"
        );

        Ok(Self {
            src,
            tgt,
            weight_matrix,
        })
    }

    #[must_use]
    pub fn src(&self) -> &MeshInfo {
        &self.src
    }

    #[must_use]
    pub fn tgt(&self) -> &GridInfo {
        &self.tgt
    }

    #[must_use]
    pub fn weight_matrix(&self) -> &CsrMatrix<f64> {
        &self.weight_matrix
    }

    /// Regrids data whose last axis runs over the source faces.
    ///
    /// # Errors
    ///
    /// See [`Regridder::regrid_along_axis`].
    pub fn regrid(&self, data: &MaskedArray, mdtol: f64) -> Result<MaskedArray> {
        let axis = data.ndim().checked_sub(1).ok_or_else(|| RegridError::ShapeMismatch {
            message: "cannot regrid zero-dimensional data".to_string(),
        })?;
        self.regrid_along_axis(data, axis, mdtol)
    }

    /// Regrids along `axis`, which must have one entry per source face.
    ///
    /// The source axis is replaced by two axes `(n_lat, n_lon)`. A target
    /// cell is kept when the weights of its unmasked sources sum to more
    /// than `1 - mdtol`; its value is the weighted mean of those sources.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::InvalidMdtol`] for a tolerance outside
    /// `[0, 1]` and [`RegridError::ShapeMismatch`] when `axis` is out of
    /// range or has the wrong length.
    pub fn regrid_along_axis(
        &self,
        data: &MaskedArray,
        axis: usize,
        mdtol: f64,
    ) -> Result<MaskedArray> {
        let mdtol = validate_mdtol(mdtol)?;
        let shape = data.shape().to_vec();
        match shape.get(axis) {
            Some(&len) if len == self.src.size() => {}
            Some(&len) => {
                return Err(RegridError::ShapeMismatch {
                    message: format!(
                        "regridder expects {} source faces but data axis {} has length {}",
                        self.src.size(),
                        axis,
                        len
                    ),
                })
            }
            None => {
                return Err(RegridError::ShapeMismatch {
                    message: format!("axis {} out of range for data of shape {:?}", axis, shape),
                })
            }
        }

        let tol = mdtol.max(MDTOL_FLOOR);
        let mut flat_shape = shape.clone();
        flat_shape[axis] = self.tgt.size();
        let mut out = ArrayD::<f64>::zeros(IxDyn(&flat_shape));
        let mut out_mask = ArrayD::from_elem(IxDyn(&flat_shape), true);

        let values = data.data();
        let mask = data.mask();
        Zip::from(values.lanes(Axis(axis)))
            .and(mask.lanes(Axis(axis)))
            .and(out.lanes_mut(Axis(axis)))
            .and(out_mask.lanes_mut(Axis(axis)))
            .for_each(|src, src_mask, dst, dst_mask| {
                self.regrid_lane(src, src_mask, dst, dst_mask, tol);
            });

        let (n_lat, n_lon) = self.tgt.shape();
        let mut grid_shape = shape[..axis].to_vec();
        grid_shape.extend([n_lat, n_lon]);
        grid_shape.extend_from_slice(&shape[axis + 1..]);

        let out = out.into_shape(IxDyn(&grid_shape))?;
        let out_mask = out_mask.into_shape(IxDyn(&grid_shape))?;
        MaskedArray::with_mask(out, out_mask)
    }

    fn regrid_lane(
        &self,
        src: ArrayView1<'_, f64>,
        src_mask: ArrayView1<'_, bool>,
        mut dst: ArrayViewMut1<'_, f64>,
        mut dst_mask: ArrayViewMut1<'_, bool>,
        tol: f64,
    ) {
        for (t, row) in self.weight_matrix.row_iter().enumerate() {
            let mut weight_sum = 0.0;
            let mut acc = 0.0;
            for (&s, &w) in row.col_indices().iter().zip(row.values()) {
                if !src_mask[s] {
                    weight_sum += w;
                    acc += w * src[s];
                }
            }
            if weight_sum > 1.0 - tol {
                dst[t] = acc / weight_sum;
                dst_mask[t] = false;
            } else {
                dst[t] = 0.0;
                dst_mask[t] = true;
            }
        }
    }
}
