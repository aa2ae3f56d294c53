//! Masked n-dimensional arrays
//!
//! Cube data is realized `f64` values paired with a boolean mask where `true`
//! marks a missing point.

use crate::errors::{RegridError, Result};
use ndarray::{ArrayD, ArrayViewD, IxDyn};

/// Realized data plus a same-shaped missing-data mask
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    data: ArrayD<f64>,
    mask: ArrayD<bool>,
}

impl MaskedArray {
    /// Wraps data with nothing masked
    #[must_use]
    pub fn new(data: ArrayD<f64>) -> Self {
        let mask = ArrayD::from_elem(data.raw_dim(), false);
        Self { data, mask }
    }

    /// Wraps data with an explicit mask
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::ShapeMismatch`] if the shapes differ.
    pub fn with_mask(data: ArrayD<f64>, mask: ArrayD<bool>) -> Result<Self> {
        if data.shape() != mask.shape() {
            return Err(RegridError::ShapeMismatch {
                message: format!(
                    "data shape {:?} does not match mask shape {:?}",
                    data.shape(),
                    mask.shape()
                ),
            });
        }
        Ok(Self { data, mask })
    }

    /// Masks every point equal to `fill_value`, and every NaN
    #[must_use]
    pub fn from_fill_value(data: ArrayD<f64>, fill_value: f64) -> Self {
        let mask = data.mapv(|v| v.is_nan() || v == fill_value);
        Self { data, mask }
    }

    /// All-zero data of the given shape, unmasked
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        Self::new(ArrayD::zeros(IxDyn(shape)))
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw values, including whatever sits under the mask
    #[must_use]
    pub fn data(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    #[must_use]
    pub fn mask(&self) -> ArrayViewD<'_, bool> {
        self.mask.view()
    }

    /// Number of masked points
    #[must_use]
    pub fn count_masked(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Value at `index`, or `None` when masked or out of range
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        match self.mask.get(index) {
            Some(false) => self.data.get(index).copied(),
            _ => None,
        }
    }

    /// Copy of the data with masked points replaced by `fill_value`
    #[must_use]
    pub fn filled(&self, fill_value: f64) -> ArrayD<f64> {
        let mut out = self.data.clone();
        ndarray::Zip::from(&mut out)
            .and(&self.mask)
            .for_each(|v, &m| {
                if m {
                    *v = fill_value;
                }
            });
        out
    }

    /// Splits into raw data and mask
    #[must_use]
    pub fn into_parts(self) -> (ArrayD<f64>, ArrayD<bool>) {
        (self.data, self.mask)
    }
}

impl From<ArrayD<f64>> for MaskedArray {
    fn from(data: ArrayD<f64>) -> Self {
        Self::new(data)
    }
}
