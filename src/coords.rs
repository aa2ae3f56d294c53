//! Labeled coordinates attached to cubes
//!
//! A [`DimCoord`] describes exactly one cube dimension with strictly
//! monotonic points. An [`AuxCoord`] may span any number of dimensions,
//! including none (a scalar coordinate).

use crate::bounds;
use crate::errors::{RegridError, Result};
use ndarray::{Array1, Array2, ArrayD};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute values carried on coordinates and cubes
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Ints(Vec<i64>),
    Double(f64),
    Doubles(Vec<f64>),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{}", s),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Ints(v) => write!(f, "{:?}", v),
            AttrValue::Double(v) => write!(f, "{}", v),
            AttrValue::Doubles(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Double(value)
    }
}

/// Naming and units shared by every coordinate kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordMetadata {
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub var_name: Option<String>,
    pub units: Option<String>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl CoordMetadata {
    /// Metadata with only a standard name set
    #[must_use]
    pub fn standard(name: &str) -> Self {
        Self {
            standard_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    #[must_use]
    pub fn with_var_name(mut self, var_name: &str) -> Self {
        self.var_name = Some(var_name.to_string());
        self
    }

    #[must_use]
    pub fn with_long_name(mut self, long_name: &str) -> Self {
        self.long_name = Some(long_name.to_string());
        self
    }

    /// Standard name, then long name, then var name, then `"unknown"`
    #[must_use]
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .or(self.var_name.as_deref())
            .unwrap_or("unknown")
    }

    /// True if any of the three names equals `name`
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        [&self.standard_name, &self.long_name, &self.var_name]
            .iter()
            .any(|n| n.as_deref() == Some(name))
    }
}

/// Horizontal axis a coordinate describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordAxis {
    X,
    Y,
}

/// Guesses whether coordinate metadata describes an X or Y axis
#[must_use]
pub fn guess_axis(metadata: &CoordMetadata) -> Option<CoordAxis> {
    const X_NAMES: [&str; 4] = ["longitude", "grid_longitude", "projection_x_coordinate", "x"];
    const Y_NAMES: [&str; 4] = ["latitude", "grid_latitude", "projection_y_coordinate", "y"];

    let name = metadata.name().to_lowercase();
    if X_NAMES.contains(&name.as_str()) {
        return Some(CoordAxis::X);
    }
    if Y_NAMES.contains(&name.as_str()) {
        return Some(CoordAxis::Y);
    }

    match metadata.units.as_deref() {
        Some("degrees_east") | Some("degree_east") | Some("degrees_E") => Some(CoordAxis::X),
        Some("degrees_north") | Some("degree_north") | Some("degrees_N") => Some(CoordAxis::Y),
        _ => None,
    }
}

/// A 1D, strictly monotonic coordinate bound to a single cube dimension
#[derive(Debug, Clone, PartialEq)]
pub struct DimCoord {
    pub metadata: CoordMetadata,
    points: Array1<f64>,
    bounds: Option<Array2<f64>>,
    /// Whether the coordinate wraps around (longitude spanning 360 degrees)
    pub circular: bool,
}

impl DimCoord {
    /// Creates a dimension coordinate, checking monotonicity and bounds shape.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::InvalidGrid`] if points are not strictly
    /// monotonic and [`RegridError::InvalidBounds`] if bounds are not `(N, 2)`.
    pub fn new(
        metadata: CoordMetadata,
        points: Array1<f64>,
        bounds: Option<Array2<f64>>,
    ) -> Result<Self> {
        if !is_strictly_monotonic(&points.to_vec()) {
            return Err(RegridError::InvalidGrid {
                message: format!(
                    "points of dimension coordinate '{}' are not strictly monotonic",
                    metadata.name()
                ),
            });
        }
        if let Some(b) = &bounds {
            if b.dim() != (points.len(), 2) {
                return Err(RegridError::InvalidBounds {
                    message: format!(
                        "coordinate '{}' has {} points but bounds of shape {:?}",
                        metadata.name(),
                        points.len(),
                        b.shape()
                    ),
                });
            }
        }
        Ok(Self {
            metadata,
            points,
            bounds,
            circular: false,
        })
    }

    #[must_use]
    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    #[must_use]
    pub fn points(&self) -> &Array1<f64> {
        &self.points
    }

    #[must_use]
    pub fn bounds(&self) -> Option<&Array2<f64>> {
        self.bounds.as_ref()
    }

    #[must_use]
    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sets bounds halfway between points if none are present
    pub fn guess_bounds(&mut self) -> Result<()> {
        if self.bounds.is_some() {
            return Ok(());
        }
        let points = self.points.to_vec();
        self.bounds = Some(bounds::guess_bounds(&points).ok_or_else(|| {
            RegridError::InvalidBounds {
                message: format!(
                    "cannot guess bounds for '{}' with fewer than two points",
                    self.name()
                ),
            }
        })?);
        Ok(())
    }
}

/// An auxiliary coordinate spanning any number of cube dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct AuxCoord {
    pub metadata: CoordMetadata,
    pub points: ArrayD<f64>,
    pub bounds: Option<ArrayD<f64>>,
}

impl AuxCoord {
    #[must_use]
    pub fn new(metadata: CoordMetadata, points: ArrayD<f64>) -> Self {
        Self {
            metadata,
            points,
            bounds: None,
        }
    }

    /// A zero-dimensional coordinate holding a single value
    #[must_use]
    pub fn scalar(metadata: CoordMetadata, value: f64) -> Self {
        Self::new(metadata, ArrayD::from_elem(ndarray::IxDyn(&[]), value))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.points.shape()
    }
}

/// Borrowed view of either coordinate kind
#[derive(Debug, Clone, Copy)]
pub enum CoordRef<'a> {
    Dim(&'a DimCoord),
    Aux(&'a AuxCoord),
}

impl<'a> CoordRef<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            CoordRef::Dim(c) => c.name(),
            CoordRef::Aux(c) => c.name(),
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &'a CoordMetadata {
        match self {
            CoordRef::Dim(c) => &c.metadata,
            CoordRef::Aux(c) => &c.metadata,
        }
    }

    /// The dimension coordinate, or [`RegridError::NotDimCoord`]
    pub fn as_dim(&self) -> Result<&'a DimCoord> {
        match self {
            CoordRef::Dim(c) => Ok(c),
            CoordRef::Aux(c) => Err(RegridError::NotDimCoord {
                name: c.name().to_string(),
            }),
        }
    }
}

fn is_strictly_monotonic(values: &[f64]) -> bool {
    if values.iter().any(|v| !v.is_finite()) {
        return false;
    }
    let increasing = values.windows(2).all(|w| w[1] > w[0]);
    let decreasing = values.windows(2).all(|w| w[1] < w[0]);
    increasing || decreasing
}
