//! Centralized error handling for mesh_regrid
//!
//! Every fallible operation in the crate returns [`Result`], whose error type
//! is [`RegridError`]. Checks fail fast; nothing is retried.

use std::fmt;

/// Main error type for regridding operations
#[derive(Debug)]
pub enum RegridError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Mesh topology dimension other than 2
    UnsupportedTopology { dimension: usize },

    /// Mesh data located somewhere the engine cannot regrid from
    UnsupportedLocation { location: String },

    /// Paired bounds where `bounds[i + 1, 0] != bounds[i, 1]`
    NonContiguousBounds { index: usize, upper: f64, next_lower: f64 },

    /// Bounds array with the wrong shape
    InvalidBounds { message: String },

    /// A cube that was expected to carry a mesh does not
    MissingMesh,

    /// A coordinate that must be a dimension coordinate is not
    NotDimCoord { name: String },

    /// Coordinate lookup failed
    CoordinateNotFound { name: String },

    /// Grid coordinate without bounds
    MissingBounds { name: String },

    /// Missing data tolerance outside [0, 1]
    InvalidMdtol(f64),

    /// Face-node connectivity that cannot describe polygons
    InvalidConnectivity { message: String },

    /// Grid descriptor inconsistency
    InvalidGrid { message: String },

    /// Array or coordinate lengths that do not line up
    ShapeMismatch { message: String },

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// Attribute missing or of an unusable type
    AttributeError { var: String, attr: String },

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Generic error for everything else
    Generic(String),
}

impl fmt::Display for RegridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegridError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            RegridError::IoError(e) => write!(f, "I/O error: {}", e),
            RegridError::ArrayError(e) => write!(f, "Array error: {}", e),
            RegridError::UnsupportedTopology { dimension } => write!(
                f,
                "Mesh topology dimension must be 2, got {}",
                dimension
            ),
            RegridError::UnsupportedLocation { location } => write!(
                f,
                "Regridding is only supported for data located on mesh faces, got '{}'",
                location
            ),
            RegridError::NonContiguousBounds {
                index,
                upper,
                next_lower,
            } => write!(
                f,
                "Bounds are not contiguous: upper bound {} of cell {} differs from lower bound {} of cell {}",
                upper,
                index,
                next_lower,
                index + 1
            ),
            RegridError::InvalidBounds { message } => write!(f, "Invalid bounds: {}", message),
            RegridError::MissingMesh => write!(f, "Cube has no mesh"),
            RegridError::NotDimCoord { name } => {
                write!(f, "Coordinate '{}' is not a dimension coordinate", name)
            }
            RegridError::CoordinateNotFound { name } => {
                write!(f, "Coordinate '{}' not found on cube", name)
            }
            RegridError::MissingBounds { name } => {
                write!(f, "Coordinate '{}' has no bounds", name)
            }
            RegridError::InvalidMdtol(mdtol) => write!(
                f,
                "Value for mdtol must be in range 0 - 1, got {}.",
                mdtol
            ),
            RegridError::InvalidConnectivity { message } => {
                write!(f, "Invalid face-node connectivity: {}", message)
            }
            RegridError::InvalidGrid { message } => write!(f, "Invalid grid: {}", message),
            RegridError::ShapeMismatch { message } => write!(f, "Shape mismatch: {}", message),
            RegridError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            RegridError::AttributeError { var, attr } => write!(
                f,
                "Attribute '{}' of variable '{}' is missing or has an unsupported type",
                attr, var
            ),
            RegridError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            RegridError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RegridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegridError::NetCDFError(e) => Some(e),
            RegridError::IoError(e) => Some(e),
            RegridError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for RegridError {
    fn from(error: netcdf::Error) -> Self {
        RegridError::NetCDFError(error)
    }
}

impl From<std::io::Error> for RegridError {
    fn from(error: std::io::Error) -> Self {
        RegridError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for RegridError {
    fn from(error: ndarray::ShapeError) -> Self {
        RegridError::ArrayError(error)
    }
}

impl From<String> for RegridError {
    fn from(error: String) -> Self {
        RegridError::Generic(error)
    }
}

impl From<&str> for RegridError {
    fn from(error: &str) -> Self {
        RegridError::Generic(error.to_string())
    }
}

/// Result type alias for regridding operations
pub type Result<T> = std::result::Result<T, RegridError>;
