use thiserror::Error;

/// Generic error type for labeled-array operations
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("Number of named dimensions ({n_dims}) does not equal data ndim ({ndim})")]
    DimensionMismatch { n_dims: usize, ndim: usize },

    #[error("time must be first dimension if present")]
    TimeNotFirst,

    #[error("time missing from named dimensions (number of timesteps: {0})")]
    TimeMissing(usize),

    #[error("Number of timesteps ({n_timesteps}) does not fit with data shape {shape:?}")]
    TimeLengthMismatch { n_timesteps: usize, shape: Vec<usize> },

    #[error("data shape {shape:?} does not match geometry: expected {expected} along {dim} axis")]
    ShapeGeometryMismatch {
        shape: Vec<usize>,
        expected: usize,
        dim: &'static str,
    },

    #[error("elevation has wrong shape {shape:?}: expected last axis {n_nodes} (n_nodes), first axis {n_timesteps} (n_timesteps)")]
    ElevationShape {
        shape: Vec<usize>,
        n_nodes: usize,
        n_timesteps: usize,
    },

    #[error("elevation can only be provided for layered mesh data")]
    ElevationRequiresLayered,

    #[error("axis {0} is not present in dims")]
    AxisNotFound(String),

    #[error("index {index} out of bounds for axis of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("No timesteps found")]
    NoTimestepsFound,

    #[error("Key has more dimensions ({n_keys}) than DataArray ({ndim})")]
    TooManyKeys { n_keys: usize, ndim: usize },

    #[error("label-based key is only valid on the time axis")]
    LabelOnNonTimeAxis,

    #[error("Could not parse time string: {0}")]
    InvalidTime(String),

    #[error("quantile level {0} is not in the interval [0, 1]")]
    InvalidQuantile(f64),

    #[error("arrays are not compatible: {0}")]
    Incompatible(String),

    #[error("Math operation could not be applied (lhs shape {lhs:?}, rhs shape {rhs:?})")]
    MathOperation { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("Shape of new data {new:?} does not match current shape {current:?}")]
    ValueShapeMismatch { new: Vec<usize>, current: Vec<usize> },

    #[error("mask shape {mask:?} does not match data shape {data:?}")]
    MaskShapeMismatch { mask: Vec<usize>, data: Vec<usize> },

    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error("target time {0} is outside the source time range and extrapolation is disabled")]
    OutsideTimeRange(String),

    #[error("not yet implemented: {0}")]
    Unsupported(String),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    Netcdf(String),
}
