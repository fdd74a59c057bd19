//! hydrofield - labeled, geometry-aware arrays for time-oriented model output
//!
//! A [`DataArray`] wraps an N-d numeric buffer with named dimensions, a time
//! axis, a spatial geometry (regular grids, unstructured flexible meshes,
//! spectral variants) and item metadata. It offers positional and
//! label-based selection, temporal and spatial interpolation, axis-aware
//! reduction, elementwise arithmetic and comparisons, and export adapters.
//!
//! ```
//! use hydrofield::{DataArray, Dim, Geometry, Grid2D, TimeAxis};
//! use ndarray::{ArrayD, IxDyn};
//!
//! let start = TimeAxis::parse_datetime("2018-01-01 00:00:00").unwrap();
//! let time = TimeAxis::equidistant(start, 3600.0, 5).unwrap();
//! let geometry = Geometry::Grid2D(Grid2D::new(0.0, 0.25, 4, 55.0, 0.25, 3));
//! let data = ArrayD::<f64>::zeros(IxDyn(&[5, 3, 4]));
//!
//! let da = DataArray::new(data, time, None, geometry, None, None).unwrap();
//! assert_eq!(da.dims(), &[Dim::Time, Dim::Y, Dim::X]);
//!
//! let step = da.isel(0, Dim::Time).unwrap().unwrap();
//! assert_eq!(step.dims(), &[Dim::Y, Dim::X]);
//! ```

pub mod array;
pub mod dataset;
pub mod dims;
pub mod error;
pub mod geometry;
pub mod item;
pub mod math;
pub mod time;

pub use array::{
    normalize_keys, CoordValues, Coordinate, CoordinateArray, DataArray, DescribeStats,
    ExportAttrs, InterpMethod, Interpolant2D, Key, MathOp, NormalizedKeys, Operand, Query,
    TimeInterpOptions, TimeInterpTarget,
};
pub use dataset::Dataset;
pub use dims::{AxisSpec, Dim, Selection};
pub use error::FieldError;
pub use geometry::{
    AreaSpectrum, FlexibleMesh, Geometry, Grid1D, Grid2D, Grid3D, LayerSel, LayeredMesh,
    LineSpectrum, PointSpectrum, SpaceQuery, SpatialIndex, SpectralAxes,
};
pub use item::{ItemInfo, Quantity, Unit};
pub use time::{TimeAxis, TimeSel};
