//! The labeled array core: an N-d buffer with named dimensions, a time axis,
//! a spatial geometry and item metadata, kept consistent through every
//! selection, aggregation and arithmetic operation.

pub mod aggregate;
pub mod export;
pub mod interp;
pub mod ops;
pub mod selection;

use std::fmt;

use chrono::{DateTime, Utc};
use ndarray::{ArrayD, Axis, IxDyn};
use num_traits::Float;

use crate::dims::{AxisSpec, Dim};
use crate::error::FieldError;
use crate::geometry::Geometry;
use crate::item::ItemInfo;
use crate::time::TimeAxis;

pub use export::{Coordinate, CoordinateArray, CoordValues, ExportAttrs};
pub use interp::{InterpMethod, Interpolant2D, TimeInterpOptions, TimeInterpTarget};
pub use ops::{MathOp, Operand};
pub use selection::{normalize_keys, Key, NormalizedKeys, Query};

/// Labeled array: data plus time, named dimensions, geometry and item
/// metadata for a single quantity.
///
/// Every selection, aggregation or arithmetic operation returns a new
/// instance; the only in-place mutators are [`DataArray::set_values`],
/// [`DataArray::set_where`] and [`DataArray::flipud`].
#[derive(Debug, Clone)]
pub struct DataArray<T = f64> {
    values: ArrayD<T>,
    time: TimeAxis,
    dims: Vec<Dim>,
    geometry: Geometry,
    elevation: Option<ArrayD<f64>>,
    item: ItemInfo,
}

impl<T: Clone> DataArray<T> {
    /// Create a labeled array, validating the (data, time, dims, geometry,
    /// elevation) combination.
    ///
    /// When `dims` is omitted the layout is inferred from the geometry and
    /// the number of timesteps (best effort; rank alone cannot always
    /// disambiguate).
    pub fn new(
        data: ArrayD<T>,
        time: TimeAxis,
        item: Option<ItemInfo>,
        geometry: Geometry,
        elevation: Option<ArrayD<f64>>,
        dims: Option<&[Dim]>,
    ) -> Result<Self, FieldError> {
        let n_timesteps = time.len();
        let dims = match dims {
            Some(given) => Self::validate_dims(given, data.ndim(), n_timesteps)?,
            None => Self::guess_dims(data.ndim(), data.shape(), n_timesteps, &geometry),
        };

        if dims.first() == Some(&Dim::Time) && time.len() != data.shape()[0] {
            return Err(FieldError::TimeLengthMismatch {
                n_timesteps: time.len(),
                shape: data.shape().to_vec(),
            });
        }

        Self::check_geometry_shape(&dims, data.shape(), &geometry)?;
        Self::check_elevation(elevation.as_ref(), &geometry, n_timesteps)?;

        if dims.len() > 1 && geometry.is_undefined() {
            log::warn!("no geometry attached to a multi-dimensional array");
        }

        Ok(Self {
            values: data,
            time,
            dims,
            geometry,
            elevation,
            item: item.unwrap_or_default(),
        })
    }

    /// Geometry-less array (advisory warning applies for rank > 1)
    pub fn without_geometry(data: ArrayD<T>, time: TimeAxis) -> Result<Self, FieldError> {
        Self::new(data, time, None, Geometry::Undefined, None, None)
    }

    /// Assemble a derived array; invariants are upheld by the caller
    pub(crate) fn from_parts(
        values: ArrayD<T>,
        time: TimeAxis,
        dims: Vec<Dim>,
        geometry: Geometry,
        elevation: Option<ArrayD<f64>>,
        item: ItemInfo,
    ) -> Self {
        Self {
            values,
            time,
            dims,
            geometry,
            elevation,
            item,
        }
    }

    fn validate_dims(
        given: &[Dim],
        ndim: usize,
        n_timesteps: usize,
    ) -> Result<Vec<Dim>, FieldError> {
        if given.len() != ndim {
            return Err(FieldError::DimensionMismatch {
                n_dims: given.len(),
                ndim,
            });
        }
        if given.contains(&Dim::Time) && given.first() != Some(&Dim::Time) {
            return Err(FieldError::TimeNotFirst);
        }
        if n_timesteps > 1 && !given.contains(&Dim::Time) {
            return Err(FieldError::TimeMissing(n_timesteps));
        }
        Ok(given.to_vec())
    }

    /// Best-effort dimension inference: time leads when there is more than
    /// one step (or the leading axis is a singleton with exactly one step);
    /// the geometry supplies the trailing spatial names.
    fn guess_dims(ndim: usize, shape: &[usize], n_timesteps: usize, geometry: &Geometry) -> Vec<Dim> {
        let time_is_first =
            n_timesteps > 1 || (!shape.is_empty() && shape[0] == 1 && n_timesteps == 1);
        let mut dims = Vec::with_capacity(ndim);
        if time_is_first {
            dims.push(Dim::Time);
        }
        let rank_no_time = ndim - dims.len();
        dims.extend(geometry.guess_spatial_dims(rank_no_time));
        dims
    }

    fn check_geometry_shape(
        dims: &[Dim],
        shape: &[usize],
        geometry: &Geometry,
    ) -> Result<(), FieldError> {
        for (i, d) in dims.iter().enumerate() {
            if *d == Dim::Time {
                continue;
            }
            if let Some(expected) = geometry.expected_len(*d) {
                if shape[i] != expected {
                    return Err(FieldError::ShapeGeometryMismatch {
                        shape: shape.to_vec(),
                        expected,
                        dim: d.name(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_elevation(
        elevation: Option<&ArrayD<f64>>,
        geometry: &Geometry,
        n_timesteps: usize,
    ) -> Result<(), FieldError> {
        let zn = match elevation {
            Some(zn) => zn,
            None => return Ok(()),
        };
        let layered = match geometry {
            Geometry::LayeredMesh(m) => m,
            _ => return Err(FieldError::ElevationRequiresLayered),
        };
        let n_nodes = layered.n_nodes();
        let shape = zn.shape();
        let last_ok = shape.last() == Some(&n_nodes);
        let first_ok = n_timesteps <= 1 || shape[0] == n_timesteps;
        if !last_ok || !first_ok {
            return Err(FieldError::ElevationShape {
                shape: shape.to_vec(),
                n_nodes,
                n_timesteps,
            });
        }
        Ok(())
    }

    // ---- basic properties ----

    pub fn values(&self) -> &ArrayD<T> {
        &self.values
    }

    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Per-(time, node) vertical node positions; only layered meshes carry
    /// this
    pub fn elevation(&self) -> Option<&ArrayD<f64>> {
        self.elevation.as_ref()
    }

    pub fn item(&self) -> &ItemInfo {
        &self.item
    }

    pub fn name(&self) -> &str {
        &self.item.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.item.name = name.into();
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn ndim(&self) -> usize {
        self.values.ndim()
    }

    pub fn n_timesteps(&self) -> usize {
        self.time.len()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.time.start_time()
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.time.end_time()
    }

    pub fn has_time_axis(&self) -> bool {
        self.dims.first() == Some(&Dim::Time)
    }

    pub fn is_equidistant(&self) -> bool {
        self.time.is_equidistant()
    }

    /// Time step in seconds if equidistant
    pub fn timestep(&self) -> Option<f64> {
        self.time.timestep()
    }

    // ---- sanctioned in-place mutation ----

    /// Replace the value buffer in place; the shape must match
    pub fn set_values(&mut self, values: ArrayD<T>) -> Result<(), FieldError> {
        if values.shape() != self.values.shape() {
            return Err(FieldError::ValueShapeMismatch {
                new: values.shape().to_vec(),
                current: self.values.shape().to_vec(),
            });
        }
        self.values = values;
        Ok(())
    }

    /// Flip the first non-time axis in place
    pub fn flipud(&mut self) -> &mut Self {
        let axis = if self.has_time_axis() { 1 } else { 0 };
        if axis < self.values.ndim() {
            self.values.invert_axis(Axis(axis));
        }
        self
    }

    // ---- derived copies ----

    /// Remove axes of length 1 from data and dims; time and geometry are
    /// kept as they are
    pub fn squeeze(&self) -> Self {
        let new_shape: Vec<usize> = self
            .shape()
            .iter()
            .copied()
            .filter(|&s| s != 1)
            .collect();
        let new_dims: Vec<Dim> = self
            .dims
            .iter()
            .zip(self.shape().iter())
            .filter(|(_, &s)| s != 1)
            .map(|(d, _)| *d)
            .collect();
        let data = ArrayD::from_shape_vec(IxDyn(&new_shape), self.values.iter().cloned().collect())
            .unwrap_or_else(|_| self.values.clone());
        Self::from_parts(
            data,
            self.time.clone(),
            new_dims,
            self.geometry.clone(),
            self.elevation.clone(),
            self.item.clone(),
        )
    }

    /// Check that another array has equivalent shape, time, geometry,
    /// elevation and dims; all problems are collected into the error
    pub fn check_compatible(&self, other: &DataArray<T>) -> Result<(), FieldError> {
        let mut problems: Vec<&str> = Vec::new();
        if self.shape() != other.shape() {
            problems.push("shape of data must be the same");
        }
        if self.n_timesteps() != other.n_timesteps() {
            problems.push("number of timesteps must be the same");
        }
        if self.start_time() != other.start_time() {
            problems.push("start_time must be the same");
        }
        if self.geometry != other.geometry {
            problems.push("the geometries must be the same");
        }
        match (&self.elevation, &other.elevation) {
            (Some(a), Some(b)) => {
                // full elevation comparison can be expensive; check size and
                // the two end values only
                if a.shape() != b.shape()
                    || a.iter().next() != b.iter().next()
                    || a.iter().last() != b.iter().last()
                {
                    problems.push("elevation must be the same");
                }
            }
            (None, None) => {}
            _ => problems.push("elevation must be the same"),
        }
        if self.dims != other.dims {
            problems.push("dimension names (dims) must be the same");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(FieldError::Incompatible(problems.join(", ")))
        }
    }
}

impl<T: Clone + PartialEq> DataArray<T> {
    /// Exact value-and-layout equality; `DataArray` deliberately does not
    /// implement `PartialEq` (comparisons build boolean masks instead)
    pub fn values_equal(&self, other: &DataArray<T>) -> bool {
        self.dims == other.dims && self.values == other.values
    }
}

impl<T: Float> DataArray<T> {
    /// Remove time steps where all values are NaN
    pub fn dropna(&self) -> Result<Option<Self>, FieldError> {
        if !self.has_time_axis() {
            return Err(FieldError::AxisNotFound("time".to_string()));
        }
        let keep: Vec<usize> = (0..self.shape()[0])
            .filter(|&i| {
                self.values
                    .index_axis(Axis(0), i)
                    .iter()
                    .any(|v| !v.is_nan())
            })
            .collect();
        self.isel(keep, AxisSpec::Time)
    }

    /// Descriptive statistics over all values (NaN ignored)
    pub fn describe(&self) -> DescribeStats {
        let values: Vec<T> = self
            .values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        let to_f64 = |v: T| v.to_f64().unwrap_or(f64::NAN);
        DescribeStats {
            count: values.len(),
            mean: to_f64(crate::math::mean_lane(&values)),
            std: to_f64(crate::math::std_lane(&values)),
            min: to_f64(crate::math::min_lane(&values)),
            q25: to_f64(crate::math::quantile_lane(&values, 0.25)),
            median: to_f64(crate::math::quantile_lane(&values, 0.5)),
            q75: to_f64(crate::math::quantile_lane(&values, 0.75)),
            max: to_f64(crate::math::max_lane(&values)),
        }
    }
}

impl DataArray<f64> {
    /// Concatenate along the time axis; duplicate timestamps keep the value
    /// from the last array containing them
    pub fn concat(arrays: &[DataArray<f64>]) -> Result<DataArray<f64>, FieldError> {
        let first = arrays
            .first()
            .ok_or_else(|| FieldError::Incompatible("nothing to concatenate".to_string()))?;
        if !first.has_time_axis() {
            return Err(FieldError::AxisNotFound("time".to_string()));
        }
        for other in &arrays[1..] {
            if other.dims != first.dims || other.shape()[1..] != first.shape()[1..] {
                return Err(FieldError::Incompatible(
                    "arrays must share dims and spatial shape".to_string(),
                ));
            }
        }

        // later arrays win on duplicate timestamps
        let mut by_time: Vec<(DateTime<Utc>, (usize, usize))> = Vec::new();
        for (ai, a) in arrays.iter().enumerate() {
            for (ti, t) in a.time.as_slice().iter().enumerate() {
                match by_time.iter_mut().find(|(bt, _)| bt == t) {
                    Some(entry) => entry.1 = (ai, ti),
                    None => by_time.push((*t, (ai, ti))),
                }
            }
        }
        by_time.sort_by_key(|(t, _)| *t);

        let mut shape = first.shape().to_vec();
        shape[0] = by_time.len();
        let mut values = ArrayD::zeros(IxDyn(&shape));
        for (k, (_, (ai, ti))) in by_time.iter().enumerate() {
            values
                .index_axis_mut(Axis(0), k)
                .assign(&arrays[*ai].values.index_axis(Axis(0), *ti));
        }

        let elevation = if arrays.iter().all(|a| {
            a.elevation
                .as_ref()
                .map(|zn| zn.ndim() == 2)
                .unwrap_or(false)
        }) {
            let n_nodes = first.elevation.as_ref().map(|zn| zn.shape()[1]).unwrap_or(0);
            let mut zn = ArrayD::zeros(IxDyn(&[by_time.len(), n_nodes]));
            for (k, (_, (ai, ti))) in by_time.iter().enumerate() {
                if let Some(src) = &arrays[*ai].elevation {
                    zn.index_axis_mut(Axis(0), k)
                        .assign(&src.index_axis(Axis(0), *ti));
                }
            }
            Some(zn)
        } else {
            None
        };

        let time = TimeAxis::new(by_time.iter().map(|(t, _)| *t).collect())?;
        Ok(DataArray::from_parts(
            values,
            time,
            first.dims.clone(),
            first.geometry.clone(),
            elevation,
            first.item.clone(),
        ))
    }
}

/// Summary statistics produced by [`DataArray::describe`]
#[derive(Debug, Clone, PartialEq)]
pub struct DescribeStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl fmt::Display for DescribeStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "count  {}", self.count)?;
        writeln!(f, "mean   {:.6}", self.mean)?;
        writeln!(f, "std    {:.6}", self.std)?;
        writeln!(f, "min    {:.6}", self.min)?;
        writeln!(f, "25%    {:.6}", self.q25)?;
        writeln!(f, "50%    {:.6}", self.median)?;
        writeln!(f, "75%    {:.6}", self.q75)?;
        write!(f, "max    {:.6}", self.max)
    }
}

impl<T: Clone + fmt::Display> fmt::Display for DataArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "<hydrofield.DataArray>")?;
        writeln!(f, "name: {}", self.item.name)?;

        let dims_txt: Vec<String> = self
            .dims
            .iter()
            .zip(self.shape().iter())
            .map(|(d, s)| format!("{}:{}", d, s))
            .collect();
        writeln!(f, "dims: ({})", dims_txt.join(", "))?;

        let fmt_time = |t: DateTime<Utc>| t.format("%Y-%m-%d %H:%M:%S").to_string();
        if self.n_timesteps() == 1 {
            writeln!(f, "time: {} (time-invariant)", fmt_time(self.start_time()))?;
        } else {
            let noneq = if self.is_equidistant() { "" } else { " non-equidistant" };
            writeln!(
                f,
                "time: {} - {} ({}{} records)",
                fmt_time(self.start_time()),
                fmt_time(self.end_time()),
                self.n_timesteps(),
                noneq
            )?;
        }

        if !self.geometry.is_undefined() {
            writeln!(f, "geometry: {}", self.geometry)?;
        }

        if self.ndim() == 1 {
            let n = self.values.len();
            let vals: Vec<String> = self.values.iter().map(|v| format!("{}", v)).collect();
            if n <= 4 {
                write!(f, "values: [{}]", vals.join(", "))?;
            } else {
                write!(f, "values: [{}, {}, ..., {}]", vals[0], vals[1], vals[n - 1])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Grid2D;

    fn hourly(n: usize) -> TimeAxis {
        let start = TimeAxis::parse_datetime("2018-01-01 00:00:00").unwrap();
        TimeAxis::equidistant(start, 3600.0, n).unwrap()
    }

    fn grid2d() -> Geometry {
        Geometry::Grid2D(Grid2D::new(0.0, 1.0, 4, 0.0, 1.0, 3))
    }

    #[test]
    fn test_guess_dims_with_time_and_grid() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[5, 3, 4]));
        let da = DataArray::new(data, hourly(5), None, grid2d(), None, None).unwrap();
        assert_eq!(da.dims(), &[Dim::Time, Dim::Y, Dim::X]);
        assert!(da.has_time_axis());
    }

    #[test]
    fn test_guess_dims_singleton_leading_axis_is_time() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[1, 3, 4]));
        let da = DataArray::new(data, hourly(1), None, grid2d(), None, None).unwrap();
        assert_eq!(da.dims(), &[Dim::Time, Dim::Y, Dim::X]);
    }

    #[test]
    fn test_guess_dims_without_time() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[3, 4]));
        let da = DataArray::new(data, hourly(1), None, grid2d(), None, None).unwrap();
        assert_eq!(da.dims(), &[Dim::Y, Dim::X]);
    }

    #[test]
    fn test_explicit_dims_validation() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[5, 3]));
        let err = DataArray::new(
            data.clone(),
            hourly(5),
            None,
            Geometry::Undefined,
            None,
            Some(&[Dim::X, Dim::Time]),
        )
        .unwrap_err();
        assert!(matches!(err, FieldError::TimeNotFirst));

        let err = DataArray::new(
            data.clone(),
            hourly(5),
            None,
            Geometry::Undefined,
            None,
            Some(&[Dim::X, Dim::Y]),
        )
        .unwrap_err();
        assert!(matches!(err, FieldError::TimeMissing(5)));

        let err = DataArray::new(
            data,
            hourly(5),
            None,
            Geometry::Undefined,
            None,
            Some(&[Dim::Time]),
        )
        .unwrap_err();
        assert!(matches!(err, FieldError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_geometry_size_mismatch() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[5, 3, 9]));
        let err = DataArray::new(data, hourly(5), None, grid2d(), None, None).unwrap_err();
        assert!(matches!(err, FieldError::ShapeGeometryMismatch { .. }));
    }

    #[test]
    fn test_time_length_mismatch() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[4, 3, 4]));
        let err = DataArray::new(data, hourly(5), None, grid2d(), None, None).unwrap_err();
        assert!(matches!(err, FieldError::TimeLengthMismatch { .. }));
    }

    #[test]
    fn test_set_values_shape_checked() {
        let data = ArrayD::from_elem(IxDyn(&[2, 2]), 1.0);
        let mut da = DataArray::without_geometry(data, hourly(2)).unwrap();
        assert!(da.set_values(ArrayD::zeros(IxDyn(&[2, 2]))).is_ok());
        assert!(da.set_values(ArrayD::zeros(IxDyn(&[3, 2]))).is_err());
    }

    #[test]
    fn test_squeeze_removes_singletons() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[1, 3, 4]));
        let da = DataArray::new(data, hourly(1), None, grid2d(), None, None).unwrap();
        let sq = da.squeeze();
        assert_eq!(sq.dims(), &[Dim::Y, Dim::X]);
        assert_eq!(sq.shape(), &[3, 4]);
    }

    #[test]
    fn test_clone_is_value_equal_but_new_buffer() {
        let data = ArrayD::from_elem(IxDyn(&[2, 3, 4]), 7.0);
        let da = DataArray::new(data, hourly(2), None, grid2d(), None, None).unwrap();
        let copy = da.clone();
        assert!(da.values_equal(&copy));
        assert_ne!(
            da.values().as_ptr(),
            copy.values().as_ptr(),
            "clone must own its buffer"
        );
    }

    #[test]
    fn test_flipud_flips_first_spatial_axis() {
        let data =
            ArrayD::from_shape_vec(IxDyn(&[1, 2, 2]), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut da = DataArray::new(data, hourly(1), None, grid2d_2x2(), None, None).unwrap();
        da.flipud();
        assert_eq!(da.values()[[0, 0, 0]], 3.0);
        assert_eq!(da.values()[[0, 1, 1]], 2.0);
    }

    fn grid2d_2x2() -> Geometry {
        Geometry::Grid2D(Grid2D::new(0.0, 1.0, 2, 0.0, 1.0, 2))
    }

    #[test]
    fn test_check_compatible_reports_cross_object_problems() {
        let a = DataArray::without_geometry(ArrayD::from_elem(IxDyn(&[2, 3]), 1.0), hourly(2))
            .unwrap();
        let b = DataArray::without_geometry(ArrayD::from_elem(IxDyn(&[2, 3]), 2.0), hourly(2))
            .unwrap();
        assert!(a.check_compatible(&b).is_ok());

        let later = TimeAxis::equidistant(
            TimeAxis::parse_datetime("2019-06-01 00:00:00").unwrap(),
            3600.0,
            2,
        )
        .unwrap();
        let c = DataArray::without_geometry(ArrayD::from_elem(IxDyn(&[2, 3]), 2.0), later).unwrap();
        let err = a.check_compatible(&c).unwrap_err();
        assert!(err.to_string().contains("start_time"));
    }

    #[test]
    fn test_describe() {
        let data = ArrayD::from_shape_vec(IxDyn(&[5]), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let da = DataArray::without_geometry(data, hourly(5)).unwrap();
        let stats = da.describe();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn test_concat_keep_last() {
        let t1 = hourly(2);
        let t2 = TimeAxis::equidistant(
            TimeAxis::parse_datetime("2018-01-01 01:00:00").unwrap(),
            3600.0,
            2,
        )
        .unwrap();
        let a = DataArray::without_geometry(
            ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.0, 2.0]).unwrap(),
            t1,
        )
        .unwrap();
        let b = DataArray::without_geometry(
            ArrayD::from_shape_vec(IxDyn(&[2]), vec![20.0, 30.0]).unwrap(),
            t2,
        )
        .unwrap();
        let merged = DataArray::concat(&[a, b]).unwrap();
        assert_eq!(merged.n_timesteps(), 3);
        // overlapping step 01:00 keeps the later array's value
        assert_eq!(
            merged.values().as_slice().unwrap(),
            &[1.0, 20.0, 30.0]
        );
    }
}
