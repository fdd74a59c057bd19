//! Axis-aware reduction: `aggregate` plus the named reductions and the
//! quantile engine.

use ndarray::Axis;
use num_traits::Float;

use crate::dataset::Dataset;
use crate::dims::{AxisSpec, Dim};
use crate::error::FieldError;
use crate::geometry::Geometry;
use crate::math;

use super::DataArray;

impl<T: Float> DataArray<T> {
    /// Reduce one axis (or several, e.g. `AxisSpec::Space`) with a lane
    /// function.
    ///
    /// Reducing the time axis keeps the geometry and collapses time to its
    /// first instant; reducing a spatial axis drops geometry and elevation
    /// since the result no longer maps onto them. Several axes are reduced
    /// jointly (one flattened lane), so order-sensitive statistics stay
    /// exact.
    pub fn aggregate<F>(&self, axis: impl Into<AxisSpec>, func: F) -> Result<Self, FieldError>
    where
        F: Fn(&[T]) -> T,
    {
        self.aggregate_named(axis, func, None)
    }

    /// Same as [`DataArray::aggregate`] with an item-name override
    pub fn aggregate_named<F>(
        &self,
        axis: impl Into<AxisSpec>,
        func: F,
        name: Option<&str>,
    ) -> Result<Self, FieldError>
    where
        F: Fn(&[T]) -> T,
    {
        let axes = axis.into().resolve(self.dims())?;
        let values = math::reduce_axes(self.values(), &axes, func);

        let time_reduced = self.has_time_axis() && axes.contains(&0);
        let time = if time_reduced {
            self.time().first_only()
        } else {
            self.time().clone()
        };

        let dims: Vec<Dim> = self
            .dims()
            .iter()
            .enumerate()
            .filter(|(i, _)| !axes.contains(i))
            .map(|(_, d)| *d)
            .collect();

        let spatial_reduced = axes
            .iter()
            .any(|&a| !(a == 0 && self.has_time_axis()));
        let (geometry, elevation) = if spatial_reduced {
            (Geometry::Undefined, None)
        } else {
            let zn = self.elevation().map(|zn| {
                if zn.ndim() == 2 {
                    zn.index_axis(Axis(0), 0).to_owned()
                } else {
                    zn.clone()
                }
            });
            (self.geometry().clone(), zn)
        };

        let mut item = self.item().clone();
        if let Some(n) = name {
            item.name = n.to_string();
        }

        Ok(Self::from_parts(values, time, dims, geometry, elevation, item))
    }

    /// Max value along an axis
    pub fn max(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::max_lane)
    }

    /// Min value along an axis
    pub fn min(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::min_lane)
    }

    /// Mean value along an axis
    pub fn mean(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::mean_lane)
    }

    /// Standard deviation along an axis
    pub fn std(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::std_lane)
    }

    /// Range (max - min) along an axis
    pub fn ptp(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::ptp_lane)
    }

    /// Max value along an axis, NaN removed
    pub fn nanmax(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::nanmax_lane)
    }

    /// Min value along an axis, NaN removed
    pub fn nanmin(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::nanmin_lane)
    }

    /// Mean value along an axis, NaN removed
    pub fn nanmean(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::nanmean_lane)
    }

    /// Standard deviation along an axis, NaN removed
    pub fn nanstd(&self, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        self.aggregate(axis, math::nanstd_lane)
    }

    /// Weighted average along an axis; `weights` must cover the reduced
    /// axes in row-major order
    pub fn average(
        &self,
        weights: &[f64],
        axis: impl Into<AxisSpec>,
    ) -> Result<Self, FieldError> {
        let axis = axis.into();
        let axes = axis.resolve(self.dims())?;
        let expected: usize = axes.iter().map(|&a| self.shape()[a]).product();
        if weights.len() != expected {
            return Err(FieldError::Incompatible(format!(
                "weights length {} does not match reduced size {}",
                weights.len(),
                expected
            )));
        }
        let w = weights.to_vec();
        self.aggregate(axis, move |lane| math::weighted_mean_lane(lane, &w))
    }

    /// Quantile at a single level along an axis
    pub fn quantile(&self, q: f64, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        check_quantile(q)?;
        self.aggregate(axis, move |lane| math::quantile_lane(lane, q))
    }

    /// Quantile at a single level, NaN removed
    pub fn nanquantile(&self, q: f64, axis: impl Into<AxisSpec>) -> Result<Self, FieldError> {
        check_quantile(q)?;
        self.aggregate(axis, move |lane| math::nanquantile_lane(lane, q))
    }

    /// Quantiles at several levels; each level becomes one item of the
    /// returned container, renamed to embed its level
    pub fn quantiles(
        &self,
        qs: &[f64],
        axis: impl Into<AxisSpec>,
    ) -> Result<Dataset<T>, FieldError> {
        let axis = axis.into();
        let mut results = Vec::with_capacity(qs.len());
        for &q in qs {
            let mut da = self.quantile(q, axis)?;
            da.set_name(format!("Quantile {}, {}", q, self.name()));
            results.push(da);
        }
        Dataset::new(results)
    }

    /// Quantiles at several levels, NaN removed
    pub fn nanquantiles(
        &self,
        qs: &[f64],
        axis: impl Into<AxisSpec>,
    ) -> Result<Dataset<T>, FieldError> {
        let axis = axis.into();
        let mut results = Vec::with_capacity(qs.len());
        for &q in qs {
            let mut da = self.nanquantile(q, axis)?;
            da.set_name(format!("Quantile {}, {}", q, self.name()));
            results.push(da);
        }
        Dataset::new(results)
    }
}

fn check_quantile(q: f64) -> Result<(), FieldError> {
    if !(0.0..=1.0).contains(&q) {
        Err(FieldError::InvalidQuantile(q))
    } else {
        Ok(())
    }
}
