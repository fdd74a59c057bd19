//! Temporal and spatial interpolation.

use chrono::{DateTime, Utc};
use ndarray::{ArrayD, Axis, IxDyn};

use crate::dims::Dim;
use crate::error::FieldError;
use crate::geometry::Geometry;
use crate::math::{find_grid_indices, idw_weights, lin_interp_array};
use crate::time::TimeAxis;

use super::DataArray;

/// Target of a temporal interpolation: a new equidistant timestep (seconds)
/// or an explicit time axis
#[derive(Debug, Clone)]
pub enum TimeInterpTarget {
    Step(f64),
    Axis(TimeAxis),
}

impl From<f64> for TimeInterpTarget {
    fn from(dt: f64) -> Self {
        TimeInterpTarget::Step(dt)
    }
}

impl From<&TimeAxis> for TimeInterpTarget {
    fn from(axis: &TimeAxis) -> Self {
        TimeInterpTarget::Axis(axis.clone())
    }
}

impl<T: Clone> From<&DataArray<T>> for TimeInterpTarget {
    fn from(da: &DataArray<T>) -> Self {
        TimeInterpTarget::Axis(da.time().clone())
    }
}

/// Interpolation kind for the time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpMethod {
    Linear,
    Nearest,
    Previous,
    Next,
}

/// Options for [`DataArray::interp_time_with`]
#[derive(Debug, Clone, Copy)]
pub struct TimeInterpOptions {
    pub method: InterpMethod,
    /// When false, a target instant outside the source range is an error;
    /// when true it gets `fill_value`
    pub extrapolate: bool,
    pub fill_value: f64,
}

impl Default for TimeInterpOptions {
    fn default() -> Self {
        Self {
            method: InterpMethod::Linear,
            extrapolate: true,
            fill_value: f64::NAN,
        }
    }
}

/// Precomputed spatial interpolant: per target point, source element indices
/// and their weights. Reusable across arrays sharing a geometry.
#[derive(Debug, Clone)]
pub struct Interpolant2D {
    pub indices: Vec<Vec<usize>>,
    pub weights: Vec<Vec<f64>>,
}

impl DataArray<f64> {
    /// Temporal interpolation with default options (linear, out-of-range
    /// values become NaN)
    pub fn interp_time(&self, target: impl Into<TimeInterpTarget>) -> Result<Self, FieldError> {
        self.interp_time_with(target, TimeInterpOptions::default())
    }

    /// Temporal interpolation onto a new timestep or time axis; the
    /// elevation array is interpolated in lock-step
    pub fn interp_time_with(
        &self,
        target: impl Into<TimeInterpTarget>,
        opts: TimeInterpOptions,
    ) -> Result<Self, FieldError> {
        if !self.has_time_axis() {
            return Err(FieldError::AxisNotFound("time".to_string()));
        }
        let target_axis = match target.into() {
            TimeInterpTarget::Step(dt) => {
                if dt <= 0.0 {
                    return Err(FieldError::InvalidTime(format!("timestep {} s", dt)));
                }
                let span = (self.end_time() - self.start_time()).num_milliseconds() as f64 / 1000.0;
                let n = (span / dt).floor() as usize + 1;
                TimeAxis::equidistant(self.start_time(), dt, n)?
            }
            TimeInterpTarget::Axis(axis) => axis,
        };

        let t_in = self.time().as_epoch_seconds();
        let t_out = target_axis.as_epoch_seconds();

        let values = interp_time_buffer(self.values(), &t_in, &t_out, &opts)?;
        let elevation = match self.elevation() {
            Some(zn) if zn.ndim() == 2 => Some(interp_time_buffer(zn, &t_in, &t_out, &opts)?),
            other => other.cloned(),
        };

        Ok(Self::from_parts(
            values,
            target_axis,
            self.dims().to_vec(),
            self.geometry().clone(),
            elevation,
            self.item().clone(),
        ))
    }

    /// Spatial interpolation to a point on a Grid1D axis; the x axis
    /// collapses and the geometry becomes undefined
    pub fn interp_x(&self, x: f64) -> Result<Self, FieldError> {
        let g = match self.geometry() {
            Geometry::Grid1D(g) => g,
            _ => {
                return Err(FieldError::Unsupported(
                    "interp_x requires a Grid1D geometry".to_string(),
                ))
            }
        };
        let coords = g.x();
        let (i0, i1, w) = find_grid_indices(&coords, x);
        let ax = usize::from(self.has_time_axis());
        let v0 = self.values().index_axis(Axis(ax), i0);
        let v1 = self.values().index_axis(Axis(ax), i1);
        let values = lin_interp_array(v0, v1, w);
        let dims: Vec<Dim> = self
            .dims()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != ax)
            .map(|(_, d)| *d)
            .collect();
        Ok(Self::from_parts(
            values,
            self.time().clone(),
            dims,
            Geometry::Undefined,
            None,
            self.item().clone(),
        ))
    }

    /// Spatial interpolation to a point: bilinear on Grid2D, inverse
    /// distance over the `n_nearest` element centers on a flat mesh. The
    /// spatial axes collapse and the result carries a point geometry.
    pub fn interp_xy(&self, x: f64, y: f64, n_nearest: usize) -> Result<Self, FieldError> {
        let t_off = usize::from(self.has_time_axis());
        let (values, dims): (ArrayD<f64>, Vec<Dim>) = match self.geometry() {
            Geometry::Grid2D(g) => {
                let xs = g.x();
                let ys = g.y();
                let (i0, i1, wx) = find_grid_indices(&xs, x);
                let (j0, j1, wy) = find_grid_indices(&ys, y);
                // after slicing y away, the x axis moves up to its position
                let f00 = self
                    .values()
                    .index_axis(Axis(t_off), j0)
                    .index_axis(Axis(t_off), i0)
                    .to_owned();
                let f10 = self
                    .values()
                    .index_axis(Axis(t_off), j0)
                    .index_axis(Axis(t_off), i1)
                    .to_owned();
                let f01 = self
                    .values()
                    .index_axis(Axis(t_off), j1)
                    .index_axis(Axis(t_off), i0)
                    .to_owned();
                let f11 = self
                    .values()
                    .index_axis(Axis(t_off), j1)
                    .index_axis(Axis(t_off), i1)
                    .to_owned();
                let fy0 = lin_interp_array(f00.view(), f10.view(), wx);
                let fy1 = lin_interp_array(f01.view(), f11.view(), wx);
                let values = lin_interp_array(fy0.view(), fy1.view(), wy);
                let dims = self
                    .dims()
                    .iter()
                    .filter(|d| **d != Dim::X && **d != Dim::Y)
                    .copied()
                    .collect();
                (values, dims)
            }
            Geometry::Mesh(m) => {
                let centers = m.element_centers();
                let order = nearest_n(&centers, x, y, n_nearest);
                let sources: Vec<[f64; 2]> =
                    order.iter().map(|&e| [centers[e][0], centers[e][1]]).collect();
                let w = idw_weights(&sources, x, y);
                let mut acc = self
                    .values()
                    .index_axis(Axis(t_off), order[0])
                    .mapv(|v| v * w[0]);
                for (k, &e) in order.iter().enumerate().skip(1) {
                    let term = self.values().index_axis(Axis(t_off), e).mapv(|v| v * w[k]);
                    acc += &term;
                }
                let dims = self
                    .dims()
                    .iter()
                    .filter(|d| **d != Dim::Element)
                    .copied()
                    .collect();
                (acc, dims)
            }
            _ => {
                return Err(FieldError::Unsupported(
                    "interp_xy supports Grid2D and flat mesh data".to_string(),
                ))
            }
        };

        Ok(Self::from_parts(
            values,
            self.time().clone(),
            dims,
            Geometry::Point2D { x, y },
            None,
            self.item().clone(),
        ))
    }

    /// Precompute an inverse-distance interpolant from this array's flat
    /// mesh onto a list of target points
    pub fn interpolant_to(
        &self,
        targets: &[[f64; 2]],
        n_nearest: usize,
    ) -> Result<Interpolant2D, FieldError> {
        let m = match self.geometry() {
            Geometry::Mesh(m) => m,
            _ => {
                return Err(FieldError::Unsupported(
                    "currently only supports interpolating from 2d flexible mesh data".to_string(),
                ))
            }
        };
        let centers = m.element_centers();
        let mut indices = Vec::with_capacity(targets.len());
        let mut weights = Vec::with_capacity(targets.len());
        for p in targets {
            let order = nearest_n(&centers, p[0], p[1], n_nearest);
            let sources: Vec<[f64; 2]> =
                order.iter().map(|&e| [centers[e][0], centers[e][1]]).collect();
            weights.push(idw_weights(&sources, p[0], p[1]));
            indices.push(order);
        }
        Ok(Interpolant2D { indices, weights })
    }

    /// Interpolate onto another array's geometry and time axis
    pub fn interp_like(&self, other: &DataArray<f64>) -> Result<Self, FieldError> {
        let da = self.interp_like_geometry(other.geometry(), None, 3)?;
        da.interp_time(other.time())
    }

    /// Interpolate a flat-mesh array onto a Grid2D or another flat mesh; a
    /// precomputed interpolant may be reused
    pub fn interp_like_geometry(
        &self,
        geometry: &Geometry,
        interpolant: Option<&Interpolant2D>,
        n_nearest: usize,
    ) -> Result<Self, FieldError> {
        let t_off = usize::from(self.has_time_axis());
        if self.ndim() != t_off + 1 || !matches!(self.geometry(), Geometry::Mesh(_)) {
            return Err(FieldError::Unsupported(
                "currently only supports interpolating from 2d flexible mesh data".to_string(),
            ));
        }

        let (targets, spatial_shape, spatial_dims): (Vec<[f64; 2]>, Vec<usize>, Vec<Dim>) =
            match geometry {
                Geometry::Grid2D(g) => {
                    let xs = g.x();
                    let ys = g.y();
                    let mut pts = Vec::with_capacity(xs.len() * ys.len());
                    for &y in &ys {
                        for &x in &xs {
                            pts.push([x, y]);
                        }
                    }
                    (pts, vec![g.ny, g.nx], vec![Dim::Y, Dim::X])
                }
                Geometry::Mesh(m) => {
                    let pts = m
                        .element_centers()
                        .iter()
                        .map(|c| [c[0], c[1]])
                        .collect::<Vec<_>>();
                    let n = pts.len();
                    (pts, vec![n], vec![Dim::Element])
                }
                _ => {
                    return Err(FieldError::Unsupported(
                        "interp_like targets must be Grid2D or a flat mesh".to_string(),
                    ))
                }
            };

        let owned;
        let itp = match interpolant {
            Some(itp) => itp,
            None => {
                owned = self.interpolant_to(&targets, n_nearest)?;
                &owned
            }
        };

        let nt = if t_off == 1 { self.shape()[0] } else { 1 };
        let n_targets = targets.len();
        let mut flat = vec![0.0; nt * n_targets];
        for (k, (idx, ws)) in itp.indices.iter().zip(itp.weights.iter()).enumerate() {
            for t in 0..nt {
                let mut v = 0.0;
                for (j, &e) in idx.iter().enumerate() {
                    let val = if t_off == 1 {
                        self.values()[[t, e]]
                    } else {
                        self.values()[[e]]
                    };
                    v += ws[j] * val;
                }
                flat[t * n_targets + k] = v;
            }
        }

        let mut shape = Vec::new();
        let mut dims = Vec::new();
        if t_off == 1 {
            shape.push(nt);
            dims.push(Dim::Time);
        }
        shape.extend(&spatial_shape);
        dims.extend(&spatial_dims);
        let values = ArrayD::from_shape_vec(IxDyn(&shape), flat)
            .expect("target shape matches interpolated buffer");

        Ok(Self::from_parts(
            values,
            self.time().clone(),
            dims,
            geometry.clone(),
            None,
            self.item().clone(),
        ))
    }
}

/// Indices of the n points nearest to (x, y), nearest first
fn nearest_n(centers: &[[f64; 3]], x: f64, y: f64, n: usize) -> Vec<usize> {
    let mut by_dist: Vec<(f64, usize)> = centers
        .iter()
        .enumerate()
        .map(|(e, c)| ((c[0] - x).powi(2) + (c[1] - y).powi(2), e))
        .collect();
    by_dist.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    by_dist.iter().take(n.max(1)).map(|(_, e)| *e).collect()
}

fn interp_time_buffer(
    values: &ArrayD<f64>,
    t_in: &[f64],
    t_out: &[f64],
    opts: &TimeInterpOptions,
) -> Result<ArrayD<f64>, FieldError> {
    let mut shape = values.shape().to_vec();
    shape[0] = t_out.len();
    let mut out = ArrayD::zeros(IxDyn(&shape));

    let lo = t_in[0];
    let hi = t_in[t_in.len() - 1];

    for (k, &t) in t_out.iter().enumerate() {
        let mut row = out.index_axis_mut(Axis(0), k);
        if t < lo || t > hi {
            if !opts.extrapolate {
                let when = DateTime::<Utc>::from_timestamp(t as i64, 0)
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| format!("{} s", t));
                return Err(FieldError::OutsideTimeRange(when));
            }
            row.fill(opts.fill_value);
            continue;
        }
        let (i0, i1, w) = find_grid_indices(t_in, t);
        let v0 = values.index_axis(Axis(0), i0);
        let v1 = values.index_axis(Axis(0), i1);
        match opts.method {
            InterpMethod::Linear => row.assign(&lin_interp_array(v0, v1, w)),
            InterpMethod::Nearest => row.assign(if w < 0.5 { &v0 } else { &v1 }),
            InterpMethod::Previous => row.assign(&v0),
            InterpMethod::Next => row.assign(if w > 0.0 { &v1 } else { &v0 }),
        }
    }
    Ok(out)
}
