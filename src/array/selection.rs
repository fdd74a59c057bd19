//! Positional and label-based selection: `isel`, `sel`, key-tuple
//! subscripting and boolean masks.

use chrono::{DateTime, Utc};
use ndarray::{Array1, ArrayD, Axis};

use crate::dims::{AxisSpec, Dim, Selection};
use crate::error::FieldError;
use crate::geometry::{Geometry, LayerSel, SpaceQuery, SpatialIndex};
use crate::time::TimeSel;

use super::DataArray;

/// Combined label criteria for [`DataArray::sel`]: spatial coordinates,
/// bounding area, layer selector and/or a time criterion.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub space: SpaceQuery,
    pub time: Option<TimeSel>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: f64) -> Self {
        self.space.x = Some(x);
        self
    }

    pub fn y(mut self, y: f64) -> Self {
        self.space.y = Some(y);
        self
    }

    pub fn z(mut self, z: f64) -> Self {
        self.space.z = Some(z);
        self
    }

    /// Raw (x, y) coordinate pair, alternative to `x`/`y`
    pub fn coords(mut self, x: f64, y: f64) -> Self {
        self.space.coords = Some((x, y));
        self
    }

    /// Bounding box (x0, y0, x1, y1)
    pub fn area(mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        self.space.area = Some((x0, y0, x1, y1));
        self
    }

    pub fn layers(mut self, layers: LayerSel) -> Self {
        self.space.layers = Some(layers);
        self
    }

    pub fn time(mut self, time: TimeSel) -> Self {
        self.time = Some(time);
        self
    }

    /// Partial ISO time label, e.g. "2018-01"
    pub fn time_label(mut self, label: impl Into<String>) -> Self {
        self.time = Some(TimeSel::Label(label.into()));
        self
    }
}

/// One component of a key tuple for [`DataArray::get`]
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Int(i64),
    List(Vec<i64>),
    Slice { start: Option<i64>, end: Option<i64> },
    All,
    /// Partial ISO time label; valid on the time axis only
    Label(String),
    /// Exact instant; valid on the time axis only
    At(DateTime<Utc>),
}

/// Outcome of the key-tuple disambiguation
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedKeys {
    /// One key per leading axis, applied in order
    PerAxis(Vec<Key>),
    /// The whole tuple is one fancy index list for the first axis
    FancyFirstAxis(Vec<i64>),
    /// The whole tuple is a list of time criteria
    TimeLabels(Vec<TimeSel>),
}

/// Disambiguate a key tuple.
///
/// A tuple like `(2, 3, 4)` can mean "steps 2, 3 and 4 of the first axis" or
/// "t=2, y=3, x=4". Precedence, best effort:
///
/// 1. All components are integers, the tuple is longer than the array rank
///    and the values are strictly increasing: one fancy index list for the
///    first axis.
/// 2. The array has a time axis and any component after the first is a time
///    label (and every component is an integer, label or instant): the whole
///    tuple is a list of time criteria.
/// 3. Otherwise one key per axis. An increasing integer tuple whose length
///    equals the rank stays per-axis.
pub fn normalize_keys(keys: &[Key], ndim: usize, has_time: bool) -> NormalizedKeys {
    let ints: Option<Vec<i64>> = keys
        .iter()
        .map(|k| match k {
            Key::Int(i) => Some(*i),
            _ => None,
        })
        .collect();

    if let Some(ints) = &ints {
        if ints.len() > ndim && ints.windows(2).all(|w| w[1] > w[0]) {
            return NormalizedKeys::FancyFirstAxis(ints.clone());
        }
    }

    let label_after_first = keys
        .iter()
        .skip(1)
        .any(|k| matches!(k, Key::Label(_) | Key::At(_)));
    let all_time_like = keys
        .iter()
        .all(|k| matches!(k, Key::Int(_) | Key::Label(_) | Key::At(_)));
    if has_time && label_after_first && all_time_like {
        let sels = keys
            .iter()
            .map(|k| match k {
                Key::Int(i) => TimeSel::Index(*i),
                Key::Label(s) => TimeSel::Label(s.clone()),
                Key::At(t) => TimeSel::At(*t),
                _ => unreachable!(),
            })
            .collect();
        return NormalizedKeys::TimeLabels(sels);
    }

    NormalizedKeys::PerAxis(keys.to_vec())
}

impl<T: Clone> DataArray<T> {
    /// Positional selection along one axis.
    ///
    /// A selection resolving to a single index collapses the axis out of
    /// `dims` (dropping the matching geometry/elevation dimension); an empty
    /// selection yields `Ok(None)` rather than an error. Selecting on the
    /// time axis slices the time axis and keeps the geometry; selecting on a
    /// spatial axis delegates to the geometry's own subsetting and, for
    /// layered meshes, re-keys the elevation array to the surviving nodes.
    pub fn isel(
        &self,
        sel: impl Into<Selection>,
        axis: impl Into<AxisSpec>,
    ) -> Result<Option<Self>, FieldError> {
        let axis_pos = axis.into().resolve_single(self.dims())?;
        let idx = sel.into().resolve(self.shape()[axis_pos])?;
        if idx.is_empty() {
            return Ok(None);
        }
        let single = idx.len() == 1;

        let is_time_axis = axis_pos == 0 && self.has_time_axis();
        let (time, geometry, elevation) = if is_time_axis {
            let time = self.time().select(&idx);
            let elevation = self.elevation().map(|zn| {
                if zn.ndim() == 2 {
                    if single {
                        zn.index_axis(Axis(0), idx[0]).to_owned()
                    } else {
                        zn.select(Axis(0), &idx)
                    }
                } else {
                    zn.clone()
                }
            });
            (time, self.geometry().clone(), elevation)
        } else {
            let t_off = usize::from(self.has_time_axis());
            let spatial_axis = axis_pos - t_off;
            let geometry = self.geometry().isel(&idx, spatial_axis);
            // element subsetting changes which nodes are referenced, so the
            // elevation array is re-keyed to the new node set
            let elevation = match (&geometry, self.geometry()) {
                (Geometry::LayeredMesh(_), Geometry::LayeredMesh(orig)) => {
                    let node_ids = orig.mesh.nodes_for_elements(&idx);
                    self.elevation().map(|zn| {
                        let last = zn.ndim() - 1;
                        zn.select(Axis(last), &node_ids)
                    })
                }
                _ => None,
            };
            (self.time().clone(), geometry, elevation)
        };

        let (values, dims) = if single {
            let values = self.values().index_axis(Axis(axis_pos), idx[0]).to_owned();
            let dims = self
                .dims()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != axis_pos)
                .map(|(_, d)| *d)
                .collect();
            (values, dims)
        } else {
            (
                self.values().select(Axis(axis_pos), &idx),
                self.dims().to_vec(),
            )
        };

        Ok(Some(Self::from_parts(
            values,
            time,
            dims,
            geometry,
            elevation,
            self.item().clone(),
        )))
    }

    /// Select along both grid axes of a Grid2D array in one call; equivalent
    /// to selecting x and then y
    pub fn isel_xy(
        &self,
        x: impl Into<Selection>,
        y: impl Into<Selection>,
    ) -> Result<Option<Self>, FieldError> {
        if !matches!(self.geometry(), Geometry::Grid2D(_)) {
            return Err(FieldError::Unsupported(
                "isel_xy requires a Grid2D geometry".to_string(),
            ));
        }
        match self.isel(x, Dim::X)? {
            Some(da) => da.isel(y, Dim::Y),
            None => Ok(None),
        }
    }

    /// Label-based selection in space and/or time.
    ///
    /// Spatial criteria resolve through the geometry's lookup; a structured
    /// 2D grid yields independent row/column index lists which are applied
    /// as two positional selections (row first, with the axis offset
    /// adjusted when the row axis collapses).
    pub fn sel(&self, query: &Query) -> Result<Option<Self>, FieldError> {
        let mut da = self.clone();

        if !query.space.is_empty() {
            match self.geometry().find_index(&query.space)? {
                SpatialIndex::Flat(idx) => {
                    da = match da.isel(idx, AxisSpec::Space)? {
                        Some(d) => d,
                        None => return Ok(None),
                    };
                }
                SpatialIndex::Paired { ii, jj } => {
                    let t_off = usize::from(self.has_time_axis());
                    let jj_collapses = jj.as_ref().map(|v| v.len() == 1).unwrap_or(false);
                    let jj_applied = jj.is_some();
                    if let Some(jj) = jj {
                        da = match da.isel(jj, AxisSpec::Pos(t_off))? {
                            Some(d) => d,
                            None => return Ok(None),
                        };
                    }
                    if let Some(ii) = ii {
                        let sp_axis = if jj_applied && jj_collapses { 0 } else { 1 };
                        da = match da.isel(ii, AxisSpec::Pos(sp_axis + t_off))? {
                            Some(d) => d,
                            None => return Ok(None),
                        };
                    }
                }
            }
        }

        if let Some(tsel) = &query.time {
            let idx = da.time().indices_for(tsel)?;
            da = match da.isel(idx, AxisSpec::Time)? {
                Some(d) => d,
                None => return Ok(None),
            };
        }

        Ok(Some(da))
    }

    /// Subscript with a per-axis key tuple (see [`normalize_keys`] for the
    /// disambiguation rules). Label keys are only valid on the time axis;
    /// a label matching no timestep is an error.
    pub fn get(&self, keys: &[Key]) -> Result<Option<Self>, FieldError> {
        match normalize_keys(keys, self.ndim(), self.has_time_axis()) {
            NormalizedKeys::FancyFirstAxis(idx) => self.isel(Selection::Many(idx), AxisSpec::Pos(0)),
            NormalizedKeys::TimeLabels(sels) => {
                let mut idx: Vec<usize> = Vec::new();
                for s in &sels {
                    for i in self.time().indices_for(s)? {
                        if !idx.contains(&i) {
                            idx.push(i);
                        }
                    }
                }
                self.isel(idx, AxisSpec::Time)
            }
            NormalizedKeys::PerAxis(keys) => {
                if keys.len() > self.ndim() {
                    return Err(FieldError::TooManyKeys {
                        n_keys: keys.len(),
                        ndim: self.ndim(),
                    });
                }
                let mut da = self.clone();
                for (j, k) in keys.iter().enumerate() {
                    // address by the original dim name so earlier collapses
                    // do not shift later axes
                    let dim = self.dims()[j];
                    let next = match k {
                        Key::All => continue,
                        Key::Label(s) => {
                            if dim != Dim::Time {
                                return Err(FieldError::LabelOnNonTimeAxis);
                            }
                            let idx = da.time().indices_for(&TimeSel::Label(s.clone()))?;
                            da.isel(idx, AxisSpec::Time)?
                        }
                        Key::At(t) => {
                            if dim != Dim::Time {
                                return Err(FieldError::LabelOnNonTimeAxis);
                            }
                            let idx = da.time().indices_for(&TimeSel::At(*t))?;
                            da.isel(idx, AxisSpec::Time)?
                        }
                        Key::Int(i) => da.isel(*i, AxisSpec::from(dim))?,
                        Key::List(v) => da.isel(v.clone(), AxisSpec::from(dim))?,
                        Key::Slice { start, end } => da.isel(
                            Selection::Slice {
                                start: *start,
                                end: *end,
                            },
                            AxisSpec::from(dim),
                        )?,
                    };
                    da = match next {
                        Some(d) => d,
                        None => return Ok(None),
                    };
                }
                Ok(Some(da))
            }
        }
    }

    /// Flattened values where the mask is true, in row-major order
    pub fn where_mask(&self, mask: &DataArray<bool>) -> Result<Array1<T>, FieldError> {
        self.where_mask_raw(mask.values())
    }

    /// Same as [`DataArray::where_mask`] for a raw boolean buffer
    pub fn where_mask_raw(&self, mask: &ArrayD<bool>) -> Result<Array1<T>, FieldError> {
        if mask.shape() != self.shape() {
            return Err(FieldError::MaskShapeMismatch {
                mask: mask.shape().to_vec(),
                data: self.shape().to_vec(),
            });
        }
        Ok(self
            .values()
            .iter()
            .zip(mask.iter())
            .filter(|(_, &m)| m)
            .map(|(v, _)| v.clone())
            .collect())
    }

    /// In-place assignment through a boolean mask
    pub fn set_where(&mut self, mask: &DataArray<bool>, value: T) -> Result<(), FieldError> {
        if mask.shape() != self.shape() {
            return Err(FieldError::MaskShapeMismatch {
                mask: mask.shape().to_vec(),
                data: self.shape().to_vec(),
            });
        }
        for (v, &m) in self.values.iter_mut().zip(mask.values().iter()) {
            if m {
                *v = value.clone();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_keys(v: &[i64]) -> Vec<Key> {
        v.iter().map(|&i| Key::Int(i)).collect()
    }

    #[test]
    fn test_increasing_ints_longer_than_rank_are_fancy() {
        let keys = int_keys(&[2, 3, 7]);
        assert_eq!(
            normalize_keys(&keys, 2, true),
            NormalizedKeys::FancyFirstAxis(vec![2, 3, 7])
        );
    }

    #[test]
    fn test_increasing_ints_matching_rank_stay_per_axis() {
        let keys = int_keys(&[2, 3]);
        assert_eq!(normalize_keys(&keys, 2, true), NormalizedKeys::PerAxis(keys));
    }

    #[test]
    fn test_non_increasing_ints_stay_per_axis() {
        let keys = int_keys(&[5, 3, 1]);
        assert_eq!(normalize_keys(&keys, 2, true), NormalizedKeys::PerAxis(keys));
    }

    #[test]
    fn test_label_after_first_becomes_time_list() {
        let keys = vec![
            Key::Label("2018-01-01".to_string()),
            Key::Label("2018-01-02".to_string()),
        ];
        match normalize_keys(&keys, 2, true) {
            NormalizedKeys::TimeLabels(sels) => assert_eq!(sels.len(), 2),
            other => panic!("expected time labels, got {:?}", other),
        }
    }

    #[test]
    fn test_label_without_time_axis_stays_per_axis() {
        let keys = vec![Key::Int(0), Key::Label("2018".to_string())];
        assert_eq!(
            normalize_keys(&keys, 2, false),
            NormalizedKeys::PerAxis(keys)
        );
    }

    #[test]
    fn test_leading_label_only_is_per_axis() {
        // a single label on the first axis needs no disambiguation
        let keys = vec![Key::Label("2018".to_string()), Key::Int(3)];
        assert_eq!(
            normalize_keys(&keys, 2, true),
            NormalizedKeys::PerAxis(keys)
        );
    }
}
