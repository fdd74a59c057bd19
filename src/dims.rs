use std::fmt;
use std::ops::{Range, RangeFull};

use crate::error::FieldError;

/// Named axis of a labeled array.
///
/// The set is closed: these are the only axis kinds the supported geometry
/// variants can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    Time,
    Z,
    Y,
    X,
    Element,
    Node,
    Frequency,
    Direction,
}

impl Dim {
    pub fn name(&self) -> &'static str {
        match self {
            Dim::Time => "time",
            Dim::Z => "z",
            Dim::Y => "y",
            Dim::X => "x",
            Dim::Element => "element",
            Dim::Node => "node",
            Dim::Frequency => "frequency",
            Dim::Direction => "direction",
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Axis argument accepted by selection and aggregation methods: a concrete
/// position, a named dimension, or one of the tokens "time" / "space"
/// (space = every axis except time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSpec {
    Time,
    Space,
    Pos(usize),
    Dim(Dim),
}

impl AxisSpec {
    /// Resolve to concrete axis positions within `dims`
    pub fn resolve(&self, dims: &[Dim]) -> Result<Vec<usize>, FieldError> {
        match self {
            AxisSpec::Time => dims
                .iter()
                .position(|d| *d == Dim::Time)
                .map(|p| vec![p])
                .ok_or_else(|| FieldError::AxisNotFound("time".to_string())),
            AxisSpec::Space => {
                let axes: Vec<usize> = dims
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| **d != Dim::Time)
                    .map(|(i, _)| i)
                    .collect();
                if axes.is_empty() {
                    Err(FieldError::AxisNotFound("space".to_string()))
                } else {
                    Ok(axes)
                }
            }
            AxisSpec::Pos(p) => {
                if *p >= dims.len() {
                    Err(FieldError::AxisNotFound(format!("{}", p)))
                } else {
                    Ok(vec![*p])
                }
            }
            AxisSpec::Dim(d) => dims
                .iter()
                .position(|x| x == d)
                .map(|p| vec![p])
                .ok_or_else(|| FieldError::AxisNotFound(d.name().to_string())),
        }
    }

    /// Resolve to exactly one axis; multi-axis specs are rejected
    pub fn resolve_single(&self, dims: &[Dim]) -> Result<usize, FieldError> {
        let axes = self.resolve(dims)?;
        if axes.len() != 1 {
            return Err(FieldError::Unsupported(
                "selecting on multiple axes in the same call".to_string(),
            ));
        }
        Ok(axes[0])
    }
}

impl From<usize> for AxisSpec {
    fn from(p: usize) -> Self {
        AxisSpec::Pos(p)
    }
}

impl From<i32> for AxisSpec {
    fn from(p: i32) -> Self {
        AxisSpec::Pos(p as usize)
    }
}

impl From<Dim> for AxisSpec {
    fn from(d: Dim) -> Self {
        match d {
            Dim::Time => AxisSpec::Time,
            other => AxisSpec::Dim(other),
        }
    }
}

/// Positional selection along one axis: a single index (which collapses the
/// axis), an index list, or a slice. Negative indices count from the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    One(i64),
    Many(Vec<i64>),
    Slice { start: Option<i64>, end: Option<i64> },
    All,
}

impl Selection {
    /// Resolve into concrete indices for an axis of length `len`.
    ///
    /// Slices clamp to the axis (Python slice semantics); explicit indices
    /// out of range are an error. The result may be empty, which callers
    /// treat as an empty-selection signal.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>, FieldError> {
        match self {
            Selection::One(i) => Ok(vec![wrap_index(*i, len)?]),
            Selection::Many(idx) => idx.iter().map(|&i| wrap_index(i, len)).collect(),
            Selection::Slice { start, end } => {
                let lo = clamp_bound(start.unwrap_or(0), len);
                let hi = clamp_bound(end.unwrap_or(len as i64), len);
                Ok((lo..hi.max(lo)).collect())
            }
            Selection::All => Ok((0..len).collect()),
        }
    }

}

fn wrap_index(i: i64, len: usize) -> Result<usize, FieldError> {
    let n = len as i64;
    let j = if i < 0 { i + n } else { i };
    if j < 0 || j >= n {
        Err(FieldError::IndexOutOfBounds { index: i, len })
    } else {
        Ok(j as usize)
    }
}

fn clamp_bound(i: i64, len: usize) -> usize {
    let n = len as i64;
    let j = if i < 0 { i + n } else { i };
    j.clamp(0, n) as usize
}

impl From<i64> for Selection {
    fn from(i: i64) -> Self {
        Selection::One(i)
    }
}

impl From<i32> for Selection {
    fn from(i: i32) -> Self {
        Selection::One(i as i64)
    }
}

impl From<usize> for Selection {
    fn from(i: usize) -> Self {
        Selection::One(i as i64)
    }
}

impl From<Vec<i64>> for Selection {
    fn from(v: Vec<i64>) -> Self {
        Selection::Many(v)
    }
}

impl From<Vec<usize>> for Selection {
    fn from(v: Vec<usize>) -> Self {
        Selection::Many(v.into_iter().map(|i| i as i64).collect())
    }
}

impl From<&[usize]> for Selection {
    fn from(v: &[usize]) -> Self {
        Selection::Many(v.iter().map(|&i| i as i64).collect())
    }
}

impl From<Range<usize>> for Selection {
    fn from(r: Range<usize>) -> Self {
        Selection::Slice {
            start: Some(r.start as i64),
            end: Some(r.end as i64),
        }
    }
}

impl From<Range<i64>> for Selection {
    fn from(r: Range<i64>) -> Self {
        Selection::Slice {
            start: Some(r.start),
            end: Some(r.end),
        }
    }
}

impl From<Range<i32>> for Selection {
    fn from(r: Range<i32>) -> Self {
        Selection::Slice {
            start: Some(r.start as i64),
            end: Some(r.end as i64),
        }
    }
}

impl From<RangeFull> for Selection {
    fn from(_: RangeFull) -> Self {
        Selection::All
    }
}
