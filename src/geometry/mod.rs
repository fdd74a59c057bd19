//! Spatial geometry variants and the capability surface the labeled array
//! engine consumes: sizes per named dimension, index-based subsetting,
//! label-based lookup and node tables for layered meshes.

pub mod grid;
pub mod mesh;

use std::fmt;
use std::sync::Arc;

use crate::dims::Dim;
use crate::error::FieldError;

pub use grid::{Grid1D, Grid2D, Grid3D};
pub use mesh::{AreaSpectrum, FlexibleMesh, LayeredMesh, LineSpectrum, PointSpectrum, SpectralAxes};

/// Layer criterion for layered meshes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSel {
    Top,
    Bottom,
    /// Layer number from the bottom (negative counts from the top)
    Number(i64),
    Numbers(Vec<i64>),
}

/// Spatial label criteria resolved by `Geometry::find_index`
#[derive(Debug, Clone, Default)]
pub struct SpaceQuery {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    /// Raw (x, y) coordinate pair, alternative to x/y
    pub coords: Option<(f64, f64)>,
    /// Bounding box (x0, y0, x1, y1)
    pub area: Option<(f64, f64, f64, f64)>,
    pub layers: Option<LayerSel>,
}

impl SpaceQuery {
    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.z.is_none()
            && self.coords.is_none()
            && self.area.is_none()
            && self.layers.is_none()
    }

    /// Point coordinates from either `coords` or `x`/`y`
    fn point(&self) -> Option<(f64, f64)> {
        if let Some((x, y)) = self.coords {
            return Some((x, y));
        }
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }
}

/// Result of a label-based spatial lookup: one flat index list, or a pair of
/// independent per-axis index lists (structured 2D grids).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpatialIndex {
    Flat(Vec<usize>),
    Paired {
        /// x-axis (column) indices
        ii: Option<Vec<usize>>,
        /// y-axis (row) indices
        jj: Option<Vec<usize>>,
    },
}

/// Closed set of spatial geometry variants a labeled array can carry.
///
/// Heavy variants sit behind `Arc` so derived arrays share them instead of
/// copying node tables.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Undefined,
    Point2D { x: f64, y: f64 },
    Point3D { x: f64, y: f64, z: f64 },
    Grid1D(Grid1D),
    Grid2D(Grid2D),
    Grid3D(Grid3D),
    Mesh(Arc<FlexibleMesh>),
    LayeredMesh(Arc<LayeredMesh>),
    PointSpectrum(PointSpectrum),
    LineSpectrum(Arc<LineSpectrum>),
    AreaSpectrum(Arc<AreaSpectrum>),
}

impl Geometry {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Geometry::Undefined)
    }

    pub fn is_layered(&self) -> bool {
        matches!(self, Geometry::LayeredMesh(_))
    }

    pub fn is_spectral(&self) -> bool {
        matches!(
            self,
            Geometry::PointSpectrum(_) | Geometry::LineSpectrum(_) | Geometry::AreaSpectrum(_)
        )
    }

    /// Expected axis length for a named dimension, if this geometry
    /// constrains it
    pub fn expected_len(&self, dim: Dim) -> Option<usize> {
        match (self, dim) {
            (Geometry::Grid1D(g), Dim::X) => Some(g.nx),
            (Geometry::Grid2D(g), Dim::X) => Some(g.nx),
            (Geometry::Grid2D(g), Dim::Y) => Some(g.ny),
            (Geometry::Grid3D(g), Dim::X) => Some(g.nx),
            (Geometry::Grid3D(g), Dim::Y) => Some(g.ny),
            (Geometry::Grid3D(g), Dim::Z) => Some(g.nz),
            (Geometry::Mesh(m), Dim::Element) => Some(m.n_elements()),
            (Geometry::LayeredMesh(m), Dim::Element) => Some(m.n_elements()),
            (Geometry::AreaSpectrum(s), Dim::Element) => Some(s.n_elements()),
            (Geometry::LineSpectrum(s), Dim::Node) => Some(s.n_nodes()),
            (Geometry::PointSpectrum(s), Dim::Frequency) => Some(s.axes.n_frequencies()),
            (Geometry::PointSpectrum(s), Dim::Direction) => Some(s.axes.n_directions()),
            (Geometry::LineSpectrum(s), Dim::Frequency) => Some(s.axes.n_frequencies()),
            (Geometry::LineSpectrum(s), Dim::Direction) => Some(s.axes.n_directions()),
            (Geometry::AreaSpectrum(s), Dim::Frequency) => Some(s.axes.n_frequencies()),
            (Geometry::AreaSpectrum(s), Dim::Direction) => Some(s.axes.n_directions()),
            _ => None,
        }
    }

    /// Best-effort spatial dimension names for an array of the given rank
    /// (excluding time). Rank alone cannot always disambiguate; this mirrors
    /// what the supported file layouts actually produce.
    pub fn guess_spatial_dims(&self, rank_no_time: usize) -> Vec<Dim> {
        let mut dims = Vec::new();
        match self {
            Geometry::PointSpectrum(_) => {
                if rank_no_time == 1 {
                    dims.push(Dim::Frequency);
                } else if rank_no_time == 2 {
                    dims.push(Dim::Frequency);
                    dims.push(Dim::Direction);
                }
            }
            Geometry::LineSpectrum(_) => {
                if rank_no_time > 0 {
                    dims.push(Dim::Node);
                }
                if rank_no_time == 2 {
                    dims.push(Dim::Frequency);
                } else if rank_no_time == 3 {
                    dims.push(Dim::Frequency);
                    dims.push(Dim::Direction);
                }
            }
            Geometry::Mesh(_) | Geometry::LayeredMesh(_) => {
                if rank_no_time > 0 {
                    dims.push(Dim::Element);
                }
            }
            Geometry::AreaSpectrum(_) => {
                if rank_no_time > 0 {
                    dims.push(Dim::Element);
                }
                if rank_no_time == 2 {
                    dims.push(Dim::Frequency);
                } else if rank_no_time == 3 {
                    dims.push(Dim::Frequency);
                    dims.push(Dim::Direction);
                }
            }
            Geometry::Grid1D(_) => {
                dims.push(Dim::X);
            }
            Geometry::Grid2D(_) => {
                dims.push(Dim::Y);
                dims.push(Dim::X);
            }
            _ => {
                if rank_no_time > 2 {
                    dims.push(Dim::Z);
                }
                if rank_no_time > 1 {
                    dims.push(Dim::Y);
                }
                if rank_no_time > 0 {
                    dims.push(Dim::X);
                }
            }
        }
        dims
    }

    /// Positional subsetting along a spatial axis (0-based, time excluded).
    ///
    /// A single index collapses to a point (or drops to `Undefined` when no
    /// point makes sense); a multi-index subset keeps the variant when the
    /// structure survives and otherwise degrades to `Undefined`.
    pub fn isel(&self, idx: &[usize], spatial_axis: usize) -> Geometry {
        let single = idx.len() == 1;
        match self {
            Geometry::Grid1D(g) if spatial_axis == 0 => {
                if single {
                    Geometry::Undefined
                } else {
                    g.subset(idx).map(Geometry::Grid1D).unwrap_or(Geometry::Undefined)
                }
            }
            Geometry::Grid2D(g) => {
                if single {
                    match spatial_axis {
                        0 => Geometry::Grid1D(g.x_axis()),
                        1 => Geometry::Grid1D(g.y_axis()),
                        _ => Geometry::Undefined,
                    }
                } else {
                    g.subset(idx, spatial_axis)
                        .map(Geometry::Grid2D)
                        .unwrap_or(Geometry::Undefined)
                }
            }
            Geometry::Grid3D(g) => {
                if single {
                    if spatial_axis == 0 {
                        Geometry::Grid2D(g.horizontal())
                    } else {
                        Geometry::Undefined
                    }
                } else {
                    g.subset(idx, spatial_axis)
                        .map(Geometry::Grid3D)
                        .unwrap_or(Geometry::Undefined)
                }
            }
            Geometry::Mesh(m) if spatial_axis == 0 => {
                if single {
                    let c = m.element_center(idx[0]);
                    Geometry::Point2D { x: c[0], y: c[1] }
                } else {
                    let (sub, _) = m.subset_elements(idx);
                    Geometry::Mesh(Arc::new(sub))
                }
            }
            Geometry::LayeredMesh(m) if spatial_axis == 0 => {
                if single {
                    let c = m.mesh.element_center(idx[0]);
                    Geometry::Point3D { x: c[0], y: c[1], z: c[2] }
                } else {
                    let (sub, _) = m.subset_elements(idx);
                    Geometry::LayeredMesh(Arc::new(sub))
                }
            }
            Geometry::PointSpectrum(s) => match spatial_axis {
                0 => Geometry::PointSpectrum(PointSpectrum {
                    x: s.x,
                    y: s.y,
                    axes: s.axes.subset_frequencies(idx),
                }),
                1 => Geometry::PointSpectrum(PointSpectrum {
                    x: s.x,
                    y: s.y,
                    axes: s.axes.subset_directions(idx),
                }),
                _ => Geometry::Undefined,
            },
            Geometry::LineSpectrum(s) => match spatial_axis {
                0 => {
                    if single {
                        let c = s.node_coordinates[idx[0]];
                        Geometry::PointSpectrum(PointSpectrum {
                            x: Some(c[0]),
                            y: Some(c[1]),
                            axes: s.axes.clone(),
                        })
                    } else {
                        Geometry::LineSpectrum(Arc::new(s.subset_nodes(idx)))
                    }
                }
                1 => Geometry::LineSpectrum(Arc::new(LineSpectrum {
                    node_coordinates: s.node_coordinates.clone(),
                    axes: s.axes.subset_frequencies(idx),
                })),
                2 => Geometry::LineSpectrum(Arc::new(LineSpectrum {
                    node_coordinates: s.node_coordinates.clone(),
                    axes: s.axes.subset_directions(idx),
                })),
                _ => Geometry::Undefined,
            },
            Geometry::AreaSpectrum(s) => match spatial_axis {
                0 => {
                    if single {
                        let c = s.mesh.element_center(idx[0]);
                        Geometry::PointSpectrum(PointSpectrum {
                            x: Some(c[0]),
                            y: Some(c[1]),
                            axes: s.axes.clone(),
                        })
                    } else {
                        let (sub, _) = s.mesh.subset_elements(idx);
                        Geometry::AreaSpectrum(Arc::new(AreaSpectrum {
                            mesh: sub,
                            axes: s.axes.clone(),
                        }))
                    }
                }
                1 => Geometry::AreaSpectrum(Arc::new(AreaSpectrum {
                    mesh: s.mesh.clone(),
                    axes: s.axes.subset_frequencies(idx),
                })),
                2 => Geometry::AreaSpectrum(Arc::new(AreaSpectrum {
                    mesh: s.mesh.clone(),
                    axes: s.axes.subset_directions(idx),
                })),
                _ => Geometry::Undefined,
            },
            _ => Geometry::Undefined,
        }
    }

    /// Label-based spatial lookup.
    ///
    /// Structured 2D grids resolve x/y/area criteria into independent
    /// row/column index lists (`Paired`); all other variants produce one
    /// flat index list over their spatial axis.
    pub fn find_index(&self, q: &SpaceQuery) -> Result<SpatialIndex, FieldError> {
        match self {
            Geometry::Grid1D(g) => {
                if let Some(x) = q.x {
                    Ok(SpatialIndex::Flat(vec![g.nearest_x(x)]))
                } else {
                    Err(FieldError::Unsupported(
                        "Grid1D supports label selection by x only".to_string(),
                    ))
                }
            }
            Geometry::Grid2D(g) => {
                if let Some((x0, y0, x1, y1)) = q.area {
                    return Ok(SpatialIndex::Paired {
                        ii: Some(g.cols_in_range(x0, x1)),
                        jj: Some(g.rows_in_range(y0, y1)),
                    });
                }
                let (x, y) = match q.point() {
                    Some((x, y)) => (Some(x), Some(y)),
                    None => (q.x, q.y),
                };
                if x.is_none() && y.is_none() {
                    return Err(FieldError::Unsupported(
                        "Grid2D label selection needs x, y, coords or area".to_string(),
                    ));
                }
                Ok(SpatialIndex::Paired {
                    ii: x.map(|x| vec![g.nearest_x(x)]),
                    jj: y.map(|y| vec![g.nearest_y(y)]),
                })
            }
            Geometry::Grid3D(_) => Err(FieldError::Unsupported(
                "label selection on Grid3D, use isel instead".to_string(),
            )),
            Geometry::Mesh(m) => {
                if q.layers.is_some() {
                    return Err(FieldError::Unsupported(
                        "layer selection requires a layered mesh".to_string(),
                    ));
                }
                if let Some(area) = q.area {
                    return Ok(SpatialIndex::Flat(m.elements_in_area(area)));
                }
                match q.point() {
                    Some((x, y)) => Ok(SpatialIndex::Flat(vec![m.nearest_element(x, y, None)])),
                    None => Err(FieldError::Unsupported(
                        "mesh label selection needs (x, y), coords or area".to_string(),
                    )),
                }
            }
            Geometry::LayeredMesh(m) => {
                if let Some(layers) = &q.layers {
                    let resolved = match layers {
                        LayerSel::Top => vec![m.resolve_layer(-1)?],
                        LayerSel::Bottom => vec![m.resolve_layer(0)?],
                        LayerSel::Number(l) => vec![m.resolve_layer(*l)?],
                        LayerSel::Numbers(ls) => ls
                            .iter()
                            .map(|&l| m.resolve_layer(l))
                            .collect::<Result<Vec<_>, _>>()?,
                    };
                    return Ok(SpatialIndex::Flat(m.elements_in_layers(&resolved)));
                }
                if let Some(area) = q.area {
                    return Ok(SpatialIndex::Flat(m.mesh.elements_in_area(area)));
                }
                match q.point() {
                    Some((x, y)) => Ok(SpatialIndex::Flat(vec![m.mesh.nearest_element(x, y, q.z)])),
                    None => Err(FieldError::Unsupported(
                        "mesh label selection needs (x, y), coords or area".to_string(),
                    )),
                }
            }
            Geometry::LineSpectrum(s) => match q.point() {
                Some((x, y)) => Ok(SpatialIndex::Flat(vec![s.nearest_node(x, y)])),
                None => Err(FieldError::Unsupported(
                    "line spectrum label selection needs (x, y)".to_string(),
                )),
            },
            Geometry::AreaSpectrum(s) => {
                if let Some(area) = q.area {
                    return Ok(SpatialIndex::Flat(s.mesh.elements_in_area(area)));
                }
                match q.point() {
                    Some((x, y)) => Ok(SpatialIndex::Flat(vec![s.mesh.nearest_element(x, y, None)])),
                    None => Err(FieldError::Unsupported(
                        "area spectrum label selection needs (x, y) or area".to_string(),
                    )),
                }
            }
            _ => Err(FieldError::Unsupported(
                "label-based spatial selection is not available for this geometry".to_string(),
            )),
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Geometry::Undefined => write!(f, "GeometryUndefined"),
            Geometry::Point2D { x, y } => write!(f, "Point2D (x={}, y={})", x, y),
            Geometry::Point3D { x, y, z } => write!(f, "Point3D (x={}, y={}, z={})", x, y, z),
            Geometry::Grid1D(g) => g.fmt(f),
            Geometry::Grid2D(g) => g.fmt(f),
            Geometry::Grid3D(g) => g.fmt(f),
            Geometry::Mesh(m) => m.fmt(f),
            Geometry::LayeredMesh(m) => m.fmt(f),
            Geometry::PointSpectrum(s) => s.fmt(f),
            Geometry::LineSpectrum(s) => s.fmt(f),
            Geometry::AreaSpectrum(s) => s.fmt(f),
        }
    }
}
