//! Export adapter: a generic coordinate-labeled structure that external
//! consumers (serializers, file writers) can take apart without knowing the
//! geometry variants.

use serde::Serialize;

use crate::dims::Dim;
use crate::geometry::Geometry;

use super::DataArray;

/// Per-dimension coordinate vector
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CoordValues {
    /// RFC 3339 timestamps
    Times(Vec<String>),
    Floats(Vec<f64>),
    Ints(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinate {
    pub dim: String,
    pub values: CoordValues,
}

/// Item attributes carried along on export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportAttrs {
    pub name: String,
    pub quantity: String,
    pub unit: String,
}

/// Dimension-labeled export structure: names, shape, row-major values,
/// per-geometry coordinate vectors and item attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateArray {
    pub name: String,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
    pub coords: Vec<Coordinate>,
    pub attrs: ExportAttrs,
}

impl DataArray<f64> {
    /// Convert to the generic coordinate-labeled structure
    pub fn to_coords(&self) -> CoordinateArray {
        let mut coords = Vec::new();

        if self.has_time_axis() {
            coords.push(Coordinate {
                dim: Dim::Time.name().to_string(),
                values: CoordValues::Times(
                    self.time()
                        .as_slice()
                        .iter()
                        .map(|t| t.to_rfc3339())
                        .collect(),
                ),
            });
        }

        match self.geometry() {
            Geometry::Grid1D(g) => {
                coords.push(float_coord(Dim::X, g.x()));
            }
            Geometry::Grid2D(g) => {
                coords.push(float_coord(Dim::Y, g.y()));
                coords.push(float_coord(Dim::X, g.x()));
            }
            Geometry::Grid3D(g) => {
                coords.push(float_coord(Dim::Z, g.z()));
                coords.push(float_coord(Dim::Y, g.y()));
                coords.push(float_coord(Dim::X, g.x()));
            }
            Geometry::Mesh(m) => {
                coords.push(int_coord(Dim::Element, m.n_elements()));
            }
            Geometry::LayeredMesh(m) => {
                coords.push(int_coord(Dim::Element, m.n_elements()));
            }
            Geometry::PointSpectrum(s) => {
                coords.push(float_coord(Dim::Frequency, s.axes.frequencies.clone()));
                coords.push(float_coord(Dim::Direction, s.axes.directions.clone()));
            }
            Geometry::LineSpectrum(s) => {
                coords.push(int_coord(Dim::Node, s.n_nodes()));
                coords.push(float_coord(Dim::Frequency, s.axes.frequencies.clone()));
                coords.push(float_coord(Dim::Direction, s.axes.directions.clone()));
            }
            Geometry::AreaSpectrum(s) => {
                coords.push(int_coord(Dim::Element, s.n_elements()));
                coords.push(float_coord(Dim::Frequency, s.axes.frequencies.clone()));
                coords.push(float_coord(Dim::Direction, s.axes.directions.clone()));
            }
            _ => {}
        }

        // keep only coordinates whose dimension actually appears
        coords.retain(|c| self.dims().iter().any(|d| d.name() == c.dim));

        CoordinateArray {
            name: self.name().to_string(),
            dims: self.dims().iter().map(|d| d.name().to_string()).collect(),
            shape: self.shape().to_vec(),
            values: self.values().iter().copied().collect(),
            coords,
            attrs: ExportAttrs {
                name: self.name().to_string(),
                quantity: self.item().quantity.to_string(),
                unit: self.item().unit.to_string(),
            },
        }
    }
}

fn float_coord(dim: Dim, values: Vec<f64>) -> Coordinate {
    Coordinate {
        dim: dim.name().to_string(),
        values: CoordValues::Floats(values),
    }
}

fn int_coord(dim: Dim, n: usize) -> Coordinate {
    Coordinate {
        dim: dim.name().to_string(),
        values: CoordValues::Ints((0..n as i64).collect()),
    }
}
