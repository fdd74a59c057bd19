use std::collections::HashMap;
use std::fmt;

use crate::error::FieldError;

/// Unstructured flexible mesh: node coordinates plus an element/node table.
///
/// Only the narrow capability surface needed by labeled arrays lives here:
/// counts, index subsetting, nearest/containment lookup and node tables.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexibleMesh {
    pub node_coordinates: Vec<[f64; 3]>,
    pub element_table: Vec<Vec<usize>>,
    pub projection: String,
}

impl FlexibleMesh {
    pub fn new(node_coordinates: Vec<[f64; 3]>, element_table: Vec<Vec<usize>>) -> Self {
        Self {
            node_coordinates,
            element_table,
            projection: "LONG/LAT".to_string(),
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.node_coordinates.len()
    }

    pub fn n_elements(&self) -> usize {
        self.element_table.len()
    }

    /// Element center as mean of its node coordinates
    pub fn element_center(&self, element: usize) -> [f64; 3] {
        let nodes = &self.element_table[element];
        let mut c = [0.0; 3];
        for &n in nodes {
            let p = self.node_coordinates[n];
            c[0] += p[0];
            c[1] += p[1];
            c[2] += p[2];
        }
        let k = nodes.len().max(1) as f64;
        [c[0] / k, c[1] / k, c[2] / k]
    }

    /// Centers of all elements
    pub fn element_centers(&self) -> Vec<[f64; 3]> {
        (0..self.n_elements()).map(|e| self.element_center(e)).collect()
    }

    /// Sorted unique node ids referenced by the given elements
    pub fn nodes_for_elements(&self, elements: &[usize]) -> Vec<usize> {
        let mut node_ids: Vec<usize> = elements
            .iter()
            .flat_map(|&e| self.element_table[e].iter().copied())
            .collect();
        node_ids.sort_unstable();
        node_ids.dedup();
        node_ids
    }

    /// Subset to the given elements; the surviving nodes are re-keyed.
    ///
    /// Returns the new mesh and the ids (in the original mesh) of the nodes
    /// it references, in the order they appear in the new node table.
    pub fn subset_elements(&self, elements: &[usize]) -> (FlexibleMesh, Vec<usize>) {
        let node_ids = self.nodes_for_elements(elements);
        let remap: HashMap<usize, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new))
            .collect();
        let element_table = elements
            .iter()
            .map(|&e| self.element_table[e].iter().map(|n| remap[n]).collect())
            .collect();
        let node_coordinates = node_ids
            .iter()
            .map(|&n| self.node_coordinates[n])
            .collect();
        let mesh = FlexibleMesh {
            node_coordinates,
            element_table,
            projection: self.projection.clone(),
        };
        (mesh, node_ids)
    }

    /// Element whose center is nearest to the given point (2D, or 3D when z
    /// is given)
    pub fn nearest_element(&self, x: f64, y: f64, z: Option<f64>) -> usize {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (e, c) in self.element_centers().iter().enumerate() {
            let mut d = (c[0] - x).powi(2) + (c[1] - y).powi(2);
            if let Some(z) = z {
                d += (c[2] - z).powi(2);
            }
            if d < best_d {
                best_d = d;
                best = e;
            }
        }
        best
    }

    /// Elements whose center falls inside the bounding box (x0, y0, x1, y1)
    pub fn elements_in_area(&self, area: (f64, f64, f64, f64)) -> Vec<usize> {
        let (x0, y0, x1, y1) = area;
        self.element_centers()
            .iter()
            .enumerate()
            .filter(|(_, c)| c[0] >= x0 && c[0] <= x1 && c[1] >= y0 && c[1] <= y1)
            .map(|(e, _)| e)
            .collect()
    }
}

impl fmt::Display for FlexibleMesh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FlexibleMesh ({} elements, {} nodes)",
            self.n_elements(),
            self.n_nodes()
        )
    }
}

/// Vertically layered flexible mesh (3D); elements carry a layer number,
/// counted from the bottom (0).
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredMesh {
    pub mesh: FlexibleMesh,
    pub n_layers: usize,
    pub element_layers: Vec<usize>,
}

impl LayeredMesh {
    pub fn new(mesh: FlexibleMesh, n_layers: usize, element_layers: Vec<usize>) -> Self {
        Self {
            mesh,
            n_layers,
            element_layers,
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.mesh.n_nodes()
    }

    pub fn n_elements(&self) -> usize {
        self.mesh.n_elements()
    }

    /// Subset to the given elements, re-keying nodes and layer numbers
    pub fn subset_elements(&self, elements: &[usize]) -> (LayeredMesh, Vec<usize>) {
        let (mesh, node_ids) = self.mesh.subset_elements(elements);
        let element_layers = elements.iter().map(|&e| self.element_layers[e]).collect();
        let layered = LayeredMesh {
            mesh,
            n_layers: self.n_layers,
            element_layers,
        };
        (layered, node_ids)
    }

    /// Resolve a layer number; negative counts from the top (-1 = top layer)
    pub fn resolve_layer(&self, layer: i64) -> Result<usize, FieldError> {
        let n = self.n_layers as i64;
        let l = if layer < 0 { layer + n } else { layer };
        if l < 0 || l >= n {
            Err(FieldError::IndexOutOfBounds {
                index: layer,
                len: self.n_layers,
            })
        } else {
            Ok(l as usize)
        }
    }

    /// Elements belonging to any of the given layers
    pub fn elements_in_layers(&self, layers: &[usize]) -> Vec<usize> {
        self.element_layers
            .iter()
            .enumerate()
            .filter(|(_, l)| layers.contains(*l))
            .map(|(e, _)| e)
            .collect()
    }
}

impl fmt::Display for LayeredMesh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LayeredMesh ({} elements, {} nodes, {} layers)",
            self.n_elements(),
            self.n_nodes(),
            self.n_layers
        )
    }
}

/// Spectral axes shared by all spectral geometry variants
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralAxes {
    pub frequencies: Vec<f64>,
    pub directions: Vec<f64>,
}

impl SpectralAxes {
    pub fn new(frequencies: Vec<f64>, directions: Vec<f64>) -> Self {
        Self {
            frequencies,
            directions,
        }
    }

    pub fn n_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    pub fn n_directions(&self) -> usize {
        self.directions.len()
    }

    pub fn subset_frequencies(&self, idx: &[usize]) -> SpectralAxes {
        SpectralAxes {
            frequencies: idx.iter().map(|&i| self.frequencies[i]).collect(),
            directions: self.directions.clone(),
        }
    }

    pub fn subset_directions(&self, idx: &[usize]) -> SpectralAxes {
        SpectralAxes {
            frequencies: self.frequencies.clone(),
            directions: idx.iter().map(|&i| self.directions[i]).collect(),
        }
    }
}

/// Wave spectrum at a single point
#[derive(Debug, Clone, PartialEq)]
pub struct PointSpectrum {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub axes: SpectralAxes,
}

impl fmt::Display for PointSpectrum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PointSpectrum (nf={}, nd={})",
            self.axes.n_frequencies(),
            self.axes.n_directions()
        )
    }
}

/// Wave spectra along a line of nodes
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpectrum {
    pub node_coordinates: Vec<[f64; 3]>,
    pub axes: SpectralAxes,
}

impl LineSpectrum {
    pub fn n_nodes(&self) -> usize {
        self.node_coordinates.len()
    }

    pub fn subset_nodes(&self, idx: &[usize]) -> LineSpectrum {
        LineSpectrum {
            node_coordinates: idx.iter().map(|&i| self.node_coordinates[i]).collect(),
            axes: self.axes.clone(),
        }
    }

    pub fn nearest_node(&self, x: f64, y: f64) -> usize {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (n, c) in self.node_coordinates.iter().enumerate() {
            let d = (c[0] - x).powi(2) + (c[1] - y).powi(2);
            if d < best_d {
                best_d = d;
                best = n;
            }
        }
        best
    }
}

impl fmt::Display for LineSpectrum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LineSpectrum ({} nodes, nf={}, nd={})",
            self.n_nodes(),
            self.axes.n_frequencies(),
            self.axes.n_directions()
        )
    }
}

/// Wave spectra over an unstructured element mesh
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSpectrum {
    pub mesh: FlexibleMesh,
    pub axes: SpectralAxes,
}

impl AreaSpectrum {
    pub fn n_elements(&self) -> usize {
        self.mesh.n_elements()
    }
}

impl fmt::Display for AreaSpectrum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "AreaSpectrum ({} elements, nf={}, nd={})",
            self.n_elements(),
            self.axes.n_frequencies(),
            self.axes.n_directions()
        )
    }
}
