use std::fmt;

use serde::Serialize;

/// Equidistant 1D grid axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grid1D {
    pub x0: f64,
    pub dx: f64,
    pub nx: usize,
}

impl Grid1D {
    pub fn new(x0: f64, dx: f64, nx: usize) -> Self {
        Self { x0, dx, nx }
    }

    /// Grid point coordinates
    pub fn x(&self) -> Vec<f64> {
        (0..self.nx).map(|i| self.x0 + i as f64 * self.dx).collect()
    }

    /// Index of the grid point nearest to `x` (clamped to the axis)
    pub fn nearest_x(&self, x: f64) -> usize {
        nearest_on_axis(self.x0, self.dx, self.nx, x)
    }

    /// Subset along the axis; stays a grid only for uniform-stride indices
    pub fn subset(&self, idx: &[usize]) -> Option<Grid1D> {
        let (x0, dx, nx) = uniform_subset(self.x0, self.dx, idx)?;
        Some(Grid1D { x0, dx, nx })
    }
}

impl fmt::Display for Grid1D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid1D (n={}, dx={})", self.nx, self.dx)
    }
}

/// Equidistant 2D grid; data axes are ordered (y, x)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid2D {
    pub x0: f64,
    pub dx: f64,
    pub nx: usize,
    pub y0: f64,
    pub dy: f64,
    pub ny: usize,
    pub projection: String,
}

impl Grid2D {
    pub fn new(x0: f64, dx: f64, nx: usize, y0: f64, dy: f64, ny: usize) -> Self {
        Self {
            x0,
            dx,
            nx,
            y0,
            dy,
            ny,
            projection: "LONG/LAT".to_string(),
        }
    }

    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = projection.into();
        self
    }

    pub fn x(&self) -> Vec<f64> {
        (0..self.nx).map(|i| self.x0 + i as f64 * self.dx).collect()
    }

    pub fn y(&self) -> Vec<f64> {
        (0..self.ny).map(|j| self.y0 + j as f64 * self.dy).collect()
    }

    pub fn nearest_x(&self, x: f64) -> usize {
        nearest_on_axis(self.x0, self.dx, self.nx, x)
    }

    pub fn nearest_y(&self, y: f64) -> usize {
        nearest_on_axis(self.y0, self.dy, self.ny, y)
    }

    /// Column indices whose x coordinate falls inside [x_lo, x_hi]
    pub fn cols_in_range(&self, x_lo: f64, x_hi: f64) -> Vec<usize> {
        self.x()
            .iter()
            .enumerate()
            .filter(|(_, x)| **x >= x_lo && **x <= x_hi)
            .map(|(i, _)| i)
            .collect()
    }

    /// Row indices whose y coordinate falls inside [y_lo, y_hi]
    pub fn rows_in_range(&self, y_lo: f64, y_hi: f64) -> Vec<usize> {
        self.y()
            .iter()
            .enumerate()
            .filter(|(_, y)| **y >= y_lo && **y <= y_hi)
            .map(|(j, _)| j)
            .collect()
    }

    /// Subset along a spatial axis (0 = y, 1 = x)
    pub fn subset(&self, idx: &[usize], axis: usize) -> Option<Grid2D> {
        let mut g = self.clone();
        if axis == 0 {
            let (y0, dy, ny) = uniform_subset(self.y0, self.dy, idx)?;
            g.y0 = y0;
            g.dy = dy;
            g.ny = ny;
        } else {
            let (x0, dx, nx) = uniform_subset(self.x0, self.dx, idx)?;
            g.x0 = x0;
            g.dx = dx;
            g.nx = nx;
        }
        Some(g)
    }

    /// The x axis as a standalone Grid1D (after collapsing y)
    pub fn x_axis(&self) -> Grid1D {
        Grid1D::new(self.x0, self.dx, self.nx)
    }

    /// The y axis as a standalone Grid1D (after collapsing x)
    pub fn y_axis(&self) -> Grid1D {
        Grid1D::new(self.y0, self.dy, self.ny)
    }
}

impl fmt::Display for Grid2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid2D (ny={}, nx={})", self.ny, self.nx)
    }
}

/// Equidistant 3D grid; data axes are ordered (z, y, x)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid3D {
    pub x0: f64,
    pub dx: f64,
    pub nx: usize,
    pub y0: f64,
    pub dy: f64,
    pub ny: usize,
    pub z0: f64,
    pub dz: f64,
    pub nz: usize,
    pub projection: String,
}

impl Grid3D {
    pub fn new(
        x0: f64,
        dx: f64,
        nx: usize,
        y0: f64,
        dy: f64,
        ny: usize,
        z0: f64,
        dz: f64,
        nz: usize,
    ) -> Self {
        Self {
            x0,
            dx,
            nx,
            y0,
            dy,
            ny,
            z0,
            dz,
            nz,
            projection: "LONG/LAT".to_string(),
        }
    }

    pub fn x(&self) -> Vec<f64> {
        (0..self.nx).map(|i| self.x0 + i as f64 * self.dx).collect()
    }

    pub fn y(&self) -> Vec<f64> {
        (0..self.ny).map(|j| self.y0 + j as f64 * self.dy).collect()
    }

    pub fn z(&self) -> Vec<f64> {
        (0..self.nz).map(|k| self.z0 + k as f64 * self.dz).collect()
    }

    /// The horizontal plane as a Grid2D (after collapsing z)
    pub fn horizontal(&self) -> Grid2D {
        Grid2D {
            x0: self.x0,
            dx: self.dx,
            nx: self.nx,
            y0: self.y0,
            dy: self.dy,
            ny: self.ny,
            projection: self.projection.clone(),
        }
    }

    /// Subset along a spatial axis (0 = z, 1 = y, 2 = x)
    pub fn subset(&self, idx: &[usize], axis: usize) -> Option<Grid3D> {
        let mut g = self.clone();
        match axis {
            0 => {
                let (z0, dz, nz) = uniform_subset(self.z0, self.dz, idx)?;
                g.z0 = z0;
                g.dz = dz;
                g.nz = nz;
            }
            1 => {
                let (y0, dy, ny) = uniform_subset(self.y0, self.dy, idx)?;
                g.y0 = y0;
                g.dy = dy;
                g.ny = ny;
            }
            _ => {
                let (x0, dx, nx) = uniform_subset(self.x0, self.dx, idx)?;
                g.x0 = x0;
                g.dx = dx;
                g.nx = nx;
            }
        }
        Some(g)
    }
}

impl fmt::Display for Grid3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid3D (nz={}, ny={}, nx={})", self.nz, self.ny, self.nx)
    }
}

/// Nearest index on an equidistant axis, clamped to [0, n)
fn nearest_on_axis(origin: f64, step: f64, n: usize, value: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let i = ((value - origin) / step).round();
    if i < 0.0 {
        0
    } else if i as usize >= n {
        n - 1
    } else {
        i as usize
    }
}

/// Recompute (origin, step, n) for an index subset that keeps a uniform
/// stride; anything else loses the grid structure.
fn uniform_subset(origin: f64, step: f64, idx: &[usize]) -> Option<(f64, f64, usize)> {
    if idx.is_empty() {
        return None;
    }
    if idx.len() == 1 {
        return Some((origin + idx[0] as f64 * step, step, 1));
    }
    if idx[1] <= idx[0] {
        return None;
    }
    let stride = idx[1] - idx[0];
    for w in idx.windows(2) {
        if w[1] <= w[0] || w[1] - w[0] != stride {
            return None;
        }
    }
    Some((
        origin + idx[0] as f64 * step,
        step * stride as f64,
        idx.len(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_clamps() {
        let g = Grid1D::new(0.0, 100.0, 3);
        assert_eq!(g.nearest_x(-50.0), 0);
        assert_eq!(g.nearest_x(120.0), 1);
        assert_eq!(g.nearest_x(1e6), 2);
    }

    #[test]
    fn test_uniform_subset_keeps_grid() {
        let g = Grid1D::new(10.0, 2.0, 10);
        let sub = g.subset(&[2, 4, 6]).unwrap();
        assert_eq!(sub.x0, 14.0);
        assert_eq!(sub.dx, 4.0);
        assert_eq!(sub.nx, 3);
    }

    #[test]
    fn test_non_uniform_subset_loses_grid() {
        let g = Grid1D::new(0.0, 1.0, 10);
        assert!(g.subset(&[0, 1, 3]).is_none());
        assert!(g.subset(&[3, 1, 0]).is_none());
    }

    #[test]
    fn test_grid2d_ranges() {
        let g = Grid2D::new(0.0, 1.0, 5, 50.0, 2.0, 4);
        assert_eq!(g.cols_in_range(1.5, 3.5), vec![2, 3]);
        assert_eq!(g.rows_in_range(50.0, 54.0), vec![0, 1, 2]);
    }
}
