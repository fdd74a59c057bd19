use std::sync::Arc;

use hydrofield::{
    DataArray, Dim, FieldError, FlexibleMesh, Geometry, Grid1D, Grid2D, InterpMethod, TimeAxis,
    TimeInterpOptions,
};
use ndarray::{ArrayD, IxDyn};

fn hourly(n: usize) -> TimeAxis {
    let start = TimeAxis::parse_datetime("2018-01-01 00:00:00").unwrap();
    TimeAxis::equidistant(start, 3600.0, n).unwrap()
}

#[test]
fn test_interp_time_to_new_axis_linear_midpoint() {
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![0.0, 10.0, 4.0, 30.0]).unwrap();
    let da = DataArray::without_geometry(data, hourly(2)).unwrap();

    let start = TimeAxis::parse_datetime("2018-01-01 00:30:00").unwrap();
    let target = TimeAxis::equidistant(start, 3600.0, 1).unwrap();
    let mid = da.interp_time(&target).unwrap();
    assert_eq!(mid.n_timesteps(), 1);
    assert_eq!(mid.values()[[0, 0]], 2.0);
    assert_eq!(mid.values()[[0, 1]], 20.0);
}

#[test]
fn test_interp_time_by_step_refines_axis() {
    let data = ArrayD::from_shape_vec(IxDyn(&[3, 1]), vec![0.0, 2.0, 4.0]).unwrap();
    let da = DataArray::without_geometry(data, hourly(3)).unwrap();

    let halfhour = da.interp_time(1800.0).unwrap();
    assert_eq!(halfhour.n_timesteps(), 5);
    assert_eq!(halfhour.timestep(), Some(1800.0));
    let got: Vec<f64> = halfhour.values().iter().copied().collect();
    let expected = [0.0, 1.0, 2.0, 3.0, 4.0];
    for (a, b) in got.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn test_interp_time_outside_range_fills() {
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 1]), vec![1.0, 2.0]).unwrap();
    let da = DataArray::without_geometry(data, hourly(2)).unwrap();

    let start = TimeAxis::parse_datetime("2018-01-01 05:00:00").unwrap();
    let target = TimeAxis::equidistant(start, 3600.0, 1).unwrap();

    let filled = da.interp_time(&target).unwrap();
    assert!(filled.values()[[0, 0]].is_nan());

    let strict = TimeInterpOptions {
        extrapolate: false,
        ..Default::default()
    };
    assert!(matches!(
        da.interp_time_with(&target, strict),
        Err(FieldError::OutsideTimeRange(_))
    ));
}

#[test]
fn test_interp_time_nearest() {
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 1]), vec![0.0, 10.0]).unwrap();
    let da = DataArray::without_geometry(data, hourly(2)).unwrap();

    let start = TimeAxis::parse_datetime("2018-01-01 00:10:00").unwrap();
    let target = TimeAxis::equidistant(start, 3600.0, 1).unwrap();
    let opts = TimeInterpOptions {
        method: InterpMethod::Nearest,
        ..Default::default()
    };
    let near = da.interp_time_with(&target, opts).unwrap();
    assert_eq!(near.values()[[0, 0]], 0.0);
}

#[test]
fn test_interp_x_on_grid1d() {
    // f(x) = x / 100
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]).unwrap();
    let geometry = Geometry::Grid1D(Grid1D::new(0.0, 100.0, 3));
    let da = DataArray::new(data, hourly(2), None, geometry, None, None).unwrap();

    let at = da.interp_x(150.0).unwrap();
    assert_eq!(at.dims(), &[Dim::Time]);
    assert!((at.values()[[0]] - 1.5).abs() < 1e-12);
    assert!(at.geometry().is_undefined());
}

#[test]
fn test_interp_xy_bilinear_exact_on_plane() {
    // f(x, y) = 2x + 3y + 1, sampled on a 3x4 grid; bilinear interpolation
    // reproduces an affine field exactly
    let g = Grid2D::new(0.0, 1.0, 4, 10.0, 2.0, 3);
    let mut data = ArrayD::zeros(IxDyn(&[1, 3, 4]));
    for (j, y) in g.y().iter().enumerate() {
        for (i, x) in g.x().iter().enumerate() {
            data[[0, j, i]] = 2.0 * x + 3.0 * y + 1.0;
        }
    }
    let da = DataArray::new(data, hourly(1), None, Geometry::Grid2D(g), None, None).unwrap();

    let at = da.interp_xy(1.7, 12.3, 3).unwrap();
    assert_eq!(at.dims(), &[Dim::Time]);
    let expected = 2.0 * 1.7 + 3.0 * 12.3 + 1.0;
    assert!((at.values()[[0]] - expected).abs() < 1e-9);
    assert!(matches!(at.geometry(), Geometry::Point2D { .. }));
}

fn quad_mesh() -> FlexibleMesh {
    // four unit squares in a 2x2 block, element centers at
    // (0.5,0.5), (1.5,0.5), (0.5,1.5), (1.5,1.5)
    let nodes: Vec<[f64; 3]> = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
        [2.0, 1.0, 0.0],
        [0.0, 2.0, 0.0],
        [1.0, 2.0, 0.0],
        [2.0, 2.0, 0.0],
    ];
    let elements = vec![
        vec![0, 1, 4, 3],
        vec![1, 2, 5, 4],
        vec![3, 4, 7, 6],
        vec![4, 5, 8, 7],
    ];
    FlexibleMesh::new(nodes, elements)
}

#[test]
fn test_interp_xy_idw_exact_at_element_center() {
    let geometry = Geometry::Mesh(Arc::new(quad_mesh()));
    let data = ArrayD::from_shape_vec(
        IxDyn(&[2, 4]),
        vec![1.0, 2.0, 3.0, 4.0, 10.0, 20.0, 30.0, 40.0],
    )
    .unwrap();
    let da = DataArray::new(data, hourly(2), None, geometry, None, None).unwrap();

    let at = da.interp_xy(1.5, 0.5, 3).unwrap();
    assert_eq!(at.dims(), &[Dim::Time]);
    assert!((at.values()[[0]] - 2.0).abs() < 1e-12);
    assert!((at.values()[[1]] - 20.0).abs() < 1e-12);
}

#[test]
fn test_interp_like_mesh_to_grid() {
    let geometry = Geometry::Mesh(Arc::new(quad_mesh()));
    let data = ArrayD::from_shape_vec(IxDyn(&[1, 4]), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let src = DataArray::new(data, hourly(1), None, geometry, None, None).unwrap();

    // 2x2 grid whose cells sit exactly on the element centers
    let grid = Grid2D::new(0.5, 1.0, 2, 0.5, 1.0, 2);
    let target = DataArray::new(
        ArrayD::zeros(IxDyn(&[1, 2, 2])),
        hourly(1),
        None,
        Geometry::Grid2D(grid),
        None,
        None,
    )
    .unwrap();

    let out = src.interp_like(&target).unwrap();
    assert_eq!(out.dims(), &[Dim::Time, Dim::Y, Dim::X]);
    assert_eq!(out.shape(), &[1, 2, 2]);
    assert!((out.values()[[0, 0, 0]] - 1.0).abs() < 1e-12);
    assert!((out.values()[[0, 0, 1]] - 2.0).abs() < 1e-12);
    assert!((out.values()[[0, 1, 0]] - 3.0).abs() < 1e-12);
    assert!((out.values()[[0, 1, 1]] - 4.0).abs() < 1e-12);
}

#[test]
fn test_interp_like_requires_mesh_source() {
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 3]), (0..6).map(|v| v as f64).collect()).unwrap();
    let geometry = Geometry::Grid1D(Grid1D::new(0.0, 1.0, 3));
    let da = DataArray::new(data, hourly(2), None, geometry, None, None).unwrap();
    let err = da.interp_like(&da.clone()).unwrap_err();
    assert!(matches!(err, FieldError::Unsupported(_)));
}

#[test]
fn test_dropna_removes_all_nan_steps() {
    let mut data = ArrayD::from_elem(IxDyn(&[3, 2]), 1.0);
    data[[1, 0]] = f64::NAN;
    data[[1, 1]] = f64::NAN;
    let da = DataArray::without_geometry(data, hourly(3)).unwrap();
    let cleaned = da.dropna().unwrap().unwrap();
    assert_eq!(cleaned.n_timesteps(), 2);
    assert_eq!(cleaned.shape(), &[2, 2]);
}
