use hydrofield::{
    AxisSpec, DataArray, Dim, FieldError, Geometry, Grid2D, ItemInfo, Quantity, TimeAxis,
};
use ndarray::{ArrayD, IxDyn};

fn hourly(n: usize) -> TimeAxis {
    let start = TimeAxis::parse_datetime("2018-01-01 00:00:00").unwrap();
    TimeAxis::equidistant(start, 3600.0, n).unwrap()
}

fn grid2d_array() -> DataArray<f64> {
    // dims (time:2, y:2, x:3)
    let data = ArrayD::from_shape_vec(
        IxDyn(&[2, 2, 3]),
        (0..12).map(|v| v as f64).collect(),
    )
    .unwrap();
    let geometry = Geometry::Grid2D(Grid2D::new(0.0, 1.0, 3, 0.0, 1.0, 2));
    let item = ItemInfo::with_quantity("wl", Quantity::WaterLevel);
    DataArray::new(data, hourly(2), Some(item), geometry, None, None).unwrap()
}

#[test]
fn test_aggregation_shape_law() {
    let da = grid2d_array();
    assert_eq!(da.mean(AxisSpec::Time).unwrap().dims().len(), da.dims().len() - 1);
    assert_eq!(da.mean(Dim::X).unwrap().dims().len(), da.dims().len() - 1);
    assert_eq!(da.mean(AxisSpec::Space).unwrap().dims().len(), da.dims().len() - 2);
}

#[test]
fn test_time_reduction_keeps_geometry_and_collapses_time() {
    let da = grid2d_array();
    let mean = da.mean(AxisSpec::Time).unwrap();
    assert_eq!(mean.dims(), &[Dim::Y, Dim::X]);
    assert_eq!(mean.n_timesteps(), 1);
    assert_eq!(mean.start_time(), da.start_time());
    assert!(matches!(mean.geometry(), Geometry::Grid2D(_)));
    // mean of v and v+6 is v+3
    assert_eq!(mean.values()[[0, 0]], 3.0);
    assert_eq!(mean.values()[[1, 2]], 8.0);
    // item survives aggregation
    assert_eq!(mean.item().quantity, Quantity::WaterLevel);
}

#[test]
fn test_space_reduction_drops_geometry() {
    let da = grid2d_array();
    let mean = da.mean(AxisSpec::Space).unwrap();
    assert_eq!(mean.dims(), &[Dim::Time]);
    assert!(mean.geometry().is_undefined());
    assert_eq!(mean.values().as_slice().unwrap(), &[2.5, 8.5]);
}

#[test]
fn test_space_std_is_joint_not_folded() {
    let da = grid2d_array();
    let std = da.std(AxisSpec::Space).unwrap();
    // std of [0..6) is sqrt(35/12)
    let expected = (35.0f64 / 12.0).sqrt();
    assert!((std.values()[[0]] - expected).abs() < 1e-12);
    assert!((std.values()[[1]] - expected).abs() < 1e-12);
}

#[test]
fn test_max_min_ptp() {
    let da = grid2d_array();
    let max = da.max(AxisSpec::Time).unwrap();
    let min = da.min(AxisSpec::Time).unwrap();
    let ptp = da.ptp(AxisSpec::Time).unwrap();
    assert_eq!(max.values()[[0, 0]], 6.0);
    assert_eq!(min.values()[[0, 0]], 0.0);
    assert_eq!(ptp.values()[[0, 0]], 6.0);
}

#[test]
fn test_nan_reductions_skip_nan() {
    let mut data = ArrayD::from_elem(IxDyn(&[3, 2]), 1.0);
    data[[1, 0]] = f64::NAN;
    data[[2, 0]] = 3.0;
    let da = DataArray::without_geometry(data, hourly(3)).unwrap();

    let mean = da.mean(AxisSpec::Time).unwrap();
    assert!(mean.values()[[0]].is_nan());

    let nanmean = da.nanmean(AxisSpec::Time).unwrap();
    assert_eq!(nanmean.values()[[0]], 2.0);
    assert_eq!(nanmean.values()[[1]], 1.0);
}

#[test]
fn test_quantile_extremes_match_min_max() {
    let da = grid2d_array();
    let q0 = da.quantile(0.0, AxisSpec::Time).unwrap();
    let q1 = da.quantile(1.0, AxisSpec::Time).unwrap();
    let min = da.min(AxisSpec::Time).unwrap();
    let max = da.max(AxisSpec::Time).unwrap();
    for ((a, b), (c, d)) in q0
        .values()
        .iter()
        .zip(min.values().iter())
        .zip(q1.values().iter().zip(max.values().iter()))
    {
        assert!((a - b).abs() < 1e-12);
        assert!((c - d).abs() < 1e-12);
    }
}

#[test]
fn test_quantile_rejects_bad_level() {
    let da = grid2d_array();
    assert!(matches!(
        da.quantile(1.5, AxisSpec::Time),
        Err(FieldError::InvalidQuantile(_))
    ));
}

#[test]
fn test_quantile_sequence_builds_renamed_dataset() {
    let da = grid2d_array();
    let ds = da.quantiles(&[0.25, 0.75], AxisSpec::Time).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.names(), vec!["Quantile 0.25, wl", "Quantile 0.75, wl"]);
    assert_eq!(ds[0].dims(), &[Dim::Y, Dim::X]);
}

#[test]
fn test_average_with_weights() {
    let da = grid2d_array();
    // weight only the second time step
    let avg = da.average(&[0.0, 1.0], AxisSpec::Time).unwrap();
    assert_eq!(avg.values()[[0, 0]], 6.0);

    // wrong weight length is an error
    assert!(da.average(&[1.0, 2.0, 3.0], AxisSpec::Time).is_err());
}

#[test]
fn test_space_average_weights_flatten_row_major() {
    let da = grid2d_array();
    let mut weights = vec![0.0; 6];
    weights[5] = 1.0; // (y=1, x=2)
    let avg = da.average(&weights, AxisSpec::Space).unwrap();
    assert_eq!(avg.values().as_slice().unwrap(), &[5.0, 11.0]);
}

#[test]
fn test_aggregate_with_custom_function_and_name() {
    let da = grid2d_array();
    let total = da
        .aggregate_named(AxisSpec::Time, |lane| lane.iter().sum(), Some("wl sum"))
        .unwrap();
    assert_eq!(total.name(), "wl sum");
    assert_eq!(total.values()[[0, 0]], 6.0);
}

#[test]
fn test_aggregate_over_position() {
    let da = grid2d_array();
    let by_pos = da.aggregate(2usize, |lane| lane.iter().fold(f64::MIN, |a, &b| a.max(b))).unwrap();
    assert_eq!(by_pos.dims(), &[Dim::Time, Dim::Y]);
    assert_eq!(by_pos.values()[[0, 0]], 2.0);
    assert!(by_pos.geometry().is_undefined());
}
