use hydrofield::{
    DataArray, FieldError, Geometry, Grid1D, ItemInfo, MathOp, Operand, Quantity, TimeAxis, Unit,
};
use ndarray::{ArrayD, IxDyn};

fn hourly(n: usize) -> TimeAxis {
    let start = TimeAxis::parse_datetime("2018-01-01 00:00:00").unwrap();
    TimeAxis::equidistant(start, 3600.0, n).unwrap()
}

fn water_level(values: Vec<f64>) -> DataArray<f64> {
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 3]), values).unwrap();
    let geometry = Geometry::Grid1D(Grid1D::new(0.0, 100.0, 3));
    let item = ItemInfo::with_quantity("wl", Quantity::WaterLevel);
    DataArray::new(data, hourly(2), Some(item), geometry, None, None).unwrap()
}

#[test]
fn test_scalar_ops_keep_item() {
    let da = water_level((0..6).map(|v| v as f64).collect());
    let shifted = &da + 1.5;
    assert_eq!(shifted.values()[[0, 0]], 1.5);
    assert_eq!(shifted.item().quantity, Quantity::WaterLevel);
    assert_eq!(shifted.item().unit, Unit::Meter);
    assert_eq!(shifted.name(), "wl");
    // dims, geometry and time are preserved verbatim
    assert_eq!(shifted.dims(), da.dims());
    assert_eq!(shifted.geometry(), da.geometry());
}

#[test]
fn test_scenario_d_self_subtraction_preserves_unit() {
    let da = water_level((0..6).map(|v| v as f64).collect());
    let diff = &da - &da;
    assert_eq!(diff.values()[[1, 2]], 0.0);
    assert_eq!(diff.item().quantity, Quantity::WaterLevel);
    assert_eq!(diff.item().unit, Unit::Meter);
}

#[test]
fn test_scenario_d_mixed_units_downgrade_item() {
    let a = water_level((0..6).map(|v| v as f64).collect());
    let data = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0; 6]).unwrap();
    let item = ItemInfo::checked("wl_mm", Quantity::WaterLevel, Unit::Millimeter).unwrap();
    let b = DataArray::new(
        data,
        hourly(2),
        Some(item),
        Geometry::Grid1D(Grid1D::new(0.0, 100.0, 3)),
        None,
        None,
    )
    .unwrap();

    let diff = &a - &b;
    assert_eq!(diff.item().quantity, Quantity::Undefined);
    assert_eq!(diff.name(), "wl - wl_mm");
}

#[test]
fn test_addition_of_two_arrays_downgrades_item() {
    let da = water_level((0..6).map(|v| v as f64).collect());
    let sum = &da + &da;
    assert_eq!(sum.values()[[0, 2]], 4.0);
    assert_eq!(sum.item().quantity, Quantity::Undefined);
    assert_eq!(sum.name(), "wl + wl");
}

#[test]
fn test_raw_array_operand() {
    let da = water_level((0..6).map(|v| v as f64).collect());
    let ones = ArrayD::from_elem(IxDyn(&[2, 3]), 1.0);
    let out = da.try_op(Operand::Array(&ones), MathOp::Add).unwrap();
    assert_eq!(out.values()[[0, 0]], 1.0);
    assert_eq!(out.name(), "wl + array");
}

#[test]
fn test_broadcast_right_operand() {
    let da = water_level((0..6).map(|v| v as f64).collect());
    // a (3,) row broadcast over the (2, 3) buffer
    let row = ArrayD::from_shape_vec(IxDyn(&[3]), vec![10.0, 20.0, 30.0]).unwrap();
    let out = da.try_op(Operand::Array(&row), MathOp::Add).unwrap();
    assert_eq!(out.values()[[0, 0]], 10.0);
    assert_eq!(out.values()[[1, 2]], 35.0);
}

#[test]
fn test_incompatible_shapes_fail() {
    let da = water_level((0..6).map(|v| v as f64).collect());
    let bad = ArrayD::from_elem(IxDyn(&[4]), 1.0);
    let err = da.try_op(Operand::Array(&bad), MathOp::Add).unwrap_err();
    assert!(matches!(err, FieldError::MathOperation { .. }));
}

#[test]
fn test_unary_ops() {
    let da = water_level(vec![-1.0, 2.0, -3.0, 4.0, -5.0, 6.0]);
    let neg = -&da;
    assert_eq!(neg.values()[[0, 0]], 1.0);
    assert_eq!(neg.item().quantity, Quantity::WaterLevel);

    let abs = da.abs();
    assert_eq!(abs.values()[[0, 2]], 3.0);
    assert_eq!(abs.item().quantity, Quantity::WaterLevel);
}

#[test]
fn test_pow_floor_div_modulo() {
    let da = water_level(vec![1.0, 2.0, 3.0, 4.0, 5.0, 7.0]);
    let sq = da.pow(2.0).unwrap();
    assert_eq!(sq.values()[[1, 2]], 49.0);

    let halves = da.floor_div(2.0).unwrap();
    assert_eq!(halves.values()[[0, 2]], 1.0);
    assert_eq!(halves.values()[[1, 2]], 3.0);

    let rem = da.modulo(3.0).unwrap();
    assert_eq!(rem.values()[[1, 0]], 1.0);
    assert_eq!(rem.values()[[1, 2]], 1.0);
}

#[test]
fn test_modulo_sign_follows_divisor() {
    let da = water_level(vec![-1.0, -4.0, 5.0, -1.0, -4.0, 5.0]);
    let rem = da.modulo(3.0).unwrap();
    assert_eq!(rem.values()[[0, 0]], 2.0);
    assert_eq!(rem.values()[[0, 1]], 2.0);
    assert_eq!(rem.values()[[0, 2]], 2.0);
}

#[test]
fn test_reflected_scalar_ops() {
    let da = water_level((0..6).map(|v| v as f64).collect());
    let a = 10.0 - &da;
    assert_eq!(a.values()[[0, 2]], 8.0);
    let b = 2.0 * &da;
    assert_eq!(b.values()[[1, 0]], 6.0);
    let c = 1.0 + &da;
    assert_eq!(c.values()[[0, 0]], 1.0);
}

#[test]
fn test_comparison_closure() {
    let da = water_level((0..6).map(|v| v as f64).collect());
    let mask = da.ge(3.0).unwrap();
    assert_eq!(mask.dims(), da.dims());
    assert_eq!(mask.shape(), da.shape());
    assert_eq!(mask.geometry(), da.geometry());
    assert_eq!(mask.name(), "Boolean");
    assert!(!mask.values()[[0, 0]]);
    assert!(mask.values()[[1, 0]]);
}

#[test]
fn test_comparison_against_other_array() {
    let a = water_level(vec![1.0, 5.0, 3.0, 2.0, 2.0, 2.0]);
    let b = water_level(vec![2.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
    let mask = a.gt(&b).unwrap();
    let truths: Vec<bool> = mask.values().iter().copied().collect();
    assert_eq!(truths, vec![false, true, true, false, false, false]);

    let eq = a.eq_mask(&b).unwrap();
    let truths: Vec<bool> = eq.values().iter().copied().collect();
    assert_eq!(truths, vec![false, false, false, true, true, true]);
}

#[test]
fn test_nan_comparisons_are_false_except_ne() {
    let a = water_level(vec![f64::NAN, 1.0, 1.0, 1.0, 1.0, 1.0]);
    let lt = a.lt(2.0).unwrap();
    assert!(!lt.values()[[0, 0]]);
    let ne = a.ne_mask(2.0).unwrap();
    assert!(ne.values()[[0, 0]]);
}

#[test]
fn test_values_equal_predicate() {
    let a = water_level((0..6).map(|v| v as f64).collect());
    let b = a.clone();
    assert!(a.values_equal(&b));
    let c = &a + 1.0;
    assert!(!a.values_equal(&c));
}
