//! Elementwise arithmetic and comparison operators.
//!
//! Binary math applies to a scalar, a raw array or another labeled array
//! (metadata of the right operand is ignored except for unit bookkeeping);
//! the result is a value-mutated copy of the left operand. The right operand
//! may broadcast to the left's shape, never the reverse.

use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Sub};

use ndarray::{ArrayD, Zip};
use num_traits::Float;

use crate::error::FieldError;
use crate::item::ItemInfo;

use super::DataArray;

/// Binary elementwise operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Floor division
    FloorDiv,
    /// Modulo with the sign of the divisor
    Rem,
    /// Power
    Pow,
}

impl MathOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Sub => "-",
            MathOp::Mul => "*",
            MathOp::Div => "/",
            MathOp::FloorDiv => "//",
            MathOp::Rem => "%",
            MathOp::Pow => "**",
        }
    }

    fn apply<T: Float>(&self, a: T, b: T) -> T {
        match self {
            MathOp::Add => a + b,
            MathOp::Sub => a - b,
            MathOp::Mul => a * b,
            MathOp::Div => a / b,
            MathOp::FloorDiv => (a / b).floor(),
            MathOp::Rem => a - b * (a / b).floor(),
            MathOp::Pow => a.powf(b),
        }
    }
}

/// Right-hand operand of a binary operation
#[derive(Debug)]
pub enum Operand<'a, T> {
    Scalar(T),
    Array(&'a ArrayD<T>),
    Data(&'a DataArray<T>),
}

impl<'a, T> From<T> for Operand<'a, T> {
    fn from(v: T) -> Self {
        Operand::Scalar(v)
    }
}

impl<'a, T> From<&'a ArrayD<T>> for Operand<'a, T> {
    fn from(a: &'a ArrayD<T>) -> Self {
        Operand::Array(a)
    }
}

impl<'a, T> From<&'a DataArray<T>> for Operand<'a, T> {
    fn from(d: &'a DataArray<T>) -> Self {
        Operand::Data(d)
    }
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    fn apply<T: PartialOrd>(&self, a: &T, b: &T) -> bool {
        match self {
            // NaN compares false everywhere except `!=`
            CmpOp::Lt => matches!(a.partial_cmp(b), Some(Ordering::Less)),
            CmpOp::Le => matches!(a.partial_cmp(b), Some(Ordering::Less | Ordering::Equal)),
            CmpOp::Gt => matches!(a.partial_cmp(b), Some(Ordering::Greater)),
            CmpOp::Ge => matches!(a.partial_cmp(b), Some(Ordering::Greater | Ordering::Equal)),
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
        }
    }
}

impl<T: Float + Send + Sync> DataArray<T> {
    /// Apply a binary math operation, returning the "math operation could
    /// not be applied" error on incompatible shapes.
    ///
    /// The physical quantity survives only subtraction of two arrays with
    /// identical quantity and unit, or any operation against a bare scalar;
    /// every other combination downgrades the item to a composite label so
    /// an untrustworthy unit is never silently propagated.
    pub fn try_op(&self, other: Operand<T>, op: MathOp) -> Result<Self, FieldError> {
        let (values, keep_item, rhs_name) = match other {
            Operand::Scalar(s) => (self.values().mapv(|v| op.apply(v, s)), true, ""),
            Operand::Array(a) => (self.broadcast_apply(a, op)?, false, "array"),
            Operand::Data(d) => {
                let keep = op == MathOp::Sub
                    && self.item().quantity == d.item().quantity
                    && self.item().unit == d.item().unit;
                (self.broadcast_apply(d.values(), op)?, keep, d.name())
            }
        };

        let mut out = self.clone();
        out.values = values;
        if !keep_item {
            out.item = ItemInfo::new(format!("{} {} {}", self.name(), op.symbol(), rhs_name));
        }
        Ok(out)
    }

    /// Unary negation (value-mutated copy, metadata kept)
    pub fn negate(&self) -> Self {
        let mut out = self.clone();
        out.values = out.values.mapv(|v| -v);
        out
    }

    /// Elementwise absolute value (value-mutated copy, metadata kept)
    pub fn abs(&self) -> Self {
        let mut out = self.clone();
        out.values = out.values.mapv(|v| v.abs());
        out
    }

    /// Elementwise power
    pub fn pow<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<Self, FieldError>
    where
        T: 'a,
    {
        self.try_op(other.into(), MathOp::Pow)
    }

    /// Elementwise floor division
    pub fn floor_div<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<Self, FieldError>
    where
        T: 'a,
    {
        self.try_op(other.into(), MathOp::FloorDiv)
    }

    /// Elementwise modulo (sign follows the divisor)
    pub fn modulo<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<Self, FieldError>
    where
        T: 'a,
    {
        self.try_op(other.into(), MathOp::Rem)
    }

    fn broadcast_apply(&self, rhs: &ArrayD<T>, op: MathOp) -> Result<ArrayD<T>, FieldError> {
        if rhs.shape() == self.shape() {
            let mut out = ArrayD::zeros(self.values().raw_dim());
            Zip::from(&mut out)
                .and(self.values())
                .and(rhs)
                .par_for_each(|o, &a, &b| *o = op.apply(a, b));
            return Ok(out);
        }
        match rhs.broadcast(self.values().raw_dim()) {
            Some(b) => {
                let mut out = ArrayD::zeros(self.values().raw_dim());
                Zip::from(&mut out)
                    .and(self.values())
                    .and(&b)
                    .for_each(|o, &a, &b| *o = op.apply(a, b));
                Ok(out)
            }
            None => Err(FieldError::MathOperation {
                lhs: self.shape().to_vec(),
                rhs: rhs.shape().to_vec(),
            }),
        }
    }
}

impl<T: Clone + PartialOrd> DataArray<T> {
    fn compare(&self, other: Operand<T>, op: CmpOp) -> Result<DataArray<bool>, FieldError> {
        let mask: ArrayD<bool> = match other {
            Operand::Scalar(s) => self.values().map(|v| op.apply(v, &s)),
            Operand::Array(a) => self.compare_buffer(a, op)?,
            Operand::Data(d) => self.compare_buffer(d.values(), op)?,
        };
        Ok(DataArray::from_parts(
            mask,
            self.time().clone(),
            self.dims().to_vec(),
            self.geometry().clone(),
            self.elevation().cloned(),
            ItemInfo::new("Boolean"),
        ))
    }

    fn compare_buffer(&self, rhs: &ArrayD<T>, op: CmpOp) -> Result<ArrayD<bool>, FieldError> {
        let b = if rhs.shape() == self.shape() {
            rhs.view()
        } else {
            rhs.broadcast(self.values().raw_dim())
                .ok_or_else(|| FieldError::MathOperation {
                    lhs: self.shape().to_vec(),
                    rhs: rhs.shape().to_vec(),
                })?
        };
        let mut out = ArrayD::from_elem(self.values().raw_dim(), false);
        Zip::from(&mut out)
            .and(self.values())
            .and(&b)
            .for_each(|o, a, b| *o = op.apply(a, b));
        Ok(out)
    }

    /// Elementwise `<`, producing a boolean mask array
    pub fn lt<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<DataArray<bool>, FieldError>
    where
        T: 'a,
    {
        self.compare(other.into(), CmpOp::Lt)
    }

    /// Elementwise `<=`
    pub fn le<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<DataArray<bool>, FieldError>
    where
        T: 'a,
    {
        self.compare(other.into(), CmpOp::Le)
    }

    /// Elementwise `>`
    pub fn gt<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<DataArray<bool>, FieldError>
    where
        T: 'a,
    {
        self.compare(other.into(), CmpOp::Gt)
    }

    /// Elementwise `>=`
    pub fn ge<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<DataArray<bool>, FieldError>
    where
        T: 'a,
    {
        self.compare(other.into(), CmpOp::Ge)
    }

    /// Elementwise `==`, producing a boolean mask array (use
    /// [`DataArray::values_equal`] for a plain equality predicate)
    pub fn eq_mask<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<DataArray<bool>, FieldError>
    where
        T: 'a,
    {
        self.compare(other.into(), CmpOp::Eq)
    }

    /// Elementwise `!=`
    pub fn ne_mask<'a>(&self, other: impl Into<Operand<'a, T>>) -> Result<DataArray<bool>, FieldError>
    where
        T: 'a,
    {
        self.compare(other.into(), CmpOp::Ne)
    }
}

// Operator sugar. Shape mismatches panic here (as ndarray's own operators
// do); use `try_op` to handle them as errors.

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<'a, T: Float + Send + Sync> $trait<T> for &'a DataArray<T> {
            type Output = DataArray<T>;
            fn $method(self, rhs: T) -> DataArray<T> {
                match self.try_op(Operand::Scalar(rhs), $op) {
                    Ok(out) => out,
                    Err(e) => panic!("{}", e),
                }
            }
        }

        impl<'a, 'b, T: Float + Send + Sync> $trait<&'b DataArray<T>> for &'a DataArray<T> {
            type Output = DataArray<T>;
            fn $method(self, rhs: &'b DataArray<T>) -> DataArray<T> {
                match self.try_op(Operand::Data(rhs), $op) {
                    Ok(out) => out,
                    Err(e) => panic!("{}", e),
                }
            }
        }

        impl<'a, 'b, T: Float + Send + Sync> $trait<&'b ArrayD<T>> for &'a DataArray<T> {
            type Output = DataArray<T>;
            fn $method(self, rhs: &'b ArrayD<T>) -> DataArray<T> {
                match self.try_op(Operand::Array(rhs), $op) {
                    Ok(out) => out,
                    Err(e) => panic!("{}", e),
                }
            }
        }
    };
}

impl_binary_operator!(Add, add, MathOp::Add);
impl_binary_operator!(Sub, sub, MathOp::Sub);
impl_binary_operator!(Mul, mul, MathOp::Mul);
impl_binary_operator!(Div, div, MathOp::Div);

impl<'a, T: Float + Send + Sync> Neg for &'a DataArray<T> {
    type Output = DataArray<T>;
    fn neg(self) -> DataArray<T> {
        self.negate()
    }
}

// Reflected scalar forms for the common element type
impl<'a> Add<&'a DataArray<f64>> for f64 {
    type Output = DataArray<f64>;
    fn add(self, rhs: &'a DataArray<f64>) -> DataArray<f64> {
        rhs + self
    }
}

impl<'a> Sub<&'a DataArray<f64>> for f64 {
    type Output = DataArray<f64>;
    fn sub(self, rhs: &'a DataArray<f64>) -> DataArray<f64> {
        &rhs.negate() + self
    }
}

impl<'a> Mul<&'a DataArray<f64>> for f64 {
    type Output = DataArray<f64>;
    fn mul(self, rhs: &'a DataArray<f64>) -> DataArray<f64> {
        rhs * self
    }
}