//! The four operators, equality and ordering on primitives

use std::cmp::Ordering;

use super::{EvalError, Evaluator, Mode};
use crate::ast::{BinaryOp, Primitive, Value};
use crate::env::ContainerId;
use crate::io::Sink;

impl Evaluator {
    /// Combine two operands that were reduced in `Mode::Operand(op)`
    pub(crate) fn combine(
        &mut self,
        op: BinaryOp,
        lhs: Primitive,
        rhs: Primitive,
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        match (lhs, rhs) {
            (Primitive::Container(c), rhs) => self.overloaded(op, c, rhs, sink),
            (Primitive::Void, rhs) => Ok(rhs),
            (lhs, Primitive::Void) => Ok(lhs),
            (Primitive::Int(a), Primitive::Int(b)) => integer_arithmetic(op, a, b).map(Primitive::Int),
            (Primitive::Bool(a), Primitive::Bool(b)) => Ok(Primitive::Bool(match op {
                BinaryOp::Add => a || b,
                BinaryOp::Multiply => a && b,
                BinaryOp::Subtract => a || !b,
                BinaryOp::Divide => a && !b,
            })),
            (Primitive::Text(a), Primitive::Text(b)) if op == BinaryOp::Add => {
                Ok(Primitive::Text(a + &b))
            }
            (lhs, rhs) => Err(EvalError::Type(format!(
                "Can not {} values of type '{}' and '{}'.",
                op.verb(),
                lhs.type_name(),
                self.store.type_name_of(&rhs.into_value())
            ))),
        }
    }

    /// Apply the container's hook for `op` with arguments `[container, other]`
    fn overloaded(
        &mut self,
        op: BinaryOp,
        c: ContainerId,
        other: Primitive,
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        if other == Primitive::Void {
            return Ok(Primitive::Container(c));
        }
        match self.store.find_with_template(c, op.hook()) {
            Some(b) => {
                let hook = self.store.value(b).clone();
                let args = [Value::Container(c), other.into_value()];
                self.reduce(&hook, c, &args, Mode::Full, sink)
            }
            None => Err(EvalError::Type(format!(
                "A value of type '{}' can not be part of {}.",
                self.store.type_name_of(&Value::Container(c)),
                op.noun()
            ))),
        }
    }

    /// Structural equality: containers compare by content
    pub(crate) fn primitives_equal(&self, a: &Primitive, b: &Primitive) -> bool {
        match (a, b) {
            (Primitive::Container(x), Primitive::Container(y)) => self.store.containers_equal(*x, *y),
            _ => a == b,
        }
    }

    /// Ordering used by `sort`; values of different kinds order by type name
    pub(crate) fn compare(&self, a: &Primitive, b: &Primitive) -> Ordering {
        match (a, b) {
            (Primitive::Int(x), Primitive::Int(y)) => x.cmp(y),
            (Primitive::Bool(x), Primitive::Bool(y)) => x.cmp(y),
            (Primitive::Text(x), Primitive::Text(y)) => x.cmp(y),
            (Primitive::Void, Primitive::Void) => Ordering::Equal,
            (Primitive::Container(x), Primitive::Container(y)) => self
                .store
                .bindings(*x)
                .len()
                .cmp(&self.store.bindings(*y).len()),
            _ => a.type_name().cmp(b.type_name()),
        }
    }
}

/// Checked integer arithmetic; division rounds towards negative infinity
pub fn integer_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<i64, EvalError> {
    let overflow = || {
        EvalError::Arithmetic(format!(
            "Can not {} {} and {}, result causes overflow.",
            op.verb(),
            a,
            b
        ))
    };
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(overflow),
        BinaryOp::Subtract => a.checked_sub(b).ok_or_else(overflow),
        BinaryOp::Multiply => a.checked_mul(b).ok_or_else(overflow),
        BinaryOp::Divide => {
            if b == 0 {
                return Err(EvalError::Arithmetic("Can not divide by zero.".to_string()));
            }
            let quotient = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                Ok(quotient - 1)
            } else {
                Ok(quotient)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_native_arithmetic() {
        for a in -20i64..=20 {
            for b in (-7i64..=7).filter(|b| *b != 0) {
                let floor = (a as f64 / b as f64).floor() as i64;
                assert_eq!(integer_arithmetic(BinaryOp::Divide, a, b).unwrap(), floor, "{a}/{b}");
                assert_eq!(integer_arithmetic(BinaryOp::Add, a, b).unwrap(), a + b);
                assert_eq!(integer_arithmetic(BinaryOp::Subtract, a, b).unwrap(), a - b);
                assert_eq!(integer_arithmetic(BinaryOp::Multiply, a, b).unwrap(), a * b);
            }
        }
        assert_eq!(integer_arithmetic(BinaryOp::Add, 40, 2).unwrap(), 42);
        assert_eq!(integer_arithmetic(BinaryOp::Subtract, 2, 40).unwrap(), -38);
        assert_eq!(integer_arithmetic(BinaryOp::Multiply, -6, 7).unwrap(), -42);
    }

    #[test]
    fn test_floor_division() {
        assert_eq!(integer_arithmetic(BinaryOp::Divide, 7, 2).unwrap(), 3);
        assert_eq!(integer_arithmetic(BinaryOp::Divide, -7, 2).unwrap(), -4);
        assert_eq!(integer_arithmetic(BinaryOp::Divide, 7, -2).unwrap(), -4);
        assert_eq!(integer_arithmetic(BinaryOp::Divide, -7, -2).unwrap(), 3);
        assert_eq!(integer_arithmetic(BinaryOp::Divide, -6, 3).unwrap(), -2);
    }

    #[test]
    fn test_overflow_is_reported() {
        for op in [BinaryOp::Add, BinaryOp::Multiply] {
            let err = integer_arithmetic(op, i64::MAX, 2).unwrap_err();
            assert!(matches!(err, EvalError::Arithmetic(_)));
        }
        assert!(integer_arithmetic(BinaryOp::Subtract, i64::MIN, 1).is_err());
        assert!(integer_arithmetic(BinaryOp::Divide, i64::MIN, -1).is_err());
        let err = integer_arithmetic(BinaryOp::Add, i64::MAX, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Can not add {} and 1, result causes overflow.", i64::MAX)
        );
    }

    #[test]
    fn test_division_by_zero() {
        let err = integer_arithmetic(BinaryOp::Divide, 1, 0).unwrap_err();
        assert_eq!(err.to_string(), "Can not divide by zero.");
    }
}
