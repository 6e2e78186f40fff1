/// Ledger Engine: Arithmetic Primitives
///
/// All amounts: i64 in the smallest ledger unit. No float.
/// Every combination is checked; overflow is an error, never a wrap.

use crate::error::ArithmeticError;

/// Milliseconds in one day. Freeze durations and withdraw cooldowns are
/// configured in days and applied in milliseconds.
pub const MS_PER_DAY: i64 = 24 * 3600 * 1000;

/// Checked integer addition.
pub fn checked_add(a: i64, b: i64) -> Result<i64, ArithmeticError> {
    a.checked_add(b)
        .ok_or(ArithmeticError::Overflow { op: "add", lhs: a, rhs: b })
}

/// Checked integer subtraction.
pub fn checked_sub(a: i64, b: i64) -> Result<i64, ArithmeticError> {
    a.checked_sub(b)
        .ok_or(ArithmeticError::Overflow { op: "sub", lhs: a, rhs: b })
}

/// Checked integer multiplication.
pub fn checked_mul(a: i64, b: i64) -> Result<i64, ArithmeticError> {
    a.checked_mul(b)
        .ok_or(ArithmeticError::Overflow { op: "mul", lhs: a, rhs: b })
}

/// Floor division. Rejects a zero divisor and the single overflowing case
/// (`i64::MIN / -1`).
pub fn floor_div(a: i64, b: i64) -> Result<i64, ArithmeticError> {
    if b == 0 {
        return Err(ArithmeticError::DivisionByZero { lhs: a });
    }
    let q = a
        .checked_div(b)
        .ok_or(ArithmeticError::Overflow { op: "div", lhs: a, rhs: b })?;
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// Sum a sequence of amounts, failing on the first overflow.
pub fn checked_sum<I>(values: I) -> Result<i64, ArithmeticError>
where
    I: IntoIterator<Item = i64>,
{
    values.into_iter().try_fold(0i64, checked_add)
}

/// Convert a duration in days to milliseconds.
pub fn days_to_millis(days: i64) -> Result<i64, ArithmeticError> {
    checked_mul(days, MS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_add_ok() {
        assert_eq!(checked_add(3, 4), Ok(7));
        assert_eq!(checked_add(-10, 5), Ok(-5));
    }

    #[test]
    fn test_checked_add_overflow() {
        assert!(matches!(
            checked_add(i64::MAX, 1),
            Err(ArithmeticError::Overflow { op: "add", .. })
        ));
    }

    #[test]
    fn test_checked_sub_overflow() {
        assert!(checked_sub(i64::MIN, 1).is_err());
        assert_eq!(checked_sub(10, 3), Ok(7));
    }

    #[test]
    fn test_checked_mul_ok() {
        assert_eq!(checked_mul(3, 4), Ok(12));
    }

    #[test]
    fn test_checked_mul_overflow() {
        assert!(checked_mul(i64::MAX, 2).is_err());
    }

    #[test]
    fn test_floor_div() {
        assert_eq!(floor_div(7, 2), Ok(3));
        assert_eq!(floor_div(1, 3), Ok(0));
        assert_eq!(floor_div(-7, 2), Ok(-4));
        assert_eq!(floor_div(7, -2), Ok(-4));
        assert_eq!(floor_div(-7, -2), Ok(3));
        assert!(matches!(
            floor_div(1, 0),
            Err(ArithmeticError::DivisionByZero { .. })
        ));
        assert!(floor_div(i64::MIN, -1).is_err());
    }

    #[test]
    fn test_checked_sum() {
        assert_eq!(checked_sum([1, 2, 3]), Ok(6));
        assert!(checked_sum([i64::MAX, 1]).is_err());
        assert_eq!(checked_sum(Vec::<i64>::new()), Ok(0));
    }

    #[test]
    fn test_days_to_millis() {
        assert_eq!(days_to_millis(3), Ok(259_200_000));
    }
}
