/// Minor units per major currency unit.
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

/// Convert a decimal price to integer minor units, rounding to the nearest
/// unit. Negative or non-finite input clamps to zero.
pub fn to_minor_units(price: f64) -> i64 {
    let minor = (price * MINOR_UNITS_PER_MAJOR).round();
    if minor.is_finite() && minor > 0.0 {
        minor as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_binary_float_noise() {
        // 19.99 * 100 is 1998.9999999999998 in binary floating point.
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(to_minor_units(5.00), 500);
        assert_eq!(to_minor_units(109.95), 10995);
    }

    #[test]
    fn test_negative_and_garbage_clamp_to_zero() {
        assert_eq!(to_minor_units(-3.5), 0);
        assert_eq!(to_minor_units(f64::NAN), 0);
        assert_eq!(to_minor_units(f64::NEG_INFINITY), 0);
        assert_eq!(to_minor_units(0.0), 0);
    }
}
