//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Returns true if `value` is within `tolerance` of `target` (inclusive).
pub fn is_near<T>(value: T, target: T, tolerance: T) -> bool
where
    T: Float
{
    (value - target).abs() <= tolerance
}

/// Returns true if `value` lies in the closed range `[min, max]`.
pub fn in_range<T>(value: T, min: T, max: T) -> bool
where
    T: Float
{
    value >= min && value <= max
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 12f64), (0f64, 40f64), 6f64), 20f64);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 10f64), -1f64), 0f64);
    }

    #[test]
    fn test_is_near() {
        assert!(is_near(115f64, 118f64, 5f64));
        assert!(is_near(123f64, 118f64, 5f64));
        assert!(!is_near(124f64, 118f64, 5f64));
        assert!(is_near(-30.5f64, -32f64, 2f64));
    }

    #[test]
    fn test_in_range() {
        assert!(in_range(-32f64, -95f64, 5f64));
        assert!(in_range(5f64, -95f64, 5f64));
        assert!(!in_range(90f64, -95f64, 5f64));
    }
}
