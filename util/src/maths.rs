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

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        // Normalised motor speed into a 1-2 ms pulse
        assert_eq!(lin_map((-1f64, 1f64), (1.0, 2.0), 0.0), 1.5);
        assert_eq!(lin_map((-1f64, 1f64), (1.0, 2.0), -1.0), 1.0);
        assert_eq!(lin_map((-1f64, 1f64), (1.0, 2.0), 1.0), 2.0);

        // Inverted target range
        assert_eq!(lin_map((0f64, 1f64), (10.0, 0.0), 0.25), 7.5);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&3.0f64, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-3.0f64, &-1.0, &1.0), -1.0);
        assert_eq!(clamp(&0.3f64, &-1.0, &1.0), 0.3);
    }
}
