//! Size and ownership thresholds.

/// Default minimum fraction of the float held by institutions.
pub const DEFAULT_MIN_FLOAT_FRACTION: f64 = 0.5;

/// Whether the number of outstanding shares reaches the minimum.
#[must_use]
pub const fn check_shares(nr_shares: u64, min_shares: u64) -> bool {
    nr_shares >= min_shares
}

/// Whether institutional ownership is broad and deep enough.
///
/// Fails if either the holder count or the held float fraction is below its
/// minimum.
#[must_use]
pub fn check_institutional_ownership(
    nr_holders: u64,
    float_held_fraction: f64,
    min_holders: u64,
    min_float_fraction: f64,
) -> bool {
    nr_holders >= min_holders && float_held_fraction >= min_float_fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_shares() {
        assert!(check_shares(10_000_000, 5_000_000));
        assert!(check_shares(5_000_000, 5_000_000));
        assert!(!check_shares(1_000_000, 5_000_000));
    }

    #[test]
    fn test_check_institutional_ownership() {
        assert!(check_institutional_ownership(100, 0.6, 80, DEFAULT_MIN_FLOAT_FRACTION));
        assert!(!check_institutional_ownership(79, 0.9, 80, DEFAULT_MIN_FLOAT_FRACTION));
        assert!(!check_institutional_ownership(500, 0.49, 80, DEFAULT_MIN_FLOAT_FRACTION));
        assert!(check_institutional_ownership(80, 0.5, 80, DEFAULT_MIN_FLOAT_FRACTION));
    }

    #[test]
    fn test_nan_fraction_fails() {
        assert!(!check_institutional_ownership(100, f64::NAN, 80, 0.5));
    }
}
