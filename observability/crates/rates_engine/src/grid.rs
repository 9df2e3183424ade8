use ratestypecrate::constants::GRID_DECIMALS;

/// Builds `count` evenly spaced utilization points covering `[0, 100]` percent.
///
/// * `count` is floored and clamped to at least 2, non-finite input counts as 0
/// * values are rounded to 6 decimals to drop float drift (33.33333333337 -> 33.333333)
/// * first value is exactly 0, last is exactly 100
pub fn percent_grid(count: f64) -> Vec<f64> {
    let count = if count.is_finite() { count.floor() } else { 0.0 };
    let count = count.max(2.0) as usize;

    let step = 100.0 / (count - 1) as f64;
    (0..count).map(|i| round_to(i as f64 * step)).collect()
}

fn round_to(value: f64) -> f64 {
    let scale = 10f64.powi(GRID_DECIMALS);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(0.0 ; "zero")]
    #[test_case(1.0 ; "one")]
    #[test_case(-5.0 ; "negative")]
    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinite")]
    #[test_case(1.9 ; "floored to one")]
    fn degenerate_counts_yield_two_point_grid(count: f64) {
        assert_eq!(percent_grid(count), vec![0.0, 100.0]);
    }

    #[test_case(2)]
    #[test_case(3)]
    #[test_case(7)]
    #[test_case(101)]
    #[test_case(1000)]
    fn grid_is_monotonic_and_spans_domain(count: usize) {
        let grid = percent_grid(count as f64);
        assert_eq!(grid.len(), count);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[count - 1], 100.0);
        assert!(grid.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rounding_suppresses_drift() {
        assert_eq!(percent_grid(4.0), vec![0.0, 33.333333, 66.666667, 100.0]);
    }

    #[test]
    fn fractional_count_is_floored() {
        assert_eq!(percent_grid(3.7), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn default_grid_has_whole_percent_steps() {
        let grid = percent_grid(101.0);
        assert_eq!(grid[1], 1.0);
        assert_eq!(grid[50], 50.0);
        assert_eq!(grid[99], 99.0);
    }
}
