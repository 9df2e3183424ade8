use ratestypecrate::{constants::CURVE_EPSILON, types::CurvePoint};

use crate::error::RateError;

/// Sorts points by utilization, clamps utilization into `[0, 100]` and drops duplicate
/// utilizations, keeping the last point seen at a given utilization.
pub fn normalize_curve(points: &[CurvePoint]) -> Vec<CurvePoint> {
    let mut sorted: Vec<CurvePoint> = points
        .iter()
        .map(|p| CurvePoint::new(clamp_percent(p.utilization), p.rate))
        .collect();
    // Stable sort, so "last wins" refers to input order.
    sorted.sort_by(|a, b| a.utilization.total_cmp(&b.utilization));

    let mut out: Vec<CurvePoint> = Vec::with_capacity(sorted.len());
    for point in sorted {
        match out.last_mut() {
            Some(last) if last.utilization == point.utilization => *last = point,
            _ => out.push(point),
        }
    }
    out
}

/// Clamps a utilization percent into `[0, 100]`. Non-finite values map to 0.
pub fn clamp_percent(utilization: f64) -> f64 {
    if utilization.is_finite() {
        utilization.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Linearly interpolates a curve sorted by ascending, unique utilization.
///
/// * returns the first rate for `x` at or below the curve's start
/// * returns the last rate for `x` at or above the curve's end
/// * never extrapolates
pub fn interpolate(points: &[CurvePoint], x: f64) -> Result<f64, RateError> {
    let (first, last) = match points {
        [first, .., last] => (first, last),
        _ => return Err(RateError::DegenerateCurve(points.len())),
    };
    if x.is_nan() {
        return Err(RateError::InvalidUtilization(x));
    }

    if x <= first.utilization {
        return Ok(first.rate);
    }
    if x >= last.utilization {
        return Ok(last.rate);
    }

    // First point strictly to the right of x; 1 <= upper <= len - 1 given the clamps above.
    let upper = points.partition_point(|p| p.utilization <= x);
    Ok(lerp(&points[upper - 1], &points[upper], x))
}

/// Interpolation for protocol-supplied curves, where malformed data is an error instead of
/// something to clamp around.
///
/// Fails if
/// * the curve has fewer than two points
/// * utilization does not strictly increase, or the rate decreases, between consecutive points
/// * `x` lies outside the curve's own domain
pub fn interpolate_strict(points: &[CurvePoint], x: f64) -> Result<f64, RateError> {
    validate_monotonic(points)?;

    if !x.is_finite() {
        return Err(RateError::InvalidUtilization(x));
    }

    // Both ends are hard limits: a curve that starts above 0% has no rate for idle markets.
    let start = points[0].utilization;
    let end = points[points.len() - 1].utilization;
    if x < start || x > end {
        return Err(RateError::Extrapolation {
            utilization: x,
            start,
            end,
        });
    }

    if let Some(hit) = points.iter().find(|p| p.utilization == x) {
        return Ok(hit.rate);
    }

    let upper = points.partition_point(|p| p.utilization < x);
    Ok(lerp(&points[upper - 1], &points[upper], x))
}

/// * at least two points
/// * utilization strictly increasing
/// * rate non-decreasing
pub fn validate_monotonic(points: &[CurvePoint]) -> Result<(), RateError> {
    if points.len() < 2 {
        return Err(RateError::DegenerateCurve(points.len()));
    }

    for (i, pair) in points.windows(2).enumerate() {
        let (prev, curr) = (&pair[0], &pair[1]);
        if !(prev.utilization < curr.utilization) || !(prev.rate <= curr.rate) {
            return Err(RateError::NonMonotonicCurve(i, i + 1));
        }
    }

    Ok(())
}

#[inline]
fn lerp(start: &CurvePoint, end: &CurvePoint, x: f64) -> f64 {
    let delta_x = (end.utilization - start.utilization).max(CURVE_EPSILON);
    let proportion = (x - start.utilization) / delta_x;
    start.rate + proportion * (end.rate - start.rate)
}
