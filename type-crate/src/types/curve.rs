use serde::{Deserialize, Serialize};

/// A single knot on a utilization -> rate curve.
///
/// The unit of `rate` depends on where the point came from (APR vs APY, fraction vs percent),
/// callers are expected to keep track of it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurvePoint {
    pub utilization: f64,
    pub rate: f64,
}

impl CurvePoint {
    pub const fn new(utilization: f64, rate: f64) -> Self {
        Self { utilization, rate }
    }
}

impl From<(f64, f64)> for CurvePoint {
    fn from((utilization, rate): (f64, f64)) -> Self {
        Self { utilization, rate }
    }
}

/// Sampled interest rate curves for one market, ready for charting.
///
/// * `knots` are utilization points in percent, `[0, 100]`, non-decreasing
/// * `borrow_rates` and `lending_rates` are APYs in percent units (7.2 = 7.2%)
/// * all three vectors have the same length once sanitized
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveVectors {
    pub knots: Vec<f64>,
    pub borrow_rates: Vec<f64>,
    pub lending_rates: Vec<f64>,
}

impl CurveVectors {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            knots: Vec::with_capacity(capacity),
            borrow_rates: Vec::with_capacity(capacity),
            lending_rates: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, knot: f64, borrow_rate: f64, lending_rate: f64) {
        self.knots.push(knot);
        self.borrow_rates.push(borrow_rate);
        self.lending_rates.push(lending_rate);
    }

    /// Length of the shortest of the three vectors.
    pub fn len(&self) -> usize {
        self.knots
            .len()
            .min(self.borrow_rates.len())
            .min(self.lending_rates.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw borrow curve split into parallel knot/value vectors, as written to the debug curve log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformedCurve {
    pub knots: Vec<f64>,
    pub values: Vec<f64>,
}

impl From<&[CurvePoint]> for TransformedCurve {
    fn from(points: &[CurvePoint]) -> Self {
        Self {
            knots: points.iter().map(|p| p.utilization).collect(),
            values: points.iter().map(|p| p.rate).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn len_is_shortest_vector() {
        let vectors = CurveVectors {
            knots: vec![0.0, 50.0, 100.0],
            borrow_rates: vec![1.0, 2.0],
            lending_rates: vec![0.5, 1.0, 1.5],
        };
        assert_eq!(vectors.len(), 2);
        assert!(!vectors.is_empty());
        assert!(CurveVectors::default().is_empty());
    }

    #[test]
    fn curve_vectors_serialize_camel_case() {
        let mut vectors = CurveVectors::with_capacity(1);
        vectors.push(0.0, 1.5, 0.25);
        let json = serde_json::to_value(&vectors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "knots": [0.0], "borrowRates": [1.5], "lendingRates": [0.25] })
        );
    }

    #[test]
    fn transformed_curve_splits_points() {
        let points = [CurvePoint::new(0.0, 0.0), CurvePoint::new(0.8, 0.1)];
        let transformed = TransformedCurve::from(&points[..]);
        assert_eq!(transformed.knots, vec![0.0, 0.8]);
        assert_eq!(transformed.values, vec![0.0, 0.1]);
    }
}
