use ratestypecrate::types::CurveVectors;

use crate::{
    compounding::dec_to_percentage,
    error::RateError,
    interp::clamp_percent,
    kamino::KaminoRateInputs,
    marginfi::PlateauCurve,
    Apys,
};

/// A rate model that can be sampled at a utilization percent.
pub trait ApyCurve {
    /// Decimal APYs at `utilization_pct` in `[0, 100]`.
    fn apys_at(&self, utilization_pct: f64) -> Result<Apys, RateError>;
}

impl ApyCurve for KaminoRateInputs {
    fn apys_at(&self, utilization_pct: f64) -> Result<Apys, RateError> {
        self.compute_apys(utilization_pct / 100.0)
    }
}

/// Plateau/max curve with the borrow fee markup it is charted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeAdjustedPlateauCurve {
    pub curve: PlateauCurve,
    pub borrow_fee_fraction: f64,
}

impl ApyCurve for FeeAdjustedPlateauCurve {
    fn apys_at(&self, utilization_pct: f64) -> Result<Apys, RateError> {
        Ok(self.curve.apys(utilization_pct, self.borrow_fee_fraction))
    }
}

/// Samples `model` at every grid point, producing percent-unit APY vectors.
///
/// Any sampling failure fails the whole curve; a partially sampled curve is never returned.
pub fn build_vectors<M: ApyCurve + ?Sized>(
    model: &M,
    grid: &[f64],
) -> Result<CurveVectors, RateError> {
    let mut vectors = CurveVectors::with_capacity(grid.len());

    for &knot in grid {
        let knot = clamp_percent(knot);
        let Apys {
            lending_apy,
            borrow_apy,
        } = model.apys_at(knot)?;
        vectors.push(
            knot,
            dec_to_percentage(borrow_apy),
            dec_to_percentage(lending_apy),
        );
    }

    Ok(sanitize(vectors))
}

/// Trims all three vectors to the shortest common length and clamps knots into `[0, 100]`.
pub fn sanitize(vectors: CurveVectors) -> CurveVectors {
    let len = vectors.len();
    let CurveVectors {
        mut knots,
        mut borrow_rates,
        mut lending_rates,
    } = vectors;

    knots.truncate(len);
    borrow_rates.truncate(len);
    lending_rates.truncate(len);
    knots.iter_mut().for_each(|knot| *knot = clamp_percent(*knot));

    CurveVectors {
        knots,
        borrow_rates,
        lending_rates,
    }
}
