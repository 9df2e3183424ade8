use ratestypecrate::{
    constants::{KAMINO_SLOTS_PER_YEAR, ONE_HUNDRED_PCT_IN_BPS},
    types::CurvePoint,
};
use serde::{Deserialize, Serialize};

use crate::{compounding::apr_to_apy, error::RateError, interp::interpolate_strict, Apys};

/// One breakpoint of a Kamino reserve's borrow rate curve, as stored on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRateCurvePoint {
    pub utilization_rate_bps: u32,
    pub borrow_rate_bps: u32,
}

impl BorrowRateCurvePoint {
    pub const fn new(utilization_rate_bps: u32, borrow_rate_bps: u32) -> Self {
        Self {
            utilization_rate_bps,
            borrow_rate_bps,
        }
    }
}

/// Converts the on-chain breakpoints into a decimal `(utilization, rate)` curve.
///
/// Kamino pads its fixed-size curve by repeating the 100% point, so everything after the first
/// breakpoint at exactly 100% utilization is dropped.
pub fn truncate_borrow_curve(points: &[BorrowRateCurvePoint]) -> Result<Vec<CurvePoint>, RateError> {
    let denominator = ONE_HUNDRED_PCT_IN_BPS as f64;
    let mut curve = Vec::with_capacity(points.len());

    for (index, point) in points.iter().enumerate() {
        if point.utilization_rate_bps > ONE_HUNDRED_PCT_IN_BPS {
            return Err(RateError::InvalidBreakpoint {
                index,
                utilization_bps: point.utilization_rate_bps,
            });
        }

        curve.push(CurvePoint::new(
            point.utilization_rate_bps as f64 / denominator,
            point.borrow_rate_bps as f64 / denominator,
        ));

        if point.utilization_rate_bps == ONE_HUNDRED_PCT_IN_BPS {
            break;
        }
    }

    Ok(curve)
}

/// The subset of a Kamino reserve's configuration the rate model reads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KaminoRateInputs {
    /// Share of borrow interest kept by the protocol, in percent (0-100).
    pub protocol_take_rate_pct: f64,
    pub borrow_rate_curve: Vec<BorrowRateCurvePoint>,
    /// Scales per-slot rates for the observed slot duration vs. the nominal one.
    pub slot_adjustment_factor: f64,
    /// Fixed host interest rate, decimal APR.
    pub fixed_host_interest_rate: f64,
}

/// Supplied and borrowed amounts of a reserve as of its last refresh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReserveBalances {
    pub total_supply: f64,
    pub borrowed_amount: f64,
    pub last_update_slot: u64,
}

impl ReserveBalances {
    pub fn utilization(&self) -> f64 {
        if self.total_supply > 0.0 {
            self.borrowed_amount / self.total_supply
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KaminoAprs {
    pub supply_apr: f64,
    pub borrow_apr: f64,
}

impl KaminoRateInputs {
    pub fn truncated_curve(&self) -> Result<Vec<CurvePoint>, RateError> {
        truncate_borrow_curve(&self.borrow_rate_curve)
    }

    /// Rate the curve alone charges at `utilization` (decimal, before host rate and adjustment).
    pub fn estimated_borrow_rate(&self, utilization: f64) -> Result<f64, RateError> {
        let curve = self.truncated_curve()?;
        interpolate_strict(&curve, clamp_utilization(utilization)?)
    }

    /// APRs at `utilization`, a fraction. Values above 1 are treated as 1.
    ///
    /// * `borrow_apr = (curve_rate + fixed_host_rate) * slot_adjustment_factor`
    /// * `supply_apr = utilization * curve_rate * slot_adjustment_factor * (1 - take_rate_pct / 100)`
    pub fn compute_aprs(&self, utilization: f64) -> Result<KaminoAprs, RateError> {
        let utilization = clamp_utilization(utilization)?;
        let estimated_borrow_rate = self.estimated_borrow_rate(utilization)?;

        let borrow_apr =
            (estimated_borrow_rate + self.fixed_host_interest_rate) * self.slot_adjustment_factor;
        let supply_apr = utilization
            * estimated_borrow_rate
            * self.slot_adjustment_factor
            * (1.0 - self.protocol_take_rate_pct / 100.0);

        Ok(KaminoAprs {
            supply_apr,
            borrow_apr,
        })
    }

    /// Lending and borrow APYs at `utilization`, compounded per slot.
    pub fn compute_apys(&self, utilization: f64) -> Result<Apys, RateError> {
        let KaminoAprs {
            supply_apr,
            borrow_apr,
        } = self.compute_aprs(utilization)?;

        Ok(Apys {
            lending_apy: apr_to_apy(supply_apr, KAMINO_SLOTS_PER_YEAR),
            borrow_apy: apr_to_apy(borrow_apr, KAMINO_SLOTS_PER_YEAR),
        })
    }

    /// Projects interest accrued since the reserve's last refresh onto its balances and returns
    /// the resulting utilization. Suppliers only receive the share left after the take rate.
    pub fn estimated_utilization(
        &self,
        balances: &ReserveBalances,
        current_slot: u64,
    ) -> Result<f64, RateError> {
        let utilization = balances.utilization();
        let elapsed_slots = current_slot.saturating_sub(balances.last_update_slot);
        if elapsed_slots == 0 || balances.borrowed_amount <= 0.0 {
            return Ok(utilization);
        }

        let KaminoAprs { borrow_apr, .. } = self.compute_aprs(utilization)?;
        let growth = (elapsed_slots as f64 * (borrow_apr / KAMINO_SLOTS_PER_YEAR).ln_1p()).exp_m1();
        let accrued_interest = balances.borrowed_amount * growth;

        let borrowed = balances.borrowed_amount + accrued_interest;
        let supplied = balances.total_supply
            + accrued_interest * (1.0 - self.protocol_take_rate_pct / 100.0);

        Ok(if supplied > 0.0 { borrowed / supplied } else { 0.0 })
    }

    /// Point-in-time APYs as of `current_slot`.
    pub fn current_apys(
        &self,
        balances: &ReserveBalances,
        current_slot: u64,
    ) -> Result<Apys, RateError> {
        let utilization = self.estimated_utilization(balances, current_slot)?;
        self.compute_apys(utilization)
    }
}

fn clamp_utilization(utilization: f64) -> Result<f64, RateError> {
    if utilization.is_nan() {
        return Err(RateError::InvalidUtilization(utilization));
    }
    Ok(utilization.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratestypecrate::assert_eq_with_tolerance;

    fn bps(points: &[(u32, u32)]) -> Vec<BorrowRateCurvePoint> {
        points
            .iter()
            .map(|&(u, r)| BorrowRateCurvePoint::new(u, r))
            .collect()
    }

    /// 0% -> 0%, 80% -> 10%, 100% -> 150%, padded with repeated 100% points.
    fn sample_inputs() -> KaminoRateInputs {
        KaminoRateInputs {
            protocol_take_rate_pct: 20.0,
            borrow_rate_curve: bps(&[
                (0, 0),
                (8_000, 1_000),
                (10_000, 15_000),
                (10_000, 15_000),
                (10_000, 15_000),
            ]),
            slot_adjustment_factor: 1.0,
            fixed_host_interest_rate: 0.0,
        }
    }

    #[test]
    fn truncation_stops_at_first_full_utilization_point() {
        let curve = truncate_borrow_curve(&sample_inputs().borrow_rate_curve).unwrap();
        assert_eq!(
            curve,
            vec![
                CurvePoint::new(0.0, 0.0),
                CurvePoint::new(0.8, 0.1),
                CurvePoint::new(1.0, 1.5),
            ]
        );
    }

    #[test]
    fn truncation_rejects_out_of_range_breakpoints() {
        assert_eq!(
            truncate_borrow_curve(&bps(&[(0, 0), (12_000, 100)])),
            Err(RateError::InvalidBreakpoint {
                index: 1,
                utilization_bps: 12_000
            })
        );
    }

    #[test]
    fn aprs_follow_curve_take_rate_and_offsets() {
        let inputs = KaminoRateInputs {
            fixed_host_interest_rate: 0.01,
            slot_adjustment_factor: 0.5,
            ..sample_inputs()
        };
        let KaminoAprs {
            supply_apr,
            borrow_apr,
        } = inputs.compute_aprs(0.4).unwrap();

        // curve rate at 40% = 0.05
        assert_eq_with_tolerance!(borrow_apr, (0.05 + 0.01) * 0.5, 1e-12);
        assert_eq_with_tolerance!(supply_apr, 0.4 * 0.05 * 0.5 * 0.8, 1e-12);
    }

    #[test]
    fn apys_compound_per_slot() {
        let Apys {
            lending_apy,
            borrow_apy,
        } = sample_inputs().compute_apys(0.8).unwrap();

        let expected_borrow = (1.0f64 + 0.1 / KAMINO_SLOTS_PER_YEAR).powf(KAMINO_SLOTS_PER_YEAR) - 1.0;
        assert_eq_with_tolerance!(borrow_apy, expected_borrow, 1e-6);
        assert!(borrow_apy > 0.1);
        assert!(lending_apy < borrow_apy);
    }

    #[test]
    fn utilization_above_one_is_capped() {
        let inputs = sample_inputs();
        assert_eq!(
            inputs.compute_apys(1.3).unwrap(),
            inputs.compute_apys(1.0).unwrap()
        );
    }

    #[test]
    fn degenerate_and_non_monotonic_curves_propagate() {
        let degenerate = KaminoRateInputs {
            borrow_rate_curve: bps(&[(10_000, 500)]),
            ..sample_inputs()
        };
        assert_eq!(
            degenerate.compute_apys(0.5),
            Err(RateError::DegenerateCurve(1))
        );

        let decreasing = KaminoRateInputs {
            borrow_rate_curve: bps(&[(0, 500), (5_000, 200), (10_000, 900)]),
            ..sample_inputs()
        };
        assert_eq!(
            decreasing.compute_apys(0.5),
            Err(RateError::NonMonotonicCurve(0, 1))
        );
    }

    #[test]
    fn curve_without_full_utilization_point_cannot_extrapolate() {
        let short = KaminoRateInputs {
            borrow_rate_curve: bps(&[(0, 0), (9_000, 2_000)]),
            ..sample_inputs()
        };
        assert!(short.compute_apys(0.5).is_ok());
        assert!(matches!(
            short.compute_apys(0.95),
            Err(RateError::Extrapolation { .. })
        ));
    }

    #[test]
    fn estimated_utilization_grows_with_elapsed_slots() {
        let inputs = sample_inputs();
        let balances = ReserveBalances {
            total_supply: 1_000.0,
            borrowed_amount: 500.0,
            last_update_slot: 100,
        };

        assert_eq!(inputs.estimated_utilization(&balances, 100).unwrap(), 0.5);
        assert_eq!(inputs.estimated_utilization(&balances, 50).unwrap(), 0.5);

        let later = inputs
            .estimated_utilization(&balances, 100 + KAMINO_SLOTS_PER_YEAR as u64)
            .unwrap();
        assert!(later > 0.5);
        assert!(later < 1.0);
    }

    #[test]
    fn current_apys_match_static_apys_when_fresh() {
        let inputs = sample_inputs();
        let balances = ReserveBalances {
            total_supply: 200.0,
            borrowed_amount: 50.0,
            last_update_slot: 10,
        };
        assert_eq!(
            inputs.current_apys(&balances, 10).unwrap(),
            inputs.compute_apys(0.25).unwrap()
        );
    }

    #[test]
    fn empty_reserve_has_zero_utilization() {
        let balances = ReserveBalances::default();
        assert_eq!(balances.utilization(), 0.0);
        assert_eq!(
            sample_inputs().estimated_utilization(&balances, 1_000).unwrap(),
            0.0
        );
    }
}
