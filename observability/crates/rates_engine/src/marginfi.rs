use ratestypecrate::{
    constants::{CURVE_EPSILON, HOURS_PER_YEAR, MINUTES_PER_YEAR},
    types::CurveVectors,
};

use crate::{
    compounding::{apr_to_apy, dec_to_percentage},
    interp::clamp_percent,
    Apys,
};

/// Two-segment piecewise linear borrow curve.
///
/// The rate rises linearly from 0 to `plateau_rate_apr` as utilization approaches the optimal
/// utilization, then from `plateau_rate_apr` to `max_rate_apr` as utilization approaches 100%.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlateauCurve {
    /// Percent, clamped into `[0, 100]` on use.
    pub optimal_utilization_pct: f64,
    /// Decimal APR at the optimal utilization.
    pub plateau_rate_apr: f64,
    /// Decimal APR at 100% utilization.
    pub max_rate_apr: f64,
}

impl PlateauCurve {
    pub fn new(optimal_utilization_pct: f64, plateau_rate_apr: f64, max_rate_apr: f64) -> Self {
        Self {
            optimal_utilization_pct,
            plateau_rate_apr,
            max_rate_apr,
        }
    }

    /// Base borrow APR at `utilization_pct`, before any fee markup.
    ///
    /// * below optimal: `(u / optimal) * plateau`, or 0 when optimal is 0
    /// * at or above optimal: `plateau + ((u - optimal) / (100 - optimal)) * (max - plateau)`
    pub fn borrow_apr(&self, utilization_pct: f64) -> f64 {
        let optimal = clamp_percent(self.optimal_utilization_pct);

        if utilization_pct < optimal {
            if optimal > 0.0 {
                (utilization_pct / optimal) * self.plateau_rate_apr
            } else {
                0.0
            }
        } else {
            let right_width = (100.0 - optimal).max(CURVE_EPSILON);
            let t = (utilization_pct - optimal) / right_width;
            // Weighted form keeps both ends exact: t = 0 -> plateau, t = 1 -> max.
            self.plateau_rate_apr * (1.0 - t) + self.max_rate_apr * t
        }
    }

    /// Borrow and lending APRs at `utilization_pct`.
    ///
    /// The lending side is the pre-fee borrow rate scaled by utilization; the fee markup only
    /// applies to borrowers.
    pub fn aprs(&self, utilization_pct: f64, borrow_fee_fraction: f64) -> (f64, f64) {
        let base_apr = self.borrow_apr(utilization_pct);
        let lend_apr = base_apr * (utilization_pct / 100.0);
        let borrow_apr = base_apr * (1.0 + borrow_fee_fraction);
        (borrow_apr, lend_apr)
    }

    /// APYs at `utilization_pct`, compounded every minute.
    pub fn apys(&self, utilization_pct: f64, borrow_fee_fraction: f64) -> Apys {
        let (borrow_apr, lend_apr) = self.aprs(utilization_pct, borrow_fee_fraction);
        Apys {
            lending_apy: apr_to_apy(lend_apr, MINUTES_PER_YEAR),
            borrow_apy: apr_to_apy(borrow_apr, MINUTES_PER_YEAR),
        }
    }
}

/// Samples a plateau/max curve at every knot (utilization percent).
///
/// Rates come back as APYs in percent units, matching `CurveVectors`.
pub fn compute_curve_vectors(
    optimal_utilization_pct: f64,
    plateau_rate_apr: f64,
    max_rate_apr: f64,
    knots: &[f64],
    borrow_fee_fraction: f64,
) -> CurveVectors {
    let curve = PlateauCurve::new(optimal_utilization_pct, plateau_rate_apr, max_rate_apr);
    let mut vectors = CurveVectors::with_capacity(knots.len());

    for &knot in knots {
        let Apys {
            lending_apy,
            borrow_apy,
        } = curve.apys(knot, borrow_fee_fraction);
        vectors.push(
            knot,
            dec_to_percentage(borrow_apy),
            dec_to_percentage(lending_apy),
        );
    }

    vectors
}

/// Rate and fixed fees a Marginfi bank charges borrowers on top of the base rate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarginfiFees {
    pub insurance_ir_fee: f64,
    pub insurance_fixed_fee_apr: f64,
    /// AKA group rate fee
    pub protocol_ir_fee: f64,
    /// AKA group fixed fee
    pub protocol_fixed_fee_apr: f64,
    pub program_fee_rate: f64,
    pub program_fee_fixed: f64,
}

impl MarginfiFees {
    pub fn total_rate_fee(&self) -> f64 {
        self.insurance_ir_fee + self.protocol_ir_fee + self.program_fee_rate
    }

    pub fn total_fixed_fee(&self) -> f64 {
        self.insurance_fixed_fee_apr + self.protocol_fixed_fee_apr + self.program_fee_fixed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedInterestRates {
    pub base_rate_apr: f64,
    pub lending_rate_apr: f64,
    pub borrowing_rate_apr: f64,
}

/// The subset of a Marginfi bank's interest rate config the rate model reads, with decimal
/// utilization and rates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarginfiRateInputs {
    pub optimal_utilization_rate: f64,
    pub plateau_interest_rate: f64,
    pub max_interest_rate: f64,
    pub fees: MarginfiFees,
}

impl MarginfiRateInputs {
    pub fn plateau_curve(&self) -> PlateauCurve {
        PlateauCurve::new(
            dec_to_percentage(self.optimal_utilization_rate),
            self.plateau_interest_rate,
            self.max_interest_rate,
        )
    }

    /// Point-in-time APRs at `utilization` (decimal).
    ///
    /// * `lending = base * utilization`
    /// * `borrowing = base * (1 + rate fees) + fixed fees`
    pub fn calc_interest_rate(&self, utilization: f64) -> ComputedInterestRates {
        let utilization = if utilization.is_finite() {
            utilization.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let base_rate_apr = self
            .plateau_curve()
            .borrow_apr(dec_to_percentage(utilization));

        ComputedInterestRates {
            base_rate_apr,
            lending_rate_apr: base_rate_apr * utilization,
            borrowing_rate_apr: base_rate_apr * (1.0 + self.fees.total_rate_fee())
                + self.fees.total_fixed_fee(),
        }
    }

    /// Point-in-time APYs at `utilization`, compounded hourly.
    pub fn current_apys(&self, utilization: f64) -> Apys {
        let ComputedInterestRates {
            lending_rate_apr,
            borrowing_rate_apr,
            ..
        } = self.calc_interest_rate(utilization);

        Apys {
            lending_apy: apr_to_apy(lending_rate_apr, HOURS_PER_YEAR),
            borrow_apy: apr_to_apy(borrowing_rate_apr, HOURS_PER_YEAR),
        }
    }
}
