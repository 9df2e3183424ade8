/// Converts an APR (decimal) into an APY compounded `periods_per_year` times a year.
///
/// `(1 + apr / n)^n - 1`, evaluated as `expm1(n * ln1p(apr / n))` so per-slot and per-minute
/// compounding of small rates keeps its precision.
pub fn apr_to_apy(apr: f64, periods_per_year: f64) -> f64 {
    if periods_per_year <= 0.0 {
        return apr;
    }
    (periods_per_year * (apr / periods_per_year).ln_1p()).exp_m1()
}

/// Decimal (0.072) to percent units (7.2).
pub fn dec_to_percentage(dec: f64) -> f64 {
    dec * 100.
}
