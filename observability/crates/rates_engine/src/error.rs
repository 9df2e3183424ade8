use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    #[error("Invalid borrow rate curve, degenerate curve with {0} point(s)")]
    DegenerateCurve(usize),

    #[error("Invalid borrow rate curve, non-monotonic curve between points {0} and {1}")]
    NonMonotonicCurve(usize, usize),

    #[error("Cannot extrapolate utilization {utilization} outside of curve domain [{start}, {end}]")]
    Extrapolation {
        utilization: f64,
        start: f64,
        end: f64,
    },

    #[error("Invalid curve breakpoint at index {index}: {utilization_bps} bps utilization")]
    InvalidBreakpoint { index: usize, utilization_bps: u32 },

    #[error("Invalid utilization: {0}")]
    InvalidUtilization(f64),
}
