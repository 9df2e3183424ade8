/// Basis-point denominator used by segmented-breakpoint (Kamino) curves: 100% = 10_000 bps.
pub const ONE_HUNDRED_PCT_IN_BPS: u32 = 10_000;

pub const SECONDS_PER_YEAR: f64 = 31_536_000.0;
pub const HOURS_PER_YEAR: f64 = 8_760.0;
/// Minute-level compounding used when sampling plateau/max (Marginfi) curves.
pub const MINUTES_PER_YEAR: f64 = 525_600.0;

/// Kamino settles interest per slot, targeting 2 slots per second.
pub const KAMINO_SLOTS_PER_SECOND: f64 = 2.0;
pub const KAMINO_SLOTS_PER_YEAR: f64 = KAMINO_SLOTS_PER_SECOND * SECONDS_PER_YEAR;

/// Number of utilization samples per curve (0%, 1%, ..., 100%).
pub const DEFAULT_CURVE_POINTS: usize = 101;
/// Decimals kept when building the utilization grid.
pub const GRID_DECIMALS: i32 = 6;

/// Optimal utilization used for a token when no Marginfi bank published one during the run.
pub const DEFAULT_OPTIMAL_UTILIZATION: f64 = 0.8;

/// Floor for denominators in curve math.
pub const CURVE_EPSILON: f64 = 1e-9;

pub const MARGINFI_PROTOCOL: &str = "Marginfi";
pub const KAMINO_PROTOCOL: &str = "Kamino";

/// Kamino main lending market.
pub const KAMINO_MAIN_MARKET: &str = "7u3HeHxYDLhnCoErrtycNokbQYbWGzLs6JSDqGAv5PfF";
