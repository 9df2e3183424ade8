use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError, RwLock},
};

use rates_engine::grid::percent_grid;
use ratestypecrate::{
    constants::{DEFAULT_CURVE_POINTS, DEFAULT_OPTIMAL_UTILIZATION},
    types::TransformedCurve,
};
use tracing::debug;

use crate::config::OverrideTable;

/// State shared by the protocol integrations for the duration of one aggregation run.
///
/// Optimal utilization published by one protocol is read by another for the same token symbol.
/// Writers may race and the last write wins. Readers never wait: a value not published yet
/// resolves to the configured default.
#[derive(Debug)]
pub struct AggregationContext {
    grid: Vec<f64>,
    default_optimal_utilization: f64,
    overrides: OverrideTable,
    optimal_utilization: RwLock<HashMap<String, f64>>,
    borrow_curves: Mutex<Vec<(String, TransformedCurve)>>,
}

impl Default for AggregationContext {
    fn default() -> Self {
        Self::new(
            percent_grid(DEFAULT_CURVE_POINTS as f64),
            DEFAULT_OPTIMAL_UTILIZATION,
            OverrideTable::default(),
        )
    }
}

impl AggregationContext {
    pub fn new(grid: Vec<f64>, default_optimal_utilization: f64, overrides: OverrideTable) -> Self {
        Self {
            grid,
            default_optimal_utilization,
            overrides,
            optimal_utilization: RwLock::new(HashMap::new()),
            borrow_curves: Mutex::new(Vec::new()),
        }
    }

    /// Utilization knots, in percent, every curve is sampled at.
    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn publish_optimal_utilization(&self, symbol: &str, value: f64) {
        if !value.is_finite() {
            debug!("Ignoring non-finite optimal utilization for {}", symbol);
            return;
        }
        self.optimal_utilization
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), value);
    }

    /// Configured override, else the published value, else the default.
    pub fn optimal_utilization(&self, symbol: &str) -> f64 {
        if let Some(value) = self.overrides.get(symbol) {
            return value;
        }

        self.optimal_utilization
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .copied()
            .unwrap_or(self.default_optimal_utilization)
    }

    pub fn record_borrow_curve(&self, symbol: &str, curve: TransformedCurve) {
        let mut curves = self
            .borrow_curves
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match curves.iter_mut().find(|(s, _)| s.as_str() == symbol) {
            Some((_, existing)) => *existing = curve,
            None => curves.push((symbol.to_string(), curve)),
        }
    }

    /// Borrow curves recorded so far, in recording order.
    pub fn borrow_curves(&self) -> Vec<(String, TransformedCurve)> {
        self.borrow_curves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
