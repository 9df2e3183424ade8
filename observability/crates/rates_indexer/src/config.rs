use std::{collections::HashMap, str::FromStr};

use envconfig::Envconfig;
use thiserror::Error;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    /// Current slot is read from here when set, otherwise from the market snapshot.
    #[envconfig(from = "RPC_URL")]
    pub rpc_url: Option<String>,
    #[envconfig(from = "MARKET_SNAPSHOT_PATH")]
    pub market_snapshot_path: String,
    #[envconfig(from = "TOKEN_REGISTRY_PATH")]
    pub token_registry_path: Option<String>,
    #[envconfig(from = "CURVE_POINTS", default = "101")]
    pub curve_points: usize,
    #[envconfig(from = "DEFAULT_OPTIMAL_UTILIZATION", default = "0.8")]
    pub default_optimal_utilization: f64,
    #[envconfig(from = "OPTIMAL_UTILIZATION_OVERRIDES")]
    pub optimal_utilization_overrides: Option<OverrideTable>,
    #[envconfig(from = "DEBUG_CURVE_LOG_DIR")]
    pub debug_curve_log_dir: Option<String>,
    #[envconfig(from = "DEPLOY_ENV")]
    pub deploy_env: Option<String>,
    #[envconfig(from = "OUTPUT_PATH")]
    pub output_path: Option<String>,
    #[envconfig(from = "PRETTY_LOGS")]
    pub pretty_logs: Option<bool>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.deploy_env
            .as_deref()
            .is_some_and(|env| env.eq_ignore_ascii_case("production"))
    }
}

/// Per-token optimal utilization, parsed from `SYMBOL=value` pairs separated by commas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable(HashMap<String, f64>);

impl OverrideTable {
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.0.get(symbol).copied()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, value: f64) {
        self.0.insert(symbol.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid optimal utilization override: {0:?}")]
pub struct OverrideParseError(String);

impl FromStr for OverrideTable {
    type Err = OverrideParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut table = OverrideTable::default();

        for pair in s.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            let (symbol, value) = pair
                .split_once('=')
                .ok_or_else(|| OverrideParseError(pair.to_string()))?;
            let symbol = symbol.trim();
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| OverrideParseError(pair.to_string()))?;

            if symbol.is_empty() || !(0.0..=1.0).contains(&value) {
                return Err(OverrideParseError(pair.to_string()));
            }
            table.insert(symbol, value);
        }

        Ok(table)
    }
}
