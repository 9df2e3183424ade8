use serde::Serialize;

use super::CurveVectors;

/// Point-in-time snapshot of one (protocol, token) market.
///
/// All numeric fields are fractions (0.072 = 7.2%), except `liquidity` which is in native token
/// units. Missing values are `NaN`, never absent, so consumers only have one failure
/// representation to handle. Note `serde_json` emits non-finite floats as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDataRow {
    pub protocol: String,
    pub token: String,
    /// Supplied minus borrowed
    pub liquidity: f64,
    pub current_utilization: f64,
    /// Target/optimal utilization of the rate curve
    pub optimal_utilization: f64,
    pub plateau_rate: f64,
    pub max_rate: f64,
    /// Current lending APY
    pub lending_rate: f64,
    /// Current borrowing APY
    pub borrowing_rate: f64,
    pub collateral_weight: f64,
    pub liability_weight: f64,
    /// `1 / liability_weight`
    pub ltv: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curves: Option<CurveVectors>,
}

impl ProtocolDataRow {
    pub fn market_key(&self) -> String {
        super::market_key(&self.protocol, &self.token)
    }

    pub fn with_curves(mut self, curves: Option<CurveVectors>) -> Self {
        self.curves = curves;
        self
    }
}

/// Row values as reported by a protocol adapter, any of which may be unavailable.
#[derive(Debug, Clone, Default)]
pub struct RowValues {
    pub liquidity: Option<f64>,
    pub current_utilization: Option<f64>,
    pub optimal_utilization: Option<f64>,
    pub plateau_rate: Option<f64>,
    pub max_rate: Option<f64>,
    pub lending_rate: Option<f64>,
    pub borrowing_rate: Option<f64>,
    pub collateral_weight: Option<f64>,
    pub liability_weight: Option<f64>,
}

impl RowValues {
    /// Builds the canonical row, normalizing every missing value to `NaN`.
    /// `ltv` is derived from the liability weight.
    pub fn into_row(self, protocol: &str, token: &str) -> ProtocolDataRow {
        let nan = |value: Option<f64>| value.unwrap_or(f64::NAN);
        let liability_weight = nan(self.liability_weight);

        ProtocolDataRow {
            protocol: protocol.to_string(),
            token: token.to_string(),
            liquidity: nan(self.liquidity),
            current_utilization: nan(self.current_utilization),
            optimal_utilization: nan(self.optimal_utilization),
            plateau_rate: nan(self.plateau_rate),
            max_rate: nan(self.max_rate),
            lending_rate: nan(self.lending_rate),
            borrowing_rate: nan(self.borrowing_rate),
            collateral_weight: nan(self.collateral_weight),
            liability_weight,
            ltv: 1.0 / liability_weight,
            curves: None,
        }
    }
}
