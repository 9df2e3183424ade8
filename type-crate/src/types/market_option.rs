use super::ProtocolDataRow;

/// Key identifying a (protocol, token) market in the comparison view.
pub fn market_key(protocol: &str, token: &str) -> String {
    format!("{}_{}", protocol, token)
}

/// One selectable market in the comparison view, projected from the aggregated rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOption {
    /// `"<protocol>_<token>"`
    pub key: String,
    pub protocol: String,
    pub token: String,
    pub row: ProtocolDataRow,
}

impl MarketOption {
    pub fn from_row(row: &ProtocolDataRow) -> Self {
        Self {
            key: row.market_key(),
            protocol: row.protocol.clone(),
            token: row.token.clone(),
            row: row.clone(),
        }
    }

    pub fn is_protocol(&self, protocol: &str) -> bool {
        self.protocol.eq_ignore_ascii_case(protocol)
    }
}
