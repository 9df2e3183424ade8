use std::path::Path;

use ratestypecrate::types::{TokenData, TokenRegistry};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::IndexerError;

/// Parses `{ "<bankAddress>": { "category", "tokenAddress", "tokenSymbol" }, ... }`, keeping the
/// file's key order.
pub fn parse_token_registry(json: &str) -> Result<TokenRegistry, IndexerError> {
    let entries: Map<String, Value> = serde_json::from_str(json)?;

    entries
        .into_iter()
        .map(|(key, value)| -> Result<_, IndexerError> {
            Ok((key, serde_json::from_value::<TokenData>(value)?))
        })
        .collect()
}

pub async fn load_token_registry(path: impl AsRef<Path>) -> Result<TokenRegistry, IndexerError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path).await?;
    let registry = parse_token_registry(&json)?;
    info!("Loaded {} tokens from {:?}", registry.len(), path);

    Ok(registry)
}
