use rates_engine::RateError;
use solana_client::client_error::ClientError;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Market {0} not found")]
    MarketNotFound(Pubkey),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid mint factor for {0} decimals")]
    InvalidMintFactor(u32),

    #[error("Market source error: {0}")]
    Source(String),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("Invalid market snapshot: {0}")]
    Snapshot(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] ClientError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
