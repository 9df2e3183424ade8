//! Protocol integrations turn raw market state into [`ProtocolDataRow`]s.
//!
//! Market state is reached through narrow source traits, so the rate math never depends on the
//! shape of an SDK or account layout. Each source hands out plain structs carrying only the
//! fields the rate models read.

pub mod kamino;
pub mod marginfi;

use std::str::FromStr;

use async_trait::async_trait;
use rates_engine::{
    kamino::{KaminoRateInputs, ReserveBalances},
    marginfi::MarginfiRateInputs,
};
use ratestypecrate::types::{ProtocolDataRow, TokenRegistry};
use solana_sdk::pubkey::Pubkey;

use crate::{context::AggregationContext, error::IndexerError};

pub use kamino::KaminoIntegration;
pub use marginfi::MarginfiIntegration;

#[async_trait]
pub trait ProtocolIntegration: Send + Sync {
    fn name(&self) -> &str;

    /// Rows for every registry token this protocol lists.
    ///
    /// Tokens that fail individually are logged and left out. An `Err` means the whole protocol
    /// could not be read.
    async fn fetch_rows(
        &self,
        ctx: &AggregationContext,
        registry: &TokenRegistry,
    ) -> Result<Vec<ProtocolDataRow>, IndexerError>;
}

/// Kamino reserve state needed to build a row.
#[derive(Debug, Clone, PartialEq)]
pub struct KaminoReserve {
    pub mint: Pubkey,
    pub mint_decimals: u32,
    /// Native units.
    pub balances: ReserveBalances,
    pub loan_to_value_pct: f64,
    pub borrow_factor_pct: f64,
    pub rates: KaminoRateInputs,
}

#[async_trait]
pub trait KaminoMarketSource: Send + Sync {
    type Market: KaminoMarketHandle;

    async fn load_market(&self, address: &Pubkey) -> Result<Option<Self::Market>, IndexerError>;

    async fn current_slot(&self) -> Result<u64, IndexerError>;
}

#[async_trait]
pub trait KaminoMarketHandle: Send + Sync {
    async fn load_reserves(&mut self) -> Result<(), IndexerError>;

    async fn reserve_by_mint(&self, mint: &Pubkey) -> Result<Option<KaminoReserve>, IndexerError>;
}

/// Marginfi bank state needed to build a row.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginfiBank {
    pub address: Pubkey,
    pub mint_decimals: u32,
    /// Native units.
    pub total_asset_quantity: f64,
    /// Native units.
    pub total_liability_quantity: f64,
    pub asset_weight_init: f64,
    pub liability_weight_init: f64,
    /// Includes the program-wide fees of the group's fee state.
    pub rates: MarginfiRateInputs,
}

#[async_trait]
pub trait MarginfiGroupSource: Send + Sync {
    type Group: MarginfiGroupHandle;

    async fn load_group(&self) -> Result<Self::Group, IndexerError>;
}

#[async_trait]
pub trait MarginfiGroupHandle: Send + Sync {
    async fn bank_by_address(&self, address: &Pubkey)
        -> Result<Option<MarginfiBank>, IndexerError>;
}

/// `10^decimals`, the native units per whole token.
pub fn mint_factor(decimals: u32) -> Result<f64, IndexerError> {
    let exponent = i32::try_from(decimals).map_err(|_| IndexerError::InvalidMintFactor(decimals))?;
    let factor = 10f64.powi(exponent);
    if !factor.is_finite() || factor == 0.0 {
        return Err(IndexerError::InvalidMintFactor(decimals));
    }
    Ok(factor)
}

pub(crate) fn parse_address(address: &str) -> Result<Pubkey, IndexerError> {
    Pubkey::from_str(address).map_err(|_| IndexerError::InvalidAddress(address.to_string()))
}
