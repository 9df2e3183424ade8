//! Market state read from a JSON snapshot file.
//!
//! ```json
//! {
//!   "slot": 300000000,
//!   "kamino": { "market": "<pubkey>", "reserves": [ { "mint": "<pubkey>", ... } ] },
//!   "marginfi": { "group": "<pubkey>", "programFees": { ... }, "banks": [ ... ] }
//! }
//! ```
//!
//! Amounts are native units, rates are decimals unless the field name says otherwise.

use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use rates_engine::{
    kamino::{BorrowRateCurvePoint, KaminoRateInputs, ReserveBalances},
    marginfi::{MarginfiFees, MarginfiRateInputs},
};
use ratestypecrate::constants::ONE_HUNDRED_PCT_IN_BPS;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::{
    clock::RpcSlotClock,
    error::IndexerError,
    integrations::{
        KaminoMarketHandle, KaminoMarketSource, KaminoReserve, MarginfiBank, MarginfiGroupHandle,
        MarginfiGroupSource,
    },
    serde_helpers::field_as_string,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub slot: u64,
    #[serde(default)]
    pub kamino: Option<KaminoMarketRecord>,
    #[serde(default)]
    pub marginfi: Option<MarginfiGroupRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaminoMarketRecord {
    #[serde(with = "field_as_string")]
    pub market: Pubkey,
    pub reserves: Vec<KaminoReserveRecord>,
}

fn default_slot_adjustment_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KaminoReserveRecord {
    #[serde(with = "field_as_string")]
    pub mint: Pubkey,
    pub mint_decimals: u32,
    pub total_supply: f64,
    pub borrowed_amount: f64,
    pub last_update_slot: u64,
    pub loan_to_value_pct: f64,
    pub borrow_factor_pct: f64,
    pub protocol_take_rate_pct: f64,
    pub host_fixed_interest_rate_bps: u32,
    #[serde(default = "default_slot_adjustment_factor")]
    pub slot_adjustment_factor: f64,
    pub borrow_rate_curve: Vec<BorrowRateCurvePoint>,
}

impl From<&KaminoReserveRecord> for KaminoReserve {
    fn from(record: &KaminoReserveRecord) -> Self {
        KaminoReserve {
            mint: record.mint,
            mint_decimals: record.mint_decimals,
            balances: ReserveBalances {
                total_supply: record.total_supply,
                borrowed_amount: record.borrowed_amount,
                last_update_slot: record.last_update_slot,
            },
            loan_to_value_pct: record.loan_to_value_pct,
            borrow_factor_pct: record.borrow_factor_pct,
            rates: KaminoRateInputs {
                protocol_take_rate_pct: record.protocol_take_rate_pct,
                borrow_rate_curve: record.borrow_rate_curve.clone(),
                slot_adjustment_factor: record.slot_adjustment_factor,
                fixed_host_interest_rate: record.host_fixed_interest_rate_bps as f64
                    / ONE_HUNDRED_PCT_IN_BPS as f64,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginfiGroupRecord {
    #[serde(with = "field_as_string")]
    pub group: Pubkey,
    #[serde(default)]
    pub program_fees: ProgramFeesRecord,
    pub banks: Vec<MarginfiBankRecord>,
}

/// Program-wide fees from the global fee state, charted on top of every bank's own fees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramFeesRecord {
    pub program_fee_rate: f64,
    pub program_fee_fixed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginfiBankRecord {
    #[serde(with = "field_as_string")]
    pub address: Pubkey,
    pub mint_decimals: u32,
    pub total_asset_quantity: f64,
    pub total_liability_quantity: f64,
    pub asset_weight_init: f64,
    pub liability_weight_init: f64,
    pub interest_rate_config: InterestRateConfigRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRateConfigRecord {
    pub optimal_utilization_rate: f64,
    pub plateau_interest_rate: f64,
    pub max_interest_rate: f64,
    #[serde(default)]
    pub insurance_ir_fee: f64,
    #[serde(default)]
    pub insurance_fee_fixed_apr: f64,
    #[serde(default)]
    pub protocol_ir_fee: f64,
    #[serde(default)]
    pub protocol_fixed_fee_apr: f64,
}

impl MarginfiBankRecord {
    fn to_bank(&self, program_fees: &ProgramFeesRecord) -> MarginfiBank {
        let config = &self.interest_rate_config;
        MarginfiBank {
            address: self.address,
            mint_decimals: self.mint_decimals,
            total_asset_quantity: self.total_asset_quantity,
            total_liability_quantity: self.total_liability_quantity,
            asset_weight_init: self.asset_weight_init,
            liability_weight_init: self.liability_weight_init,
            rates: MarginfiRateInputs {
                optimal_utilization_rate: config.optimal_utilization_rate,
                plateau_interest_rate: config.plateau_interest_rate,
                max_interest_rate: config.max_interest_rate,
                fees: MarginfiFees {
                    insurance_ir_fee: config.insurance_ir_fee,
                    insurance_fixed_fee_apr: config.insurance_fee_fixed_apr,
                    protocol_ir_fee: config.protocol_ir_fee,
                    protocol_fixed_fee_apr: config.protocol_fixed_fee_apr,
                    program_fee_rate: program_fees.program_fee_rate,
                    program_fee_fixed: program_fees.program_fee_fixed,
                },
            },
        }
    }
}

impl MarketSnapshot {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IndexerError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let snapshot = Self::from_slice(&bytes)?;
        info!("Loaded market snapshot {:?} at slot {}", path, snapshot.slot);

        Ok(snapshot)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, IndexerError> {
        serde_json::from_slice(bytes).map_err(|e| IndexerError::Snapshot(e.to_string()))
    }
}

/// Serves both protocols from one [`MarketSnapshot`].
///
/// The current slot comes from the snapshot unless a [`RpcSlotClock`] is attached.
#[derive(Clone)]
pub struct SnapshotSource {
    snapshot: Arc<MarketSnapshot>,
    slot_clock: Option<RpcSlotClock>,
}

impl SnapshotSource {
    pub fn new(snapshot: MarketSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            slot_clock: None,
        }
    }

    pub fn with_slot_clock(mut self, slot_clock: RpcSlotClock) -> Self {
        self.slot_clock = Some(slot_clock);
        self
    }
}

pub struct SnapshotKaminoMarket {
    snapshot: Arc<MarketSnapshot>,
    reserves: Option<HashMap<Pubkey, KaminoReserve>>,
}

#[async_trait]
impl KaminoMarketSource for SnapshotSource {
    type Market = SnapshotKaminoMarket;

    async fn load_market(&self, address: &Pubkey) -> Result<Option<Self::Market>, IndexerError> {
        let found = self
            .snapshot
            .kamino
            .as_ref()
            .is_some_and(|kamino| &kamino.market == address);

        Ok(found.then(|| SnapshotKaminoMarket {
            snapshot: self.snapshot.clone(),
            reserves: None,
        }))
    }

    async fn current_slot(&self) -> Result<u64, IndexerError> {
        match &self.slot_clock {
            Some(clock) => clock.get_slot().await,
            None => Ok(self.snapshot.slot),
        }
    }
}

#[async_trait]
impl KaminoMarketHandle for SnapshotKaminoMarket {
    async fn load_reserves(&mut self) -> Result<(), IndexerError> {
        let kamino = self
            .snapshot
            .kamino
            .as_ref()
            .ok_or_else(|| IndexerError::Snapshot("no kamino market".to_string()))?;

        self.reserves = Some(
            kamino
                .reserves
                .iter()
                .map(|record| (record.mint, KaminoReserve::from(record)))
                .collect(),
        );
        Ok(())
    }

    async fn reserve_by_mint(&self, mint: &Pubkey) -> Result<Option<KaminoReserve>, IndexerError> {
        let reserves = self
            .reserves
            .as_ref()
            .ok_or_else(|| IndexerError::Source("Kamino reserves not loaded".to_string()))?;
        Ok(reserves.get(mint).cloned())
    }
}

pub struct SnapshotMarginfiGroup {
    snapshot: Arc<MarketSnapshot>,
}

#[async_trait]
impl MarginfiGroupSource for SnapshotSource {
    type Group = SnapshotMarginfiGroup;

    async fn load_group(&self) -> Result<Self::Group, IndexerError> {
        if self.snapshot.marginfi.is_none() {
            return Err(IndexerError::Snapshot("no marginfi group".to_string()));
        }
        Ok(SnapshotMarginfiGroup {
            snapshot: self.snapshot.clone(),
        })
    }
}

#[async_trait]
impl MarginfiGroupHandle for SnapshotMarginfiGroup {
    async fn bank_by_address(
        &self,
        address: &Pubkey,
    ) -> Result<Option<MarginfiBank>, IndexerError> {
        let group = self
            .snapshot
            .marginfi
            .as_ref()
            .ok_or_else(|| IndexerError::Snapshot("no marginfi group".to_string()))?;

        Ok(group
            .banks
            .iter()
            .find(|bank| &bank.address == address)
            .map(|bank| bank.to_bank(&group.program_fees)))
    }
}
