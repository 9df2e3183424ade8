use std::collections::HashSet;

use async_trait::async_trait;
use rates_engine::marginfi::{MarginfiFees, MarginfiRateInputs};
use rates_indexer::{
    error::IndexerError,
    integrations::{MarginfiBank, MarginfiGroupHandle, MarginfiGroupSource},
};
use solana_sdk::pubkey::Pubkey;

/// Marginfi bank at 50% utilization with the given optimal utilization.
pub fn marginfi_bank(address: Pubkey, decimals: u32, optimal_utilization: f64) -> MarginfiBank {
    let one_token = 10f64.powi(decimals as i32);
    MarginfiBank {
        address,
        mint_decimals: decimals,
        total_asset_quantity: 1_000.0 * one_token,
        total_liability_quantity: 500.0 * one_token,
        asset_weight_init: 0.8,
        liability_weight_init: 1.25,
        rates: MarginfiRateInputs {
            optimal_utilization_rate: optimal_utilization,
            plateau_interest_rate: 0.1,
            max_interest_rate: 1.5,
            fees: MarginfiFees {
                insurance_ir_fee: 0.01,
                protocol_ir_fee: 0.04,
                protocol_fixed_fee_apr: 0.005,
                ..Default::default()
            },
        },
    }
}

/// In-memory Marginfi group with injectable failures.
#[derive(Debug, Clone, Default)]
pub struct MockMarginfiSource {
    pub banks: Vec<MarginfiBank>,
    /// Lookups for these banks fail.
    pub failing_banks: HashSet<Pubkey>,
    /// `load_group` fails.
    pub fail_load: bool,
}

impl MockMarginfiSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bank(mut self, bank: MarginfiBank) -> Self {
        self.banks.push(bank);
        self
    }

    pub fn with_failing_bank(mut self, address: Pubkey) -> Self {
        self.failing_banks.insert(address);
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }
}

pub struct MockMarginfiGroup {
    source: MockMarginfiSource,
}

#[async_trait]
impl MarginfiGroupSource for MockMarginfiSource {
    type Group = MockMarginfiGroup;

    async fn load_group(&self) -> Result<Self::Group, IndexerError> {
        if self.fail_load {
            return Err(IndexerError::Source("injected group load failure".to_string()));
        }
        Ok(MockMarginfiGroup {
            source: self.clone(),
        })
    }
}

#[async_trait]
impl MarginfiGroupHandle for MockMarginfiGroup {
    async fn bank_by_address(
        &self,
        address: &Pubkey,
    ) -> Result<Option<MarginfiBank>, IndexerError> {
        if self.source.failing_banks.contains(address) {
            return Err(IndexerError::Source(format!(
                "injected lookup failure for {}",
                address
            )));
        }
        Ok(self
            .source
            .banks
            .iter()
            .find(|bank| &bank.address == address)
            .cloned())
    }
}
