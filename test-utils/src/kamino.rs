use std::collections::HashSet;

use async_trait::async_trait;
use rates_engine::kamino::{BorrowRateCurvePoint, KaminoRateInputs, ReserveBalances};
use rates_indexer::{
    error::IndexerError,
    integrations::{KaminoMarketHandle, KaminoMarketSource, KaminoReserve},
};
use solana_sdk::pubkey::Pubkey;

/// Kamino reserve with a 0% -> 8% -> 50% curve (kink at 80% utilization).
pub fn kamino_reserve(mint: Pubkey, decimals: u32, total_supply: f64, borrowed: f64) -> KaminoReserve {
    KaminoReserve {
        mint,
        mint_decimals: decimals,
        balances: ReserveBalances {
            total_supply,
            borrowed_amount: borrowed,
            last_update_slot: 0,
        },
        loan_to_value_pct: 75.0,
        borrow_factor_pct: 100.0,
        rates: KaminoRateInputs {
            protocol_take_rate_pct: 10.0,
            borrow_rate_curve: vec![
                BorrowRateCurvePoint::new(0, 0),
                BorrowRateCurvePoint::new(8_000, 800),
                BorrowRateCurvePoint::new(10_000, 5_000),
                BorrowRateCurvePoint::new(10_000, 5_000),
            ],
            slot_adjustment_factor: 1.0,
            fixed_host_interest_rate: 0.0,
        },
    }
}

/// In-memory Kamino market with injectable failures.
#[derive(Debug, Clone, Default)]
pub struct MockKaminoSource {
    pub market: Pubkey,
    pub reserves: Vec<KaminoReserve>,
    pub slot: u64,
    /// Lookups for these mints fail.
    pub failing_mints: HashSet<Pubkey>,
    /// `load_market` reports the market as absent.
    pub missing_market: bool,
    /// `load_reserves` fails.
    pub fail_reserve_load: bool,
}

impl MockKaminoSource {
    pub fn new(market: Pubkey) -> Self {
        Self {
            market,
            ..Default::default()
        }
    }

    pub fn with_reserve(mut self, reserve: KaminoReserve) -> Self {
        self.reserves.push(reserve);
        self
    }

    pub fn with_failing_mint(mut self, mint: Pubkey) -> Self {
        self.failing_mints.insert(mint);
        self
    }

    pub fn with_slot(mut self, slot: u64) -> Self {
        self.slot = slot;
        self
    }

    pub fn missing_market(mut self) -> Self {
        self.missing_market = true;
        self
    }

    pub fn failing_reserve_load(mut self) -> Self {
        self.fail_reserve_load = true;
        self
    }
}

pub struct MockKaminoMarket {
    source: MockKaminoSource,
    loaded: bool,
}

#[async_trait]
impl KaminoMarketSource for MockKaminoSource {
    type Market = MockKaminoMarket;

    async fn load_market(&self, address: &Pubkey) -> Result<Option<Self::Market>, IndexerError> {
        if self.missing_market || address != &self.market {
            return Ok(None);
        }
        Ok(Some(MockKaminoMarket {
            source: self.clone(),
            loaded: false,
        }))
    }

    async fn current_slot(&self) -> Result<u64, IndexerError> {
        Ok(self.slot)
    }
}

#[async_trait]
impl KaminoMarketHandle for MockKaminoMarket {
    async fn load_reserves(&mut self) -> Result<(), IndexerError> {
        if self.source.fail_reserve_load {
            return Err(IndexerError::Source("injected reserve load failure".to_string()));
        }
        self.loaded = true;
        Ok(())
    }

    async fn reserve_by_mint(&self, mint: &Pubkey) -> Result<Option<KaminoReserve>, IndexerError> {
        if !self.loaded {
            return Err(IndexerError::Source("reserves not loaded".to_string()));
        }
        if self.source.failing_mints.contains(mint) {
            return Err(IndexerError::Source(format!("injected lookup failure for {}", mint)));
        }
        Ok(self
            .source
            .reserves
            .iter()
            .find(|reserve| &reserve.mint == mint)
            .cloned())
    }
}
