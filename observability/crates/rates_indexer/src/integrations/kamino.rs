use std::str::FromStr;

use async_trait::async_trait;
use futures::future::join_all;
use rates_engine::vectors::build_vectors;
use ratestypecrate::{
    constants::{KAMINO_MAIN_MARKET, KAMINO_PROTOCOL},
    types::{ProtocolDataRow, RowValues, TokenData, TokenRegistry, TransformedCurve},
};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use super::{
    mint_factor, parse_address, KaminoMarketHandle, KaminoMarketSource, KaminoReserve,
    ProtocolIntegration,
};
use crate::{context::AggregationContext, error::IndexerError};

/// Rows for one Kamino lending market, rated with the segmented-breakpoint model.
pub struct KaminoIntegration<S> {
    source: S,
    market: Pubkey,
}

impl<S: KaminoMarketSource> KaminoIntegration<S> {
    pub fn new(source: S, market: Pubkey) -> Self {
        Self { source, market }
    }

    pub fn main_market(source: S) -> Result<Self, IndexerError> {
        let market = Pubkey::from_str(KAMINO_MAIN_MARKET)
            .map_err(|_| IndexerError::InvalidAddress(KAMINO_MAIN_MARKET.to_string()))?;
        Ok(Self::new(source, market))
    }

    async fn token_row(
        &self,
        ctx: &AggregationContext,
        market: &S::Market,
        token: &TokenData,
        current_slot: u64,
    ) -> Result<Option<ProtocolDataRow>, IndexerError> {
        let mint = parse_address(&token.token_address)?;
        let Some(reserve) = market.reserve_by_mint(&mint).await? else {
            warn!("No Kamino reserve for {} ({})", token.token_symbol, mint);
            return Ok(None);
        };

        build_row(ctx, &reserve, &token.token_symbol, current_slot).map(Some)
    }
}

fn build_row(
    ctx: &AggregationContext,
    reserve: &KaminoReserve,
    symbol: &str,
    current_slot: u64,
) -> Result<ProtocolDataRow, IndexerError> {
    let factor = mint_factor(reserve.mint_decimals)?;
    let rates = &reserve.rates;

    let total_supply = reserve.balances.total_supply / factor;
    let borrowed = reserve.balances.borrowed_amount / factor;
    let liability_weight = reserve.borrow_factor_pct / 100.0;

    // Charted against the Marginfi optimal utilization of the same token.
    let optimal_utilization = ctx.optimal_utilization(symbol);
    let plateau = rates.compute_apys(optimal_utilization)?;
    let max = rates.compute_apys(1.0)?;
    let current = rates.current_apys(&reserve.balances, current_slot)?;

    // Only curves of rows that are actually emitted end up in the debug log.
    let truncated_curve = rates.truncated_curve()?;
    ctx.record_borrow_curve(symbol, TransformedCurve::from(truncated_curve.as_slice()));

    let curves = match build_vectors(rates, ctx.grid()) {
        Ok(curves) => Some(curves),
        Err(e) => {
            warn!("Failed to sample Kamino curves for {}: {}", symbol, e);
            None
        }
    };

    Ok(RowValues {
        liquidity: Some(total_supply - borrowed),
        current_utilization: Some(reserve.balances.utilization()),
        optimal_utilization: Some(optimal_utilization),
        plateau_rate: Some(plateau.borrow_apy),
        max_rate: Some(max.borrow_apy),
        lending_rate: Some(current.lending_apy),
        borrowing_rate: Some(current.borrow_apy),
        collateral_weight: Some(reserve.loan_to_value_pct / 100.0),
        liability_weight: Some(liability_weight),
    }
    .into_row(KAMINO_PROTOCOL, symbol)
    .with_curves(curves))
}

#[async_trait]
impl<S: KaminoMarketSource> ProtocolIntegration for KaminoIntegration<S> {
    fn name(&self) -> &str {
        KAMINO_PROTOCOL
    }

    async fn fetch_rows(
        &self,
        ctx: &AggregationContext,
        registry: &TokenRegistry,
    ) -> Result<Vec<ProtocolDataRow>, IndexerError> {
        let mut market = self
            .source
            .load_market(&self.market)
            .await?
            .ok_or(IndexerError::MarketNotFound(self.market))?;
        market.load_reserves().await?;
        let current_slot = self.source.current_slot().await?;
        debug!("Loaded Kamino market {} at slot {}", self.market, current_slot);

        let market = &market;
        let rows = join_all(registry.iter().map(|entry| async move {
            match self.token_row(ctx, market, &entry.data, current_slot).await {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping Kamino {}: {}", entry.data.token_symbol, e);
                    None
                }
            }
        }))
        .await;

        let rows: Vec<_> = rows.into_iter().flatten().collect();
        info!("Computed {} Kamino rows", rows.len());

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverrideTable;
    use rates_engine::kamino::{BorrowRateCurvePoint, KaminoRateInputs, ReserveBalances};
    use ratestypecrate::assert_eq_with_tolerance;

    fn reserve() -> KaminoReserve {
        KaminoReserve {
            mint: Pubkey::new_unique(),
            mint_decimals: 6,
            balances: ReserveBalances {
                total_supply: 1_000_000_000.0,
                borrowed_amount: 400_000_000.0,
                last_update_slot: 10,
            },
            loan_to_value_pct: 75.0,
            borrow_factor_pct: 125.0,
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

    #[test]
    fn row_is_in_whole_tokens_and_fractions() {
        let ctx = AggregationContext::new(vec![0.0, 50.0, 100.0], 0.8, OverrideTable::default());
        let row = build_row(&ctx, &reserve(), "USDC", 10).unwrap();

        assert_eq!(row.protocol, "Kamino");
        assert_eq!(row.liquidity, 600.0);
        assert_eq!(row.current_utilization, 0.4);
        assert_eq!(row.optimal_utilization, 0.8);
        assert_eq!(row.collateral_weight, 0.75);
        assert_eq!(row.liability_weight, 1.25);
        assert_eq!(row.ltv, 0.8);
        assert_eq_with_tolerance!(row.plateau_rate, 0.08f64.exp_m1(), 1e-6);
        assert_eq_with_tolerance!(row.max_rate, 0.5f64.exp_m1(), 1e-6);
        assert!(row.lending_rate < row.borrowing_rate);
        assert_eq!(row.curves.as_ref().map(|c| c.len()), Some(3));
    }

    #[test]
    fn row_follows_published_optimal_utilization() {
        let ctx = AggregationContext::new(vec![0.0, 100.0], 0.8, OverrideTable::default());
        ctx.publish_optimal_utilization("USDC", 0.4);

        let row = build_row(&ctx, &reserve(), "USDC", 10).unwrap();
        assert_eq!(row.optimal_utilization, 0.4);
        assert_eq_with_tolerance!(row.plateau_rate, 0.04f64.exp_m1(), 1e-6);
    }

    #[test]
    fn truncated_curve_is_recorded() {
        let ctx = AggregationContext::default();
        build_row(&ctx, &reserve(), "USDC", 10).unwrap();

        let curves = ctx.borrow_curves();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].0, "USDC");
        assert_eq!(curves[0].1.knots, vec![0.0, 0.8, 1.0]);
        assert_eq!(curves[0].1.values, vec![0.0, 0.08, 0.5]);
    }

    #[test]
    fn invalid_curve_fails_the_row() {
        let mut broken = reserve();
        broken.rates.borrow_rate_curve = vec![BorrowRateCurvePoint::new(10_000, 100)];

        let ctx = AggregationContext::default();
        assert!(matches!(
            build_row(&ctx, &broken, "USDC", 10),
            Err(IndexerError::Rate(_))
        ));
        assert!(ctx.borrow_curves().is_empty());
    }

    #[test]
    fn skipped_row_leaves_no_recorded_curve() {
        // Curve starts at 1% utilization, so the idle reserve's current rate cannot be read.
        let mut idle = reserve();
        idle.balances.borrowed_amount = 0.0;
        idle.rates.borrow_rate_curve = vec![
            BorrowRateCurvePoint::new(100, 0),
            BorrowRateCurvePoint::new(8_000, 800),
            BorrowRateCurvePoint::new(10_000, 5_000),
        ];

        let ctx = AggregationContext::default();
        build_row(&ctx, &reserve(), "SOL", 10).unwrap();
        assert!(build_row(&ctx, &idle, "USDC", 10).is_err());

        let recorded: Vec<_> = ctx.borrow_curves().into_iter().map(|(s, _)| s).collect();
        assert_eq!(recorded, vec!["SOL"]);
    }
}
