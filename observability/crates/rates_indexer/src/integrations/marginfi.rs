use async_trait::async_trait;
use futures::future::join_all;
use rates_engine::vectors::{build_vectors, FeeAdjustedPlateauCurve};
use ratestypecrate::{
    constants::MARGINFI_PROTOCOL,
    types::{ProtocolDataRow, RowValues, TokenEntry, TokenRegistry},
};
use tracing::{info, warn};

use super::{
    mint_factor, parse_address, MarginfiBank, MarginfiGroupHandle, MarginfiGroupSource,
    ProtocolIntegration,
};
use crate::{context::AggregationContext, error::IndexerError};

/// Rows for the banks of one Marginfi group, rated with the plateau/max model.
///
/// Registry keys are bank addresses. Every bank publishes its optimal utilization to the
/// aggregation context for other protocols to chart against.
pub struct MarginfiIntegration<S> {
    source: S,
}

impl<S: MarginfiGroupSource> MarginfiIntegration<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    async fn token_row(
        &self,
        ctx: &AggregationContext,
        group: &S::Group,
        entry: &TokenEntry,
    ) -> Result<Option<ProtocolDataRow>, IndexerError> {
        let address = parse_address(&entry.key)?;
        let Some(bank) = group.bank_by_address(&address).await? else {
            warn!("No Marginfi bank {} for {}", address, entry.data.token_symbol);
            return Ok(None);
        };

        build_row(ctx, &bank, &entry.data.token_symbol).map(Some)
    }
}

fn build_row(
    ctx: &AggregationContext,
    bank: &MarginfiBank,
    symbol: &str,
) -> Result<ProtocolDataRow, IndexerError> {
    let factor = mint_factor(bank.mint_decimals)?;
    let rates = &bank.rates;

    let asset_quantity = bank.total_asset_quantity / factor;
    let liability_quantity = bank.total_liability_quantity / factor;
    let utilization = if bank.total_asset_quantity > 0.0 {
        bank.total_liability_quantity / bank.total_asset_quantity
    } else {
        0.0
    };

    ctx.publish_optimal_utilization(symbol, rates.optimal_utilization_rate);

    let current = rates.current_apys(utilization);

    let model = FeeAdjustedPlateauCurve {
        curve: rates.plateau_curve(),
        borrow_fee_fraction: rates.fees.total_rate_fee(),
    };
    let curves = match build_vectors(&model, ctx.grid()) {
        Ok(curves) => Some(curves),
        Err(e) => {
            warn!("Failed to sample Marginfi curves for {}: {}", symbol, e);
            None
        }
    };

    Ok(RowValues {
        liquidity: Some(asset_quantity - liability_quantity),
        current_utilization: Some(utilization),
        optimal_utilization: Some(rates.optimal_utilization_rate),
        plateau_rate: Some(rates.plateau_interest_rate),
        max_rate: Some(rates.max_interest_rate),
        lending_rate: Some(current.lending_apy),
        borrowing_rate: Some(current.borrow_apy),
        collateral_weight: Some(bank.asset_weight_init),
        liability_weight: Some(bank.liability_weight_init),
    }
    .into_row(MARGINFI_PROTOCOL, symbol)
    .with_curves(curves))
}

#[async_trait]
impl<S: MarginfiGroupSource> ProtocolIntegration for MarginfiIntegration<S> {
    fn name(&self) -> &str {
        MARGINFI_PROTOCOL
    }

    async fn fetch_rows(
        &self,
        ctx: &AggregationContext,
        registry: &TokenRegistry,
    ) -> Result<Vec<ProtocolDataRow>, IndexerError> {
        let group = self.source.load_group().await?;

        let group = &group;
        let rows = join_all(registry.iter().map(|entry| async move {
            match self.token_row(ctx, group, entry).await {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping Marginfi {}: {}", entry.data.token_symbol, e);
                    None
                }
            }
        }))
        .await;

        let rows: Vec<_> = rows.into_iter().flatten().collect();
        info!("Computed {} Marginfi rows", rows.len());

        Ok(rows)
    }
}
