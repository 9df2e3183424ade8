use chrono::Local;
use futures::future::join_all;
use rates_engine::grid::percent_grid;
use ratestypecrate::{
    constants::{DEFAULT_CURVE_POINTS, DEFAULT_OPTIMAL_UTILIZATION},
    types::{ProtocolDataRow, TokenRegistry},
};
use tracing::{error, info, warn};

use crate::{
    config::{Config, OverrideTable},
    context::AggregationContext,
    debug_log::DebugCurveLog,
    integrations::ProtocolIntegration,
};

/// Fans out to every protocol integration and concatenates their rows.
pub struct RateAggregator {
    integrations: Vec<Box<dyn ProtocolIntegration>>,
    curve_points: usize,
    default_optimal_utilization: f64,
    overrides: OverrideTable,
    debug_log: Option<DebugCurveLog>,
}

impl RateAggregator {
    /// Integrations run concurrently, but their rows come back in the order given here.
    pub fn new(integrations: Vec<Box<dyn ProtocolIntegration>>) -> Self {
        Self {
            integrations,
            curve_points: DEFAULT_CURVE_POINTS,
            default_optimal_utilization: DEFAULT_OPTIMAL_UTILIZATION,
            overrides: OverrideTable::default(),
            debug_log: None,
        }
    }

    pub fn from_config(integrations: Vec<Box<dyn ProtocolIntegration>>, config: &Config) -> Self {
        Self {
            integrations,
            curve_points: config.curve_points,
            default_optimal_utilization: config.default_optimal_utilization,
            overrides: config.optimal_utilization_overrides.clone().unwrap_or_default(),
            debug_log: DebugCurveLog::from_config(config),
        }
    }

    pub fn with_debug_log(mut self, debug_log: DebugCurveLog) -> Self {
        self.debug_log = Some(debug_log);
        self
    }

    pub fn new_context(&self) -> AggregationContext {
        AggregationContext::new(
            percent_grid(self.curve_points as f64),
            self.default_optimal_utilization,
            self.overrides.clone(),
        )
    }

    /// One aggregation run with a fresh context.
    pub async fn aggregate(&self, registry: &TokenRegistry) -> Vec<ProtocolDataRow> {
        let ctx = self.new_context();
        self.aggregate_with_context(&ctx, registry).await
    }

    /// Never fails: a protocol that cannot be read contributes no rows.
    pub async fn aggregate_with_context(
        &self,
        ctx: &AggregationContext,
        registry: &TokenRegistry,
    ) -> Vec<ProtocolDataRow> {
        let batches = join_all(self.integrations.iter().map(|integration| async move {
            match integration.fetch_rows(ctx, registry).await {
                Ok(rows) => rows,
                Err(e) => {
                    error!("Failed to get {} rates: {}", integration.name(), e);
                    vec![]
                }
            }
        }))
        .await;

        let rows: Vec<ProtocolDataRow> = batches.into_iter().flatten().collect();
        info!(
            "Aggregated {} rows from {} protocols",
            rows.len(),
            self.integrations.len()
        );

        if let Some(debug_log) = &self.debug_log {
            if let Err(e) = debug_log.write(&ctx.borrow_curves(), &Local::now()).await {
                warn!("Failed to write borrow curve log: {}", e);
            }
        }

        rows
    }
}
