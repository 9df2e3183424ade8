use std::path::PathBuf;

use chrono::{DateTime, Local};
use ratestypecrate::types::TransformedCurve;
use serde_json::{Map, Value};
use tracing::info;

use crate::{config::Config, error::IndexerError};

/// Writes the raw truncated borrow curves of a run to `<dir>/borrowCurves_MMDDYY_HHMM.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugCurveLog {
    dir: PathBuf,
}

impl DebugCurveLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `None` in production or when no directory is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        if config.is_production() {
            return None;
        }
        config.debug_curve_log_dir.as_ref().map(Self::new)
    }

    pub fn file_name(at: &DateTime<Local>) -> String {
        format!("borrowCurves_{}.json", at.format("%m%d%y_%H%M"))
    }

    pub async fn write(
        &self,
        curves: &[(String, TransformedCurve)],
        at: &DateTime<Local>,
    ) -> Result<PathBuf, IndexerError> {
        let mut by_token = Map::with_capacity(curves.len());
        for (symbol, curve) in curves {
            by_token.insert(symbol.clone(), serde_json::to_value(curve)?);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name(at));
        tokio::fs::write(&path, serde_json::to_vec_pretty(&Value::Object(by_token))?).await?;
        info!("Wrote {} borrow curves to {:?}", curves.len(), path);

        Ok(path)
    }
}
