use std::{sync::Arc, time::Duration};

use backoff::{future::retry, ExponentialBackoffBuilder};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use tracing::debug;

use crate::error::IndexerError;

/// Reads the current slot over JSON-RPC, retrying transient failures.
#[derive(Clone)]
pub struct RpcSlotClock {
    rpc_client: Arc<RpcClient>,
    max_elapsed_time: Duration,
}

impl RpcSlotClock {
    pub fn new(rpc_url: String) -> Self {
        Self::from_client(Arc::new(RpcClient::new_with_commitment(
            rpc_url,
            CommitmentConfig::confirmed(),
        )))
    }

    pub fn from_client(rpc_client: Arc<RpcClient>) -> Self {
        Self {
            rpc_client,
            max_elapsed_time: Duration::from_secs(30),
        }
    }

    pub async fn get_slot(&self) -> Result<u64, IndexerError> {
        let slot = retry(
            ExponentialBackoffBuilder::new()
                .with_max_interval(Duration::from_secs(5))
                .with_max_elapsed_time(Some(self.max_elapsed_time))
                .build(),
            || async {
                self.rpc_client
                    .get_slot()
                    .await
                    .map_err(backoff::Error::transient)
            },
        )
        .await?;
        debug!("Current slot: {}", slot);

        Ok(slot)
    }
}
