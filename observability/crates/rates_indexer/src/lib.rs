pub mod aggregator;
pub mod clock;
pub mod config;
pub mod context;
pub mod debug_log;
pub mod error;
pub mod integrations;
pub mod registry;
pub mod serde_helpers;
pub mod snapshot;
