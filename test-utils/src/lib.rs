pub mod kamino;
pub mod marginfi;
pub mod test;

pub use kamino::{MockKaminoMarket, MockKaminoSource};
pub use marginfi::{MockMarginfiGroup, MockMarginfiSource};
