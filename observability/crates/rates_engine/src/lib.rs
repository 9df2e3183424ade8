pub mod compounding;
pub mod error;
pub mod grid;
pub mod interp;
pub mod kamino;
pub mod marginfi;
pub mod selection;
pub mod vectors;

pub use error::RateError;

/// Lending and borrow APYs, decimal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Apys {
    pub lending_apy: f64,
    pub borrow_apy: f64,
}
