pub mod curve;
pub mod market_option;
pub mod protocol_row;
pub mod token;

pub use curve::*;
pub use market_option::*;
pub use protocol_row::*;
pub use token::*;
