use rates_indexer::integrations::{
    KaminoIntegration, MarginfiIntegration, ProtocolIntegration,
};
use ratestypecrate::types::{TokenData, TokenRegistry};
use solana_sdk::pubkey::Pubkey;

use crate::{
    kamino::{kamino_reserve, MockKaminoSource},
    marginfi::{marginfi_bank, MockMarginfiSource},
};

/// A token listed on both protocols.
#[derive(Debug, Clone, PartialEq)]
pub struct TestToken {
    pub symbol: String,
    pub mint: Pubkey,
    /// Marginfi bank, also the registry key.
    pub bank: Pubkey,
    pub decimals: u32,
    pub marginfi_optimal_utilization: f64,
}

impl TestToken {
    pub fn new(symbol: &str, decimals: u32, marginfi_optimal_utilization: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            mint: Pubkey::new_unique(),
            bank: Pubkey::new_unique(),
            decimals,
            marginfi_optimal_utilization,
        }
    }

    pub fn token_data(&self) -> TokenData {
        TokenData {
            category: "Test".to_string(),
            token_address: self.mint.to_string(),
            token_symbol: self.symbol.clone(),
        }
    }
}

pub struct TestSettings {
    pub tokens: Vec<TestToken>,
}

impl TestSettings {
    /// SOL, USDC and BONK with distinct Marginfi optimal utilizations.
    pub fn three_tokens() -> Self {
        Self {
            tokens: vec![
                TestToken::new("SOL", 9, 0.9),
                TestToken::new("USDC", 6, 0.85),
                TestToken::new("BONK", 5, 0.6),
            ],
        }
    }
}

/// Registry plus mock markets listing every token of the settings on both protocols.
pub struct TestFixture {
    pub tokens: Vec<TestToken>,
    pub kamino_market: Pubkey,
    pub kamino: MockKaminoSource,
    pub marginfi: MockMarginfiSource,
}

impl TestFixture {
    pub fn new(settings: TestSettings) -> Self {
        let kamino_market = Pubkey::new_unique();
        let mut kamino = MockKaminoSource::new(kamino_market).with_slot(0);
        let mut marginfi = MockMarginfiSource::new();

        for token in &settings.tokens {
            let one_token = 10f64.powi(token.decimals as i32);
            kamino = kamino.with_reserve(kamino_reserve(
                token.mint,
                token.decimals,
                1_000.0 * one_token,
                400.0 * one_token,
            ));
            marginfi = marginfi.with_bank(marginfi_bank(
                token.bank,
                token.decimals,
                token.marginfi_optimal_utilization,
            ));
        }

        Self {
            tokens: settings.tokens,
            kamino_market,
            kamino,
            marginfi,
        }
    }

    pub fn token(&self, symbol: &str) -> &TestToken {
        self.tokens
            .iter()
            .find(|token| token.symbol == symbol)
            .unwrap_or_else(|| panic!("no test token {}", symbol))
    }

    pub fn registry(&self) -> TokenRegistry {
        self.tokens
            .iter()
            .map(|token| (token.bank.to_string(), token.token_data()))
            .collect()
    }

    pub fn kamino_integration(&self) -> KaminoIntegration<MockKaminoSource> {
        KaminoIntegration::new(self.kamino.clone(), self.kamino_market)
    }

    pub fn marginfi_integration(&self) -> MarginfiIntegration<MockMarginfiSource> {
        MarginfiIntegration::new(self.marginfi.clone())
    }

    /// Marginfi first, then Kamino.
    pub fn integrations(&self) -> Vec<Box<dyn ProtocolIntegration>> {
        vec![
            Box::new(self.marginfi_integration()),
            Box::new(self.kamino_integration()),
        ]
    }
}
