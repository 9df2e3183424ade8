use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub category: String,
    /// Mint address
    pub token_address: String,
    pub token_symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEntry {
    /// Ledger address the entry is registered under (the Marginfi bank for this token).
    pub key: String,
    pub data: TokenData,
}

/// Static token metadata, in registration order.
///
/// Iteration order is stable: per-token results are collected in the order entries were
/// registered, regardless of which lookup finishes first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRegistry {
    entries: Vec<TokenEntry>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `data` under `key`. A key that is already present is replaced in place.
    pub fn insert(&mut self, key: impl Into<String>, data: TokenData) {
        let key = key.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.data = data,
            None => self.entries.push(TokenEntry { key, data }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&TokenEntry> {
        self.entries
            .iter()
            .find(|entry| entry.data.token_symbol == symbol)
    }

    /// The two markets tracked when no registry file is configured.
    pub fn partial() -> Self {
        Self::from_iter([
            (
                "2s37akK2eyBbp8DZgCm7RtsaEz8eJP3Nxd4urLHQv7yB",
                TokenData {
                    category: "Stable".to_string(),
                    token_address: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
                    token_symbol: "USDC".to_string(),
                },
            ),
            (
                "CCKtUs6Cgwo4aaQUmBPmyoApH2gUDErxNZCAntD6LYGh",
                TokenData {
                    category: "LST".to_string(),
                    token_address: "So11111111111111111111111111111111111111112".to_string(),
                    token_symbol: "SOL".to_string(),
                },
            ),
        ])
    }
}

impl<K: Into<String>> FromIterator<(K, TokenData)> for TokenRegistry {
    fn from_iter<I: IntoIterator<Item = (K, TokenData)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (key, data) in iter {
            registry.insert(key, data);
        }
        registry
    }
}
