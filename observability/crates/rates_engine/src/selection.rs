use ratestypecrate::types::{MarketOption, ProtocolDataRow};

/// One of the two comparison slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSlot {
    First,
    Second,
}

impl SelectionSlot {
    pub fn other(self) -> Self {
        match self {
            SelectionSlot::First => SelectionSlot::Second,
            SelectionSlot::Second => SelectionSlot::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SelectionSlot::First => 0,
            SelectionSlot::Second => 1,
        }
    }
}

/// Pair of market keys, one per slot. An empty key means nothing is selected.
pub type Selections = [String; 2];

/// How a change in one slot drags the other slot along.
///
/// Picking a `hub` market pairs it with the same token on the first `priority` protocol that
/// lists it, then on any other protocol. Picking any other market pairs it with the hub's market
/// for that token. Non-hub protocols never couple to each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouplingPolicy {
    pub hub: &'static str,
    pub priority: &'static [&'static str],
}

pub const DEFAULT_COUPLING_POLICY: CouplingPolicy = CouplingPolicy {
    hub: "marginfi",
    priority: &["kamino", "drift", "save"],
};

impl Default for CouplingPolicy {
    fn default() -> Self {
        DEFAULT_COUPLING_POLICY
    }
}

impl CouplingPolicy {
    /// The market the other slot should move to after `picked` is selected, if any.
    pub fn counterpart<'a>(
        &self,
        options: &'a [MarketOption],
        picked: &MarketOption,
    ) -> Option<&'a MarketOption> {
        let same_token = |protocol: &str| {
            options
                .iter()
                .find(|o| o.token == picked.token && o.is_protocol(protocol))
        };

        if picked.is_protocol(self.hub) {
            self.priority
                .iter()
                .find_map(|protocol| same_token(*protocol))
                .or_else(|| {
                    options
                        .iter()
                        .find(|o| o.token == picked.token && !o.is_protocol(self.hub))
                })
        } else {
            same_token(self.hub)
        }
    }

    /// Applies a selection change to `current`.
    ///
    /// Unknown keys leave both slots untouched. When no counterpart exists the other slot keeps
    /// its previous value.
    pub fn apply(
        &self,
        options: &[MarketOption],
        current: &Selections,
        changed: SelectionSlot,
        new_key: &str,
    ) -> Selections {
        let mut next = current.clone();

        let Some(picked) = options.iter().find(|o| o.key == new_key) else {
            return next;
        };
        next[changed.index()] = picked.key.clone();

        if let Some(counterpart) = self.counterpart(options, picked) {
            next[changed.other().index()] = counterpart.key.clone();
        }

        next
    }
}

/// [`CouplingPolicy::apply`] with the default marginfi-hub policy.
pub fn compute_coupled_selections(
    options: &[MarketOption],
    current: &Selections,
    changed: SelectionSlot,
    new_key: &str,
) -> Selections {
    DEFAULT_COUPLING_POLICY.apply(options, current, changed, new_key)
}

/// One option per distinct `"<protocol>_<token>"`, first occurrence wins, in row order.
pub fn build_market_options(rows: &[ProtocolDataRow]) -> Vec<MarketOption> {
    let mut options: Vec<MarketOption> = Vec::with_capacity(rows.len());
    for row in rows {
        let key = row.market_key();
        if !options.iter().any(|o| o.key == key) {
            options.push(MarketOption::from_row(row));
        }
    }
    options
}

/// Starting pair for a fresh comparison view.
///
/// The first slot gets the hub market with the alphabetically first token (case-insensitive),
/// or the first option if the hub has no markets. The second slot follows by coupling.
pub fn default_selections(options: &[MarketOption]) -> Selections {
    let policy = DEFAULT_COUPLING_POLICY;

    let first = options
        .iter()
        .filter(|o| o.is_protocol(policy.hub))
        .min_by_key(|o| o.token.to_lowercase())
        .or_else(|| options.first());

    match first {
        Some(first) => policy.apply(
            options,
            &[String::new(), String::new()],
            SelectionSlot::First,
            &first.key,
        ),
        None => [String::new(), String::new()],
    }
}

/// Keeps `current` if it is still valid against `options`, otherwise resets to the defaults.
///
/// A pair is invalid when both slots are empty or either slot names a key no longer offered.
pub fn reconcile_selections(options: &[MarketOption], current: &Selections) -> Selections {
    let missing = |key: &String| !key.is_empty() && !options.iter().any(|o| &o.key == key);
    let both_empty = current.iter().all(String::is_empty);

    if both_empty || current.iter().any(missing) {
        default_selections(options)
    } else {
        current.clone()
    }
}

/// Rows behind the selected keys. `None` renders as "No data".
pub fn selected_rows<'a>(
    options: &'a [MarketOption],
    selections: &Selections,
) -> [Option<&'a ProtocolDataRow>; 2] {
    let lookup = |key: &String| options.iter().find(|o| &o.key == key).map(|o| &o.row);
    [lookup(&selections[0]), lookup(&selections[1])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratestypecrate::types::RowValues;
    use test_case::test_case;

    fn mk(protocol: &str, token: &str) -> MarketOption {
        MarketOption::from_row(&RowValues::default().into_row(protocol, token))
    }

    fn pair(a: &str, b: &str) -> Selections {
        [a.to_string(), b.to_string()]
    }

    #[test_case(&[("marginfi", "SOL"), ("kamino", "SOL")], SelectionSlot::First, "marginfi_SOL", "kamino_SOL" ; "prefers kamino")]
    #[test_case(&[("marginfi", "USDC"), ("drift", "USDC")], SelectionSlot::Second, "marginfi_USDC", "drift_USDC" ; "falls back to drift")]
    #[test_case(&[("marginfi", "BTC"), ("save", "BTC")], SelectionSlot::First, "marginfi_BTC", "save_BTC" ; "falls back to save")]
    #[test_case(&[("marginfi", "ETH"), ("otherdex", "ETH")], SelectionSlot::Second, "marginfi_ETH", "otherdex_ETH" ; "falls back to any protocol")]
    #[test_case(&[("marginfi", "SOL"), ("save", "SOL"), ("drift", "SOL"), ("kamino", "SOL")], SelectionSlot::First, "marginfi_SOL", "kamino_SOL" ; "priority beats option order")]
    #[test_case(&[("kamino", "SOL"), ("marginfi", "SOL")], SelectionSlot::Second, "kamino_SOL", "marginfi_SOL" ; "non hub couples to hub")]
    fn hub_coupling(
        markets: &[(&str, &str)],
        changed: SelectionSlot,
        new_key: &str,
        expected_other: &str,
    ) {
        let options: Vec<_> = markets.iter().map(|(p, t)| mk(p, t)).collect();
        let out = compute_coupled_selections(&options, &pair("x", "y"), changed, new_key);

        assert_eq!(out[changed.index()], new_key);
        assert_eq!(out[changed.other().index()], expected_other);
    }

    #[test]
    fn hub_without_counterpart_leaves_other_slot() {
        let options = vec![mk("marginfi", "BONK")];
        let out = compute_coupled_selections(
            &options,
            &pair("kamino_SOL", "kamino_SOL"),
            SelectionSlot::First,
            "marginfi_BONK",
        );
        assert_eq!(out, pair("marginfi_BONK", "kamino_SOL"));
    }

    #[test]
    fn non_hub_without_hub_market_leaves_other_slot() {
        let options = vec![mk("kamino", "USDT"), mk("drift", "USDT")];
        let out = compute_coupled_selections(
            &options,
            &pair("kamino_USDT", "drift_USDT"),
            SelectionSlot::First,
            "kamino_USDT",
        );
        assert_eq!(out, pair("kamino_USDT", "drift_USDT"));
    }

    #[test]
    fn token_match_is_exact() {
        let options = vec![mk("marginfi", "SOL"), mk("kamino", "sol")];
        let out =
            compute_coupled_selections(&options, &pair("", ""), SelectionSlot::First, "marginfi_SOL");
        assert_eq!(out, pair("marginfi_SOL", ""));
    }

    #[test]
    fn protocol_match_ignores_case() {
        let options = vec![mk("Marginfi", "SOL"), mk("Kamino", "SOL")];
        let out = compute_coupled_selections(
            &options,
            &pair("", ""),
            SelectionSlot::Second,
            "Kamino_SOL",
        );
        assert_eq!(out, pair("Marginfi_SOL", "Kamino_SOL"));
    }

    #[test]
    fn only_the_other_slot_is_adjusted() {
        let options = vec![mk("marginfi", "SOL"), mk("kamino", "SOL")];
        let prev = pair("marginfi_SOL", "marginfi_SOL");

        let out0 = compute_coupled_selections(&options, &prev, SelectionSlot::First, "marginfi_SOL");
        assert_eq!(out0, pair("marginfi_SOL", "kamino_SOL"));

        let out1 = compute_coupled_selections(&options, &prev, SelectionSlot::Second, "marginfi_SOL");
        assert_eq!(out1, pair("kamino_SOL", "marginfi_SOL"));
    }

    #[test]
    fn unknown_key_is_a_no_op() {
        let options = vec![mk("marginfi", "SOL"), mk("kamino", "SOL")];
        let prev = pair("marginfi_SOL", "kamino_SOL");

        for slot in [SelectionSlot::First, SelectionSlot::Second] {
            assert_eq!(
                compute_coupled_selections(&options, &prev, slot, "nonexistent_key"),
                prev
            );
        }
    }

    #[test]
    fn custom_policy_changes_hub_and_priority() {
        let policy = CouplingPolicy {
            hub: "kamino",
            priority: &["save"],
        };
        let options = vec![mk("kamino", "SOL"), mk("marginfi", "SOL"), mk("save", "SOL")];
        let out = policy.apply(&options, &pair("", ""), SelectionSlot::First, "kamino_SOL");
        assert_eq!(out, pair("kamino_SOL", "save_SOL"));
    }

    #[test]
    fn options_are_deduplicated_first_wins() {
        let mut first = RowValues {
            liquidity: Some(1.0),
            ..Default::default()
        }
        .into_row("Kamino", "SOL");
        first.lending_rate = 0.05;
        let duplicate = RowValues {
            liquidity: Some(2.0),
            ..Default::default()
        }
        .into_row("Kamino", "SOL");
        let other = RowValues::default().into_row("Marginfi", "SOL");

        let options = build_market_options(&[first, duplicate, other]);

        assert_eq!(
            options.iter().map(|o| o.key.as_str()).collect::<Vec<_>>(),
            vec!["Kamino_SOL", "Marginfi_SOL"]
        );
        assert_eq!(options[0].row.liquidity, 1.0);
    }

    #[test]
    fn defaults_pick_alphabetically_first_hub_token() {
        let options = vec![
            mk("Kamino", "USDC"),
            mk("Marginfi", "USDC"),
            mk("Marginfi", "bonk"),
            mk("Kamino", "bonk"),
            mk("Marginfi", "SOL"),
        ];
        assert_eq!(
            default_selections(&options),
            pair("Marginfi_bonk", "Kamino_bonk")
        );
    }

    #[test]
    fn defaults_without_hub_use_first_option() {
        let options = vec![mk("Kamino", "SOL"), mk("drift", "SOL")];
        assert_eq!(default_selections(&options), pair("Kamino_SOL", ""));
        assert_eq!(default_selections(&[]), pair("", ""));
    }

    #[test]
    fn reconcile_resets_only_invalid_pairs() {
        let options = vec![mk("Marginfi", "SOL"), mk("Kamino", "SOL"), mk("Kamino", "USDC")];
        let defaults = pair("Marginfi_SOL", "Kamino_SOL");

        assert_eq!(reconcile_selections(&options, &pair("", "")), defaults);
        assert_eq!(
            reconcile_selections(&options, &pair("Kamino_USDC", "gone_SOL")),
            defaults
        );
        assert_eq!(
            reconcile_selections(&options, &pair("Kamino_USDC", "")),
            pair("Kamino_USDC", "")
        );
        assert_eq!(
            reconcile_selections(&options, &pair("Kamino_USDC", "Marginfi_SOL")),
            pair("Kamino_USDC", "Marginfi_SOL")
        );
    }

    #[test]
    fn selected_rows_resolve_or_report_no_data() {
        let options = vec![mk("Marginfi", "SOL")];
        let [first, second] = selected_rows(&options, &pair("Marginfi_SOL", "Kamino_SOL"));

        assert_eq!(first.map(|r| r.token.as_str()), Some("SOL"));
        assert!(second.is_none());
    }
}
