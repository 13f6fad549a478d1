//! Timings and budgets for a formation session.

use serde::{Deserialize, Serialize};

/// Tunable constants of the formation engines.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FormationConfig {
    /// Points each captain starts the auction with.
    pub initial_budget: u32,
    /// Seconds each player stays on the block.
    pub auction_seconds: u32,
    /// A bid raises the clock to at least this many seconds.
    pub bid_extension_seconds: u32,
    pub rps_round_seconds: u32,
    /// How long election results stay up before draft-method selection.
    pub results_delay_seconds: u32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            initial_budget: 3000,
            auction_seconds: 30,
            bid_extension_seconds: 10,
            rps_round_seconds: 30,
            results_delay_seconds: 3,
        }
    }
}

impl FormationConfig {
    /// Defaults overridden by `NAEJEON_*` env vars. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let d = Self::default();
        let read = |key: &str, default: u32| -> u32 {
            match lookup(key).map(|v| v.trim().parse::<u32>()) {
                Some(Ok(v)) => v,
                Some(Err(_)) => {
                    log::warn!("Ignoring invalid value for {}", key);
                    default
                }
                None => default,
            }
        };
        Self {
            initial_budget: read("NAEJEON_AUCTION_BUDGET", d.initial_budget),
            auction_seconds: read("NAEJEON_AUCTION_SECONDS", d.auction_seconds),
            bid_extension_seconds: read("NAEJEON_BID_EXTENSION_SECONDS", d.bid_extension_seconds),
            rps_round_seconds: read("NAEJEON_RPS_SECONDS", d.rps_round_seconds),
            results_delay_seconds: read("NAEJEON_RESULTS_DELAY_SECONDS", d.results_delay_seconds),
        }
    }
}
