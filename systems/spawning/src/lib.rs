#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for populating revealed cells.

pub mod luck;

use geocoin_core::{CellCoord, Command, Event};
use log::trace;
use serde::Deserialize;

pub use luck::{HashLuck, LuckSource};

/// Probability that a revealed cell holds a cache.
pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.1;
/// Exclusive upper bound on the number of tokens a fresh cache holds.
pub const DEFAULT_MAX_TOKENS: u32 = 20;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Probability that a revealed cell holds a cache.
    pub spawn_probability: f64,
    /// Exclusive upper bound on the number of tokens a fresh cache holds.
    pub max_tokens: u32,
    /// Optional seed binding the layout to a single world.
    pub seed: Option<u64>,
}

impl Config {
    /// Creates a new configuration with an unseeded, globally stable layout.
    #[must_use]
    pub const fn new(spawn_probability: f64, max_tokens: u32) -> Self {
        Self {
            spawn_probability,
            max_tokens,
            seed: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_PROBABILITY, DEFAULT_MAX_TOKENS)
    }
}

/// Pure system that decides which revealed cells hold caches.
#[derive(Debug)]
pub struct Spawning<L = HashLuck> {
    spawn_probability: f64,
    max_tokens: u32,
    luck: L,
}

impl Spawning<HashLuck> {
    /// Creates a new spawning system backed by [`HashLuck`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        let luck = match config.seed {
            Some(seed) => HashLuck::with_seed(seed),
            None => HashLuck::new(),
        };
        Self::with_luck(config, luck)
    }
}

impl Default for Spawning<HashLuck> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<L: LuckSource> Spawning<L> {
    /// Creates a new spawning system drawing values from `luck`.
    ///
    /// The configured seed is ignored; `luck` is used as given.
    #[must_use]
    pub fn with_luck(config: Config, luck: L) -> Self {
        Self {
            spawn_probability: config.spawn_probability,
            max_tokens: config.max_tokens,
            luck,
        }
    }

    /// Consumes world events and emits a spawn command for every revealed cell
    /// that holds a cache.
    pub fn handle(&self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::CellsRevealed { cells } = event else {
                continue;
            };

            for &cell in cells {
                if let Some(token_count) = self.evaluate(cell) {
                    out.push(Command::SpawnCache { cell, token_count });
                }
            }
        }
    }

    /// Decides whether `cell` holds a cache and, if so, how many tokens it
    /// starts with.
    #[must_use]
    pub fn evaluate(&self, cell: CellCoord) -> Option<u32> {
        let roll = self.luck.luck(&luck::spawn_key(cell));
        if roll >= self.spawn_probability {
            return None;
        }

        let token_count = self.initial_token_count(cell);
        trace!("cell {cell} rolled {roll:.4}; spawning {token_count} tokens");
        Some(token_count)
    }

    fn initial_token_count(&self, cell: CellCoord) -> u32 {
        let value = self.luck.luck(&luck::value_key(cell));
        let scaled = (value * f64::from(self.max_tokens)).floor();
        (scaled as u32).min(self.max_tokens.saturating_sub(1))
    }
}
