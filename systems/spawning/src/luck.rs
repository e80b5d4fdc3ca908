//! Deterministic pseudo-random values keyed by strings.

use geocoin_core::CellCoord;
use sha2::{Digest, Sha256};

/// Source of reproducible values in `[0, 1)`.
///
/// Implementations must be total and return the same value for the same key
/// for the lifetime of a world.
pub trait LuckSource {
    /// Maps `key` to a value in `[0, 1)`.
    fn luck(&self, key: &str) -> f64;
}

impl<F> LuckSource for F
where
    F: Fn(&str) -> f64,
{
    fn luck(&self, key: &str) -> f64 {
        self(key)
    }
}

/// SHA-256 backed [`LuckSource`].
///
/// Without a seed the layout is identical for every world and every run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashLuck {
    seed: Option<u64>,
}

impl HashLuck {
    /// Creates an unseeded generator shared by every world.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: None }
    }

    /// Creates a generator whose values are bound to `seed`.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

impl LuckSource for HashLuck {
    fn luck(&self, key: &str) -> f64 {
        let mut hasher = Sha256::new();
        if let Some(seed) = self.seed {
            hasher.update(seed.to_le_bytes());
        }
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0_u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let mantissa = u64::from_le_bytes(bytes) >> 11;
        mantissa as f64 / (1_u64 << 53) as f64
    }
}

/// Key deciding whether `cell` holds a cache.
#[must_use]
pub fn spawn_key(cell: CellCoord) -> String {
    cell.to_string()
}

/// Key deciding how many tokens a cache in `cell` starts with.
#[must_use]
pub fn value_key(cell: CellCoord) -> String {
    format!("{cell},value")
}
