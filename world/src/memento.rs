//! Snapshot codec for caches.
//!
//! A [`Memento`] captures the owning cell and the number of tokens held by a
//! cache. Individual token serials are not recorded: decoding mints a fresh
//! run of serials `0..count` in the owning cell.
//!
//! Snapshots come from persisted input, so counts above
//! [`MAX_CACHE_TOKENS`] are rejected before any token is minted.

use geocoin_core::CellCoord;
use serde::{Deserialize, Serialize};

use crate::Cache;

/// Largest number of tokens a single cache may hold.
pub const MAX_CACHE_TOKENS: u32 = 100_000;

/// Opaque serialized form of a cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memento(String);

impl Memento {
    /// Wraps a previously encoded snapshot string.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Textual payload of the snapshot.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors raised while decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum MementoError {
    /// The payload was not a JSON object with integral `i`, `j` and `numCoins` fields.
    #[error("cache snapshot is malformed")]
    Malformed(#[from] serde_json::Error),
    /// The snapshot records more tokens than a cache may hold.
    #[error("cache snapshot holds {0} tokens, more than the limit of {MAX_CACHE_TOKENS}")]
    TooManyTokens(u32),
}

/// Cell and token count recorded in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Cell owning the cache.
    pub cell: CellCoord,
    /// Number of tokens the cache holds.
    pub token_count: u32,
}

#[derive(Serialize, Deserialize)]
struct CacheFields {
    i: i32,
    j: i32,
    #[serde(rename = "numCoins")]
    num_coins: u32,
}

/// Serializes the cache's cell and token count.
#[must_use]
pub fn encode(cache: &Cache) -> Memento {
    let cell = cache.cell();
    let fields = CacheFields {
        i: cell.i(),
        j: cell.j(),
        num_coins: cache.token_count(),
    };
    let json = serde_json::to_string(&fields).expect("cache snapshot serialization never fails");
    Memento(json)
}

/// Reads the cell and token count of a snapshot without minting tokens.
pub fn summarize(memento: &Memento) -> Result<Summary, MementoError> {
    let fields: CacheFields = serde_json::from_str(memento.as_str())?;
    if fields.num_coins > MAX_CACHE_TOKENS {
        return Err(MementoError::TooManyTokens(fields.num_coins));
    }
    Ok(Summary {
        cell: CellCoord::new(fields.i, fields.j),
        token_count: fields.num_coins,
    })
}

/// Rebuilds a cache from its snapshot.
pub fn decode(memento: &Memento) -> Result<Cache, MementoError> {
    let summary = summarize(memento)?;
    Ok(Cache::new(summary.cell, summary.token_count))
}
