//! Whole-world save and restore through an opaque key-value blob store.
//!
//! The world is written as a single JSON blob under [`SAVE_KEY`]. Restoring
//! never fails because of the blob: a missing, truncated or otherwise
//! unreadable save yields a fresh world and a log line.

use std::collections::{BTreeMap, VecDeque};

use geocoin_core::{CellCoord, CellKeyError, GeoPoint, Token};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    memento::{self, Memento, MementoError},
    BoardError, Config, World,
};

/// Key under which the game state blob is stored.
pub const SAVE_KEY: &str = "gameState";

/// Minimal string blob storage consumed by the world.
pub trait BlobStore {
    /// Returns the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Replaces the blob stored under `key`.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Errors surfaced by [`BlobStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying medium could not be written.
    #[error("failed to persist `{key}`")]
    Io {
        /// Key being written.
        key: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The store could not encode its own contents.
    #[error("failed to encode store contents")]
    Encoding(#[from] serde_json::Error),
}

/// Errors raised while saving the world.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The game state could not be serialized.
    #[error("failed to serialize game state")]
    Encode(#[from] serde_json::Error),
    /// The store rejected the blob.
    #[error("failed to store game state")]
    Store(#[from] StoreError),
}

/// Reasons a saved blob cannot be restored.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The blob is not a JSON document of the expected shape.
    #[error("saved game state is not valid")]
    Json(#[from] serde_json::Error),
    /// A cache entry is keyed by something other than `i,j`.
    #[error("saved game state contains an invalid cell key")]
    CellKey(#[from] CellKeyError),
    /// A cache entry holds an unreadable snapshot.
    #[error("snapshot for cell {cell} is unreadable")]
    Memento {
        /// Cell the snapshot is stored under.
        cell: CellCoord,
        /// Decoding failure.
        #[source]
        source: MementoError,
    },
    /// The saved player position is not a finite point on the globe.
    #[error("saved player position ({}, {}) is not on the globe", .0.lat(), .0.lng())]
    Position(GeoPoint),
    /// A cache entry describes a different cell than the key it is stored under.
    #[error("snapshot stored under cell {key} describes cell {actual}")]
    CellMismatch {
        /// Cell the snapshot is stored under.
        key: CellCoord,
        /// Cell recorded inside the snapshot.
        actual: CellCoord,
    },
}

/// Serialized shape of the whole game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    /// Player position at save time.
    pub player_position: GeoPoint,
    /// Points accumulated by the player.
    pub player_points: u64,
    /// Tokens carried by the player, head first.
    pub player_inventory: Vec<Token>,
    /// Cache snapshots keyed by `i,j`.
    pub cache_state: BTreeMap<String, Memento>,
}

/// In-memory [`BlobStore`], useful for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Serializes the whole world into a blob.
pub fn encode_blob(world: &World) -> Result<String, serde_json::Error> {
    let saved = SavedGame {
        player_position: world.position,
        player_points: world.points,
        player_inventory: world.inventory.iter().copied().collect(),
        cache_state: world
            .snapshots
            .iter()
            .map(|(cell, snapshot)| (cell.to_string(), snapshot.clone()))
            .collect(),
    };
    serde_json::to_string(&saved)
}

/// Parses and validates a blob produced by [`encode_blob`].
pub fn decode_blob(blob: &str) -> Result<SavedGame, LoadError> {
    let saved: SavedGame = serde_json::from_str(blob)?;
    if !saved.player_position.is_on_globe() {
        return Err(LoadError::Position(saved.player_position));
    }
    for (key, snapshot) in &saved.cache_state {
        let key: CellCoord = key.parse()?;
        let summary = memento::summarize(snapshot)
            .map_err(|source| LoadError::Memento { cell: key, source })?;
        if summary.cell != key {
            return Err(LoadError::CellMismatch {
                key,
                actual: summary.cell,
            });
        }
    }
    Ok(saved)
}

/// Writes the whole world to the store under [`SAVE_KEY`].
pub fn save(world: &World, store: &mut impl BlobStore) -> Result<(), SaveError> {
    let blob = encode_blob(world)?;
    store.set(SAVE_KEY, blob)?;
    info!("game saved");
    Ok(())
}

/// Rebuilds the world from the store, falling back to a fresh world when no
/// usable save exists.
///
/// Only an invalid `config` is reported; blob problems are logged.
pub fn restore(config: Config, store: &impl BlobStore) -> Result<World, BoardError> {
    let mut world = World::new(config)?;

    let Some(blob) = store.get(SAVE_KEY) else {
        info!("no saved game state");
        return Ok(world);
    };

    match decode_blob(&blob) {
        Ok(saved) => {
            adopt(&mut world, saved);
            info!("game loaded");
        }
        Err(error) => warn!("ignoring saved game state: {error}"),
    }

    Ok(world)
}

fn adopt(world: &mut World, saved: SavedGame) {
    world.position = saved.player_position;
    world.points = saved.player_points;
    world.inventory = VecDeque::from(saved.player_inventory);
    world.snapshots = saved
        .cache_state
        .into_iter()
        .filter_map(|(key, snapshot)| key.parse().ok().map(|cell| (cell, snapshot)))
        .collect();
}
