#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Geocoin.
//!
//! The world owns the player, the board, every cache snapshot ever taken and
//! the caches currently materialized around the player. It mutates only
//! through [`apply`], reporting each change as an [`Event`]. Cells that come
//! into view without a snapshot are announced through
//! [`Event::CellsRevealed`]; deciding whether they hold a cache is left to the
//! spawning system, which answers with [`Command::SpawnCache`].

pub mod board;
mod caches;
mod config;
pub mod memento;
pub mod persistence;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use geocoin_core::{
    CellCoord, Command, Event, FixTicket, GeoPoint, SensorError, Token, WELCOME_BANNER,
};
use log::{debug, warn};

pub use board::{Board, BoardError};
pub use caches::Cache;
pub use config::{
    Config, DEFAULT_START_POSITION, DEFAULT_STEP_SIZE, DEFAULT_TILE_WIDTH,
    DEFAULT_VISIBILITY_RADIUS,
};
pub use memento::{Memento, MementoError, MAX_CACHE_TOKENS};

/// Represents the authoritative Geocoin world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    board: Board,
    step_size: f64,
    position: GeoPoint,
    points: u64,
    inventory: VecDeque<Token>,
    snapshots: BTreeMap<CellCoord, Memento>,
    live: BTreeMap<CellCoord, Cache>,
    visible: BTreeSet<CellCoord>,
    fixes: FixSequencer,
}

impl World {
    /// Creates a fresh world with the player at the configured start position.
    pub fn new(config: Config) -> Result<Self, BoardError> {
        let board = Board::new(config.tile_width, config.visibility_radius)?;
        if !config.start_position.is_on_globe() {
            return Err(BoardError::InvalidStartPosition(config.start_position));
        }
        Ok(Self {
            banner: WELCOME_BANNER,
            board,
            step_size: config.step_size,
            position: config.start_position,
            points: 0,
            inventory: VecDeque::new(),
            snapshots: BTreeMap::new(),
            live: BTreeMap::new(),
            visible: BTreeSet::new(),
            fixes: FixSequencer::new(),
        })
    }

    fn relocate(&mut self, to: GeoPoint, out_events: &mut Vec<Event>) {
        let from = self.position;
        self.position = to;
        out_events.push(Event::PlayerMoved { from, to });
        self.recompute_visibility(out_events);
    }

    fn recompute_visibility(&mut self, out_events: &mut Vec<Event>) {
        let origin = self.board.cell_for_point(self.position);
        let cells = self.board.cells_near(self.position);
        let visible: BTreeSet<CellCoord> = cells.iter().copied().collect();

        if visible != self.visible {
            out_events.push(Event::VisibilityChanged {
                origin,
                visible: visible.len(),
            });
        }

        let departed: Vec<CellCoord> = self
            .live
            .keys()
            .filter(|cell| !visible.contains(cell))
            .copied()
            .collect();
        for cell in departed {
            if let Some(cache) = self.live.remove(&cell) {
                let token_count = cache.token_count();
                let _ = self.snapshots.insert(cell, memento::encode(&cache));
                debug!("cache {cell} went dormant with {token_count} tokens");
                out_events.push(Event::CacheDeactivated { cell, token_count });
            }
        }

        let mut revealed = Vec::new();
        for cell in cells {
            if self.live.contains_key(&cell) {
                continue;
            }

            let Some(snapshot) = self.snapshots.get(&cell) else {
                revealed.push(cell);
                continue;
            };

            match memento::decode(snapshot) {
                Ok(decoded) => {
                    let cache = Cache::new(cell, decoded.token_count());
                    let token_count = cache.token_count();
                    let _ = self.live.insert(cell, cache);
                    debug!("cache {cell} activated with {token_count} tokens");
                    out_events.push(Event::CacheActivated { cell, token_count });
                }
                Err(error) => {
                    warn!("dropping unreadable snapshot for cell {cell}: {error}");
                    let _ = self.snapshots.remove(&cell);
                    revealed.push(cell);
                }
            }
        }

        self.visible = visible;

        if !revealed.is_empty() {
            out_events.push(Event::CellsRevealed { cells: revealed });
        }
    }

    fn spawn_cache(&mut self, cell: CellCoord, token_count: u32, out_events: &mut Vec<Event>) {
        if !self.visible.contains(&cell)
            || self.snapshots.contains_key(&cell)
            || self.live.contains_key(&cell)
        {
            return;
        }
        if token_count > MAX_CACHE_TOKENS {
            warn!("refusing to spawn cache {cell} with {token_count} tokens");
            return;
        }

        let cache = Cache::new(cell, token_count);
        let _ = self.snapshots.insert(cell, memento::encode(&cache));
        let _ = self.live.insert(cell, cache);
        debug!("cache {cell} spawned with {token_count} tokens");
        out_events.push(Event::CacheSpawned { cell, token_count });
    }

    fn collect(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(cache) = self.live.get_mut(&cell) else {
            return;
        };
        let Some(token) = cache.take_token() else {
            return;
        };

        self.inventory.push_back(token);
        let _ = self.snapshots.insert(cell, memento::encode(cache));
        out_events.push(Event::TokenCollected { cell, token });
    }

    fn deposit(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let Some(cache) = self.live.get_mut(&cell) else {
            return;
        };
        if cache.token_count() >= MAX_CACHE_TOKENS {
            return;
        }
        let Some(token) = self.inventory.pop_front() else {
            return;
        };

        cache.put_token(token);
        let _ = self.snapshots.insert(cell, memento::encode(cache));
        out_events.push(Event::TokenDeposited { cell, token });
    }

    fn resolve_fix(
        &mut self,
        ticket: FixTicket,
        reading: Result<GeoPoint, SensorError>,
        out_events: &mut Vec<Event>,
    ) {
        if !self.fixes.is_current(ticket) {
            debug!("discarding stale location fix {}", ticket.get());
            out_events.push(Event::LocationFixDiscarded { ticket });
            return;
        }

        let reading = reading.and_then(|point| {
            if point.is_on_globe() {
                Ok(point)
            } else {
                Err(SensorError::AcquisitionFailed(format!(
                    "reading ({}, {}) is not on the globe",
                    point.lat(),
                    point.lng()
                )))
            }
        });

        match reading {
            Ok(point) => {
                self.fixes.settle(ticket);
                self.relocate(point, out_events);
            }
            Err(error) => {
                warn!("location fix {} failed: {error}", ticket.get());
                out_events.push(Event::LocationFixFailed { ticket, error });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Refresh => world.recompute_visibility(out_events),
        Command::MovePlayer { direction } => {
            let (d_lat, d_lng) = direction.displacement(world.step_size);
            let to = world.position.offset(d_lat, d_lng);
            if !to.is_on_globe() {
                debug!("ignoring step {direction:?} off the globe");
                return;
            }
            world.fixes.supersede_pending();
            world.relocate(to, out_events);
        }
        Command::RequestLocationFix => {
            let ticket = world.fixes.issue();
            out_events.push(Event::LocationFixRequested { ticket });
        }
        Command::ResolveLocationFix { ticket, reading } => {
            world.resolve_fix(ticket, reading, out_events);
        }
        Command::SpawnCache { cell, token_count } => {
            world.spawn_cache(cell, token_count, out_events);
        }
        Command::Collect { cell } => world.collect(cell, out_events),
        Command::Deposit { cell } => world.deposit(cell, out_events),
    }
}

/// Lifecycle state of a cell's cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// No snapshot exists: the cell was never evaluated or holds no cache.
    Vacant,
    /// A snapshot exists but the cache is not materialized.
    Dormant,
    /// The cache is materialized with a live inventory.
    Active,
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use geocoin_core::{CellBounds, CellCoord, GeoPoint, Token};

    use super::{memento, Board, CellState, Memento, MementoError, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the board geometry.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(world: &World) -> GeoPoint {
        world.position
    }

    /// Cell containing the player.
    #[must_use]
    pub fn player_cell(world: &World) -> CellCoord {
        world.board.cell_for_point(world.position)
    }

    /// Points accumulated by the player.
    #[must_use]
    pub fn player_points(world: &World) -> u64 {
        world.points
    }

    /// Tokens carried by the player, head first.
    pub fn player_inventory(world: &World) -> impl ExactSizeIterator<Item = Token> + '_ {
        world.inventory.iter().copied()
    }

    /// Cells visible after the most recent recompute, in ascending order.
    #[must_use]
    pub fn visible_cells(world: &World) -> Vec<CellCoord> {
        world.visible.iter().copied().collect()
    }

    /// Cells whose caches are currently materialized, in ascending order.
    #[must_use]
    pub fn active_caches(world: &World) -> Vec<CellCoord> {
        world.live.keys().copied().collect()
    }

    /// Reports the lifecycle state of the provided cell.
    #[must_use]
    pub fn cell_state(world: &World, cell: CellCoord) -> CellState {
        if world.live.contains_key(&cell) {
            CellState::Active
        } else if world.snapshots.contains_key(&cell) {
            CellState::Dormant
        } else {
            CellState::Vacant
        }
    }

    /// Latest snapshot recorded for the cell, if any.
    #[must_use]
    pub fn snapshot(world: &World, cell: CellCoord) -> Option<&Memento> {
        world.snapshots.get(&cell)
    }

    /// Iterates every recorded snapshot in ascending cell order.
    pub fn snapshots(world: &World) -> impl Iterator<Item = (CellCoord, &Memento)> + '_ {
        world.snapshots.iter().map(|(cell, memento)| (*cell, memento))
    }

    /// Captures the presentable state of an active cache.
    #[must_use]
    pub fn cache_view(world: &World, cell: CellCoord) -> Option<CacheView> {
        let cache = world.live.get(&cell)?;
        Some(CacheView {
            cell,
            bounds: world.board.cell_bounds(cell),
            tokens: cache.tokens().copied().collect(),
        })
    }

    /// Counts every token in the world: live caches, dormant snapshots and
    /// the player's inventory.
    ///
    /// Fails on the first dormant snapshot that cannot be read.
    pub fn total_tokens(world: &World) -> Result<u64, MementoError> {
        let mut total = world.inventory.len() as u64;
        for (cell, snapshot) in &world.snapshots {
            total += match world.live.get(cell) {
                Some(cache) => u64::from(cache.token_count()),
                None => u64::from(memento::summarize(snapshot)?.token_count),
            };
        }
        Ok(total)
    }

    /// Immutable representation of an active cache used for presentation.
    #[derive(Clone, Debug, PartialEq)]
    pub struct CacheView {
        /// Cell owning the cache.
        pub cell: CellCoord,
        /// Coordinate rectangle covered by the cell.
        pub bounds: CellBounds,
        /// Tokens held by the cache, head first.
        pub tokens: Vec<Token>,
    }
}

/// Hands out location fix tickets and decides which readings are still
/// meaningful.
///
/// A reading is applied only if its ticket was issued after the most recent
/// manual move and after the ticket of the last applied fix.
#[derive(Debug)]
struct FixSequencer {
    next: u64,
    oldest_valid: u64,
}

impl FixSequencer {
    fn new() -> Self {
        Self {
            next: 0,
            oldest_valid: 0,
        }
    }

    fn issue(&mut self) -> FixTicket {
        let ticket = FixTicket::new(self.next);
        self.next = self.next.saturating_add(1);
        ticket
    }

    fn supersede_pending(&mut self) {
        self.oldest_valid = self.next;
    }

    fn is_current(&self, ticket: FixTicket) -> bool {
        ticket.get() >= self.oldest_valid && ticket.get() < self.next
    }

    fn settle(&mut self, ticket: FixTicket) {
        self.oldest_valid = ticket.get().saturating_add(1);
    }
}
