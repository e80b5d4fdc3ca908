#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure presentation system that prepares what the player sees.
//!
//! Adapters feed every event batch through [`Status::handle`] and then ask
//! [`Status::take_redraw`] which parts of the screen went stale. Views are
//! rebuilt on demand from world queries; nothing here mutates the world.

use std::{collections::BTreeSet, fmt};

use geocoin_core::{CellBounds, CellCoord, Event, Token};
use geocoin_world::{query, World};

/// Summary line and inventory listing shown in the status panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusPanel {
    /// Points accumulated by the player.
    pub points: u64,
    /// Tokens carried by the player, head first.
    pub inventory: Vec<Token>,
}

impl fmt::Display for StatusPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points | Inventory: {} coins",
            self.points,
            self.inventory.len()
        )?;
        for token in &self.inventory {
            write!(f, "\n  {token}")?;
        }
        Ok(())
    }
}

/// Contents of the popup bound to an active cache.
#[derive(Clone, Debug, PartialEq)]
pub struct CachePopup {
    /// Cell owning the cache.
    pub cell: CellCoord,
    /// Coordinate rectangle drawn for the cache.
    pub bounds: CellBounds,
    /// Tokens held by the cache, head first.
    pub tokens: Vec<Token>,
    /// Whether the collect action would move a token.
    pub can_collect: bool,
    /// Whether the deposit action would move a token.
    pub can_deposit: bool,
}

impl fmt::Display for CachePopup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cache at \"{}\"\nInventory:", self.cell)?;
        for token in &self.tokens {
            write!(f, "\n  - {token}")?;
        }
        Ok(())
    }
}

/// Parts of the presentation invalidated since the previous redraw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Redraw {
    /// The status panel must be rebuilt.
    pub panel: bool,
    /// Player marker and cache rectangles must be rebuilt.
    pub map: bool,
    /// Cache popups that changed or disappeared.
    pub caches: Vec<CellCoord>,
}

impl Redraw {
    /// Reports whether nothing needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.panel && !self.map && self.caches.is_empty()
    }
}

/// Tracks stale presentation state and builds views from the world.
#[derive(Debug)]
pub struct Status {
    panel_dirty: bool,
    map_dirty: bool,
    dirty_caches: BTreeSet<CellCoord>,
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Status {
    /// Creates a status system that requests a full initial draw.
    #[must_use]
    pub fn new() -> Self {
        Self {
            panel_dirty: true,
            map_dirty: true,
            dirty_caches: BTreeSet::new(),
        }
    }

    /// Consumes world events and records which views went stale.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PlayerMoved { .. } | Event::VisibilityChanged { .. } => {
                    self.map_dirty = true;
                }
                Event::CacheSpawned { cell, .. }
                | Event::CacheActivated { cell, .. }
                | Event::CacheDeactivated { cell, .. } => {
                    self.map_dirty = true;
                    let _ = self.dirty_caches.insert(*cell);
                }
                Event::TokenCollected { cell, .. } | Event::TokenDeposited { cell, .. } => {
                    self.panel_dirty = true;
                    let _ = self.dirty_caches.insert(*cell);
                }
                Event::CellsRevealed { .. }
                | Event::LocationFixRequested { .. }
                | Event::LocationFixDiscarded { .. }
                | Event::LocationFixFailed { .. } => {}
            }
        }
    }

    /// Returns and clears the accumulated redraw requests.
    pub fn take_redraw(&mut self) -> Redraw {
        let redraw = Redraw {
            panel: self.panel_dirty,
            map: self.map_dirty,
            caches: std::mem::take(&mut self.dirty_caches).into_iter().collect(),
        };
        self.panel_dirty = false;
        self.map_dirty = false;
        redraw
    }

    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Builds the status panel from the player's current state.
    #[must_use]
    pub fn status_panel(&self, world: &World) -> StatusPanel {
        StatusPanel {
            points: query::player_points(world),
            inventory: query::player_inventory(world).collect(),
        }
    }

    /// Builds the popup for the cache in `cell`, if that cache is active.
    #[must_use]
    pub fn cache_popup(&self, world: &World, cell: CellCoord) -> Option<CachePopup> {
        let view = query::cache_view(world, cell)?;
        Some(CachePopup {
            cell: view.cell,
            bounds: view.bounds,
            can_collect: !view.tokens.is_empty(),
            can_deposit: query::player_inventory(world).len() > 0,
            tokens: view.tokens,
        })
    }
}
