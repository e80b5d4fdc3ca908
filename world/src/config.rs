//! World configuration.

use geocoin_core::GeoPoint;
use serde::Deserialize;

/// Side length of a cell in degrees.
pub const DEFAULT_TILE_WIDTH: f64 = 1e-4;
/// Number of cells visible in each direction around the player.
pub const DEFAULT_VISIBILITY_RADIUS: u32 = 8;
/// Distance covered by a single movement step in degrees.
pub const DEFAULT_STEP_SIZE: f64 = 1e-4;
/// Position assigned to a fresh player.
pub const DEFAULT_START_POSITION: GeoPoint = GeoPoint::new(36.98949379578401, -122.06277128548504);

/// Parameters required to construct a [`crate::World`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Side length of a cell in degrees.
    pub tile_width: f64,
    /// Number of cells visible in each direction around the player.
    pub visibility_radius: u32,
    /// Distance covered by a single movement step in degrees.
    pub step_size: f64,
    /// Position assigned to a fresh player.
    pub start_position: GeoPoint,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tile_width: DEFAULT_TILE_WIDTH,
            visibility_radius: DEFAULT_VISIBILITY_RADIUS,
            step_size: DEFAULT_STEP_SIZE,
            start_position: DEFAULT_START_POSITION,
        }
    }
}
