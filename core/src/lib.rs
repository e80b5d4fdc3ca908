#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Geocoin engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Geocoin.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Recomputes the visible cell set around the current player position.
    Refresh,
    /// Displaces the player by one step in the provided direction.
    MovePlayer {
        /// Direction of travel for the step.
        direction: Direction,
    },
    /// Requests that the world issue a ticket for an asynchronous location fix.
    RequestLocationFix,
    /// Delivers the outcome of a previously requested location fix.
    ResolveLocationFix {
        /// Ticket handed out when the fix was requested.
        ticket: FixTicket,
        /// Reading supplied by the sensor, or the reason acquisition failed.
        reading: Result<GeoPoint, SensorError>,
    },
    /// Requests that a cache be created inside a freshly revealed cell.
    SpawnCache {
        /// Cell that will own the cache.
        cell: CellCoord,
        /// Number of tokens the cache starts with.
        token_count: u32,
    },
    /// Moves the head token of an active cache into the player's inventory.
    Collect {
        /// Cell whose cache should surrender a token.
        cell: CellCoord,
    },
    /// Moves the head token of the player's inventory into an active cache.
    Deposit {
        /// Cell whose cache should receive the token.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the player position changed.
    PlayerMoved {
        /// Position held before the move.
        from: GeoPoint,
        /// Position held after the move.
        to: GeoPoint,
    },
    /// Announces that the set of visible cells was recomputed and differs from
    /// the previous one.
    VisibilityChanged {
        /// Cell containing the player position.
        origin: CellCoord,
        /// Number of cells now visible.
        visible: usize,
    },
    /// Lists visible cells that have never held a cache snapshot.
    CellsRevealed {
        /// Revealed cells in row-major order.
        cells: Vec<CellCoord>,
    },
    /// Confirms that a brand new cache was created in a cell.
    CacheSpawned {
        /// Cell owning the cache.
        cell: CellCoord,
        /// Number of tokens placed into the cache.
        token_count: u32,
    },
    /// Confirms that a dormant cache was restored from its snapshot.
    CacheActivated {
        /// Cell owning the cache.
        cell: CellCoord,
        /// Number of tokens materialized from the snapshot.
        token_count: u32,
    },
    /// Confirms that a cache left visibility and was reduced to its snapshot.
    CacheDeactivated {
        /// Cell owning the cache.
        cell: CellCoord,
        /// Number of tokens captured in the snapshot.
        token_count: u32,
    },
    /// Confirms that a token moved from a cache into the player's inventory.
    TokenCollected {
        /// Cell whose cache surrendered the token.
        cell: CellCoord,
        /// Token that changed hands.
        token: Token,
    },
    /// Confirms that a token moved from the player's inventory into a cache.
    TokenDeposited {
        /// Cell whose cache received the token.
        cell: CellCoord,
        /// Token that changed hands.
        token: Token,
    },
    /// Confirms that a location fix ticket was issued.
    LocationFixRequested {
        /// Ticket that must accompany the eventual reading.
        ticket: FixTicket,
    },
    /// Reports that a location fix was ignored because a newer position exists.
    LocationFixDiscarded {
        /// Ticket of the discarded fix.
        ticket: FixTicket,
    },
    /// Reports that the sensor failed to produce a reading.
    LocationFixFailed {
        /// Ticket of the failed fix.
        ticket: FixTicket,
        /// Reason the sensor gave up.
        error: SensorError,
    },
}

/// Largest absolute latitude of a point on the globe, in degrees.
pub const MAX_LATITUDE: f64 = 90.0;
/// Largest absolute longitude of a point on the globe, in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Continuous geographic coordinate expressed in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Creates a new point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Reports whether both coordinates are finite and inside
    /// `[-90, 90]` x `[-180, 180]`.
    #[must_use]
    pub fn is_on_globe(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= MAX_LATITUDE
            && self.lng.abs() <= MAX_LONGITUDE
    }

    /// Returns the point displaced by the provided deltas.
    #[must_use]
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }
}

/// Location of a single grid cell.
///
/// `i` indexes latitude bands and `j` indexes longitude bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    i: i32,
    j: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Latitude band index of the cell.
    #[must_use]
    pub const fn i(&self) -> i32 {
        self.i
    }

    /// Longitude band index of the cell.
    #[must_use]
    pub const fn j(&self) -> i32 {
        self.j
    }

    /// Returns the cell displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, di: i32, dj: i32) -> Self {
        Self::new(self.i.saturating_add(di), self.j.saturating_add(dj))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

impl FromStr for CellCoord {
    type Err = CellKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || CellKeyError::Malformed(value.to_owned());
        let (i, j) = value.split_once(',').ok_or_else(malformed)?;
        let i = i.trim().parse::<i32>().map_err(|_| malformed())?;
        let j = j.trim().parse::<i32>().map_err(|_| malformed())?;
        Ok(Self::new(i, j))
    }
}

/// Errors raised while parsing the textual `i,j` form of a cell.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CellKeyError {
    /// The key did not consist of two comma separated integers.
    #[error("cell key `{0}` is not of the form `i,j`")]
    Malformed(String),
}

/// Rectangular coordinate bounds covered by a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBounds {
    south_west: GeoPoint,
    north_east: GeoPoint,
}

impl CellBounds {
    /// Creates bounds from their south-west and north-east corners.
    #[must_use]
    pub const fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Inclusive south-west corner.
    #[must_use]
    pub const fn south_west(&self) -> GeoPoint {
        self.south_west
    }

    /// Exclusive north-east corner.
    #[must_use]
    pub const fn north_east(&self) -> GeoPoint {
        self.north_east
    }

    /// Reports whether the point lies inside the half-open bounds.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat() >= self.south_west.lat()
            && point.lat() < self.north_east.lat()
            && point.lng() >= self.south_west.lng()
            && point.lng() < self.north_east.lng()
    }
}

/// Collectible unit identified by its origin cell and serial number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    i: i32,
    j: i32,
    serial: u32,
}

impl Token {
    /// Creates a token minted in the provided cell.
    #[must_use]
    pub const fn new(origin: CellCoord, serial: u32) -> Self {
        Self {
            i: origin.i(),
            j: origin.j(),
            serial,
        }
    }

    /// Cell the token was minted in.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        CellCoord::new(self.i, self.j)
    }

    /// Serial number unique within the origin cell at minting time.
    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} #{}", self.i, self.j, self.serial)
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing latitude.
    North,
    /// Movement toward increasing longitude.
    East,
    /// Movement toward decreasing latitude.
    South,
    /// Movement toward decreasing longitude.
    West,
}

impl Direction {
    /// Latitude and longitude deltas for a step of the provided length.
    #[must_use]
    pub fn displacement(self, step: f64) -> (f64, f64) {
        match self {
            Self::North => (step, 0.0),
            Self::East => (0.0, step),
            Self::South => (-step, 0.0),
            Self::West => (0.0, -step),
        }
    }
}

/// Sequence number handed out for each asynchronous location fix request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixTicket(u64);

impl FixTicket {
    /// Creates a ticket with the provided sequence number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the sequence number.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Reasons a location sensor may fail to deliver a reading.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// The device offers no location capability.
    #[error("geolocation is not supported on this device")]
    Unavailable,
    /// The device tried and failed to acquire a fix.
    #[error("error getting geolocation: {0}")]
    AcquisitionFailed(String),
}
