//! Discrete grid overlaid on geographic coordinates.

use geocoin_core::{CellBounds, CellCoord, GeoPoint, MAX_LONGITUDE};

/// Errors raised while configuring the board.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum BoardError {
    /// Tile width must be a finite, strictly positive number of degrees,
    /// coarse enough that every cell near the globe indexes into `i32`.
    #[error("tile width must be finite, positive and at least {min} degrees, got {width}")]
    InvalidTileWidth {
        /// Rejected width.
        width: f64,
        /// Smallest width accepted for the configured radius.
        min: f64,
    },
    /// The start position is not a finite point on the globe.
    #[error("start position ({}, {}) is not on the globe", .0.lat(), .0.lng())]
    InvalidStartPosition(GeoPoint),
}

/// Maps continuous coordinates onto square cells of a fixed width.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    tile_width: f64,
    visibility_radius: u32,
}

impl Board {
    /// Creates a board whose cells span `tile_width` degrees on both axes.
    pub fn new(tile_width: f64, visibility_radius: u32) -> Result<Self, BoardError> {
        let min = min_tile_width(visibility_radius);
        if !tile_width.is_finite() || tile_width < min {
            return Err(BoardError::InvalidTileWidth {
                width: tile_width,
                min,
            });
        }

        Ok(Self {
            tile_width,
            visibility_radius,
        })
    }

    /// Side length of a cell in degrees.
    #[must_use]
    pub const fn tile_width(&self) -> f64 {
        self.tile_width
    }

    /// Number of cells visible in each direction around the player.
    #[must_use]
    pub const fn visibility_radius(&self) -> u32 {
        self.visibility_radius
    }

    /// Resolves the cell containing the provided point.
    ///
    /// Any two points that floor-divide to the same indices yield equal cells,
    /// so the result can be used directly as a map key.
    #[must_use]
    pub fn cell_for_point(&self, point: GeoPoint) -> CellCoord {
        CellCoord::new(
            floor_index(point.lat(), self.tile_width),
            floor_index(point.lng(), self.tile_width),
        )
    }

    /// Returns the half-open coordinate rectangle covered by the cell.
    #[must_use]
    pub fn cell_bounds(&self, cell: CellCoord) -> CellBounds {
        let width = self.tile_width;
        let south_west = GeoPoint::new(f64::from(cell.i()) * width, f64::from(cell.j()) * width);
        let north_east = GeoPoint::new(
            (f64::from(cell.i()) + 1.0) * width,
            (f64::from(cell.j()) + 1.0) * width,
        );
        CellBounds::new(south_west, north_east)
    }

    /// Enumerates the cells within the board's visibility radius of `point`.
    #[must_use]
    pub fn cells_near(&self, point: GeoPoint) -> Vec<CellCoord> {
        self.cells_near_with_radius(point, self.visibility_radius)
    }

    /// Enumerates the `(2 * radius + 1)^2` cells of the square neighbourhood
    /// centred on the cell containing `point`, in row-major order.
    #[must_use]
    pub fn cells_near_with_radius(&self, point: GeoPoint, radius: u32) -> Vec<CellCoord> {
        let origin = self.cell_for_point(point);
        let radius = i32::try_from(radius).unwrap_or(i32::MAX);
        let side = usize::try_from(radius)
            .ok()
            .and_then(|r| r.checked_mul(2))
            .and_then(|d| d.checked_add(1))
            .unwrap_or(0);

        let mut cells = Vec::with_capacity(side.saturating_mul(side));
        for di in -radius..=radius {
            for dj in -radius..=radius {
                cells.push(origin.offset(di, dj));
            }
        }
        cells
    }
}

/// Smallest width for which `MAX_LONGITUDE / width` plus the radius stays
/// below `i32::MAX`.
fn min_tile_width(visibility_radius: u32) -> f64 {
    let headroom = f64::from(i32::MAX) - f64::from(visibility_radius) - 1.0;
    if headroom <= 0.0 {
        f64::INFINITY
    } else {
        (MAX_LONGITUDE / headroom).max(f64::MIN_POSITIVE)
    }
}

fn floor_index(value: f64, width: f64) -> i32 {
    (value / width).floor() as i32
}
