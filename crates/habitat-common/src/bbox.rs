//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// Corner pair in the order Leaflet's image overlay expects:
/// `[[south, west], [north, east]]`.
pub type LeafletBounds = [[f64; 2]; 2];

/// A geographic bounding box in degrees.
///
/// `min_x`/`max_x` are the west/east longitudes, `min_y`/`max_y` the
/// south/north latitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from west, south, east, north.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build from Leaflet-ordered corners `[[south, west], [north, east]]`.
    pub fn from_leaflet(bounds: LeafletBounds) -> Self {
        let [[south, west], [north, east]] = bounds;
        Self::new(west, south, east, north)
    }

    /// Leaflet-ordered corners `[[south, west], [north, east]]`.
    pub fn to_leaflet(&self) -> LeafletBounds {
        [[self.min_y, self.min_x], [self.max_y, self.max_x]]
    }

    pub fn west(&self) -> f64 {
        self.min_x
    }

    pub fn south(&self) -> f64 {
        self.min_y
    }

    pub fn east(&self) -> f64 {
        self.max_x
    }

    pub fn north(&self) -> f64 {
        self.max_y
    }

    /// Width of the bounding box in degrees.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// All edges finite, with west < east and south < north.
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x < self.max_x
            && self.min_y < self.max_y
    }

    /// Edge-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min_x - other.min_x).abs() <= tolerance
            && (self.min_y - other.min_y).abs() <= tolerance
            && (self.max_x - other.max_x).abs() <= tolerance
            && (self.max_y - other.max_y).abs() <= tolerance
    }
}
