//! Common types shared across the habitat overlay crates and service.

pub mod bbox;
pub mod error;
pub mod grid;

pub use bbox::{BoundingBox, LeafletBounds};
pub use error::{HabitatError, HabitatResult};
pub use grid::RasterGrid;
