//! Common test fixtures for habitat overlay tests.

/// Common bounding box definitions for testing.
pub mod bbox {
    use habitat_common::BoundingBox;

    /// Default map view (west, south, east, north)
    pub const DEFAULT_VIEW: (f64, f64, f64, f64) = (24.0, 56.0, 26.0, 58.0);

    /// Extent of the Cēsis study area rasters
    pub const CESIS: (f64, f64, f64, f64) = (24.77478809, 56.91368127, 26.189455608, 57.507346438);

    pub fn default_view() -> BoundingBox {
        to_bbox(DEFAULT_VIEW)
    }

    pub fn cesis() -> BoundingBox {
        to_bbox(CESIS)
    }

    pub fn to_bbox((min_x, min_y, max_x, max_y): (f64, f64, f64, f64)) -> BoundingBox {
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }
}

/// Factor names and comments used across suites.
pub mod factors {
    pub const ROADS: &str = "Roads";
    pub const ROADS_COMMENT: &str = "Distance to the nearest road";

    pub const FOREST_EDGE: &str = "Forest edge";
    pub const FOREST_EDGE_COMMENT: &str = "Edge habitat within *50 m* of forest";

    pub const WETLANDS: &str = "Wetlands";
    pub const WETLANDS_COMMENT: &str = "Open wetland cover";

    /// A name that is never in any fixture catalog.
    pub const UNKNOWN: &str = "Volcanoes";
}

/// Catalog CSV snippets.
pub mod catalog {
    /// Minimal well-formed catalog.
    pub const TWO_FACTORS: &str = "\
Name,Layer,Comment
Roads,roads.tif,Distance to the nearest road
Forest edge,forest_edge.tif,Edge habitat within *50 m* of forest
";

    /// Catalog without the Comment column.
    pub const MISSING_COMMENT_COLUMN: &str = "\
Name,Layer
Roads,roads.tif
";

    /// Catalog listing the same factor twice.
    pub const DUPLICATE_NAMES: &str = "\
Name,Layer,Comment
Roads,roads.tif,first
Roads,roads_2.tif,second
";
}
