//! Request and response types for the composite pipeline.

use habitat_common::{HabitatError, HabitatResult, LeafletBounds};
use serde::{Deserialize, Serialize};

fn default_transparency() -> f64 {
    0.5
}

/// Factor selection and display settings from the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRequest {
    #[serde(default)]
    pub positive_factors: Vec<String>,
    #[serde(default)]
    pub negative_factors: Vec<String>,
    /// Overlay opacity in [0, 1], passed through to the response
    #[serde(default = "default_transparency")]
    pub transparency: f64,
    /// Percent of the composite maximum below which pixels are hidden
    #[serde(default)]
    pub threshold_percent: u32,
}

impl Default for CompositeRequest {
    fn default() -> Self {
        Self {
            positive_factors: Vec::new(),
            negative_factors: Vec::new(),
            transparency: default_transparency(),
            threshold_percent: 0,
        }
    }
}

impl CompositeRequest {
    /// Check the display settings and return the threshold as a percentage.
    pub fn validate(&self) -> HabitatResult<u8> {
        if !self.transparency.is_finite() || !(0.0..=1.0).contains(&self.transparency) {
            return Err(HabitatError::invalid_parameter(
                "transparency",
                format!("must be between 0 and 1, got {}", self.transparency),
            ));
        }
        if self.threshold_percent > 100 {
            return Err(HabitatError::invalid_parameter(
                "threshold_percent",
                format!("must be between 0 and 100, got {}", self.threshold_percent),
            ));
        }
        Ok(self.threshold_percent as u8)
    }

    pub fn selection(&self) -> FactorSelection {
        FactorSelection::new(self.positive_factors.clone(), self.negative_factors.clone())
    }
}

/// Positive and negative factor names with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactorSelection {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl FactorSelection {
    /// Drops repeated names within each list, keeping first occurrences in
    /// order. A name may still appear in both lists.
    pub fn new(positive: Vec<String>, negative: Vec<String>) -> Self {
        Self {
            positive: dedup_preserving_order(positive),
            negative: dedup_preserving_order(negative),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Number of layers contributing to the average.
    pub fn factor_count(&self) -> usize {
        self.positive.len() + self.negative.len()
    }
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Overlay image location plus the text shown next to the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    /// Image URL with a freshness token, empty when nothing was rendered
    pub image_url: String,
    /// `[[south, west], [north, east]]`
    pub bounds: LeafletBounds,
    pub opacity: f64,
    /// Markdown
    pub description: String,
}
