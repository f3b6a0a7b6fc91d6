//! Markdown description of the selected factors.

use serde::{Deserialize, Serialize};
use storage::LayerCatalog;

use habitat_common::HabitatResult;

/// Markdown hard line break.
const BREAK: &str = "  \n";

/// Fixed text of the description panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionLabels {
    pub positive_heading: String,
    pub negative_heading: String,
    /// Line shown for a section with no factors
    pub none_selected: String,
    /// Whole description when nothing at all is selected
    pub no_selection: String,
}

impl Default for DescriptionLabels {
    fn default() -> Self {
        Self {
            positive_heading: "**Positive factors with coefficient +1:**".to_string(),
            negative_heading: "**Negative factors with coefficient -1:**".to_string(),
            none_selected: "- None selected".to_string(),
            no_selection: "No factors selected.".to_string(),
        }
    }
}

/// Build the description for a selection.
///
/// Every name must be in the catalog. The negative section closes the text,
/// so its empty-section placeholder carries no trailing break.
pub fn describe(
    positive: &[String],
    negative: &[String],
    catalog: &LayerCatalog,
    labels: &DescriptionLabels,
) -> HabitatResult<String> {
    let mut text = String::new();

    text.push_str(&labels.positive_heading);
    text.push_str(BREAK);
    if positive.is_empty() {
        text.push_str(&labels.none_selected);
        text.push_str(BREAK);
    } else {
        push_factors(&mut text, positive, catalog)?;
    }

    text.push_str(BREAK);
    text.push_str(&labels.negative_heading);
    text.push_str(BREAK);
    if negative.is_empty() {
        text.push_str(&labels.none_selected);
    } else {
        push_factors(&mut text, negative, catalog)?;
    }

    Ok(text)
}

fn push_factors(text: &mut String, names: &[String], catalog: &LayerCatalog) -> HabitatResult<()> {
    for name in names {
        let entry = catalog.lookup(name)?;
        text.push_str("***- ");
        text.push_str(&entry.name);
        text.push_str("***");
        text.push_str(BREAK);
        text.push_str(&entry.comment);
        text.push_str(BREAK);
    }
    Ok(())
}
