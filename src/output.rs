//! Operator-facing rendering of a selected rectangle.

use crate::config::{OutputFormat, Settings};
use crate::geometry::OriginalRect;

/// Applies the corner policy from `settings`.
pub fn reported(rect: OriginalRect, settings: &Settings) -> OriginalRect {
    if settings.normalize {
        rect.normalized()
    } else {
        rect
    }
}

pub fn format_rect(rect: OriginalRect, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let [x1, y1, x2, y2] = rect.to_array();
            format!("Rectangle Coordinates (original size): [{x1}, {y1}, {x2}, {y2}]")
        }
        // a struct of four integers always serializes
        OutputFormat::Json => serde_json::to_string(&rect).unwrap_or_default(),
    }
}
