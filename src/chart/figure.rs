use crate::chart::color::Rgb;
use crate::chart::spec::{ChartKind, Threshold};

/// Physical figure size; pixel size is this times the output DPI.
pub const FIGURE_WIDTH_IN: f64 = 6.0;
pub const FIGURE_HEIGHT_IN: f64 = 4.0;

/// Rotation applied to category tick labels on vertical bar charts.
pub const CATEGORY_LABEL_ROTATION: f32 = 45.0;

/// Resolved drawing primitives, shared by the raster and interactive
/// renderers.
#[derive(Debug, Clone, PartialEq)]
pub enum Marks {
    /// `edges.len() == counts.len() + 1`.
    Histogram { edges: Vec<f64>, counts: Vec<usize> },
    /// Bar `i` sits at category position `i` on the category axis.
    Bars {
        labels: Vec<String>,
        values: Vec<f64>,
        horizontal: bool,
    },
    Line { points: Vec<(f64, f64)> },
    Scatter { points: Vec<(f64, f64)> },
}

/// A chart ready to draw. Axis labels are already swapped for horizontal
/// bars, so `x_label` always describes the horizontal axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub accent: Rgb,
    pub marks: Marks,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// Degrees; zero for unrotated tick labels.
    pub x_label_rotation: f32,
    pub threshold: Option<Threshold>,
}

impl Figure {
    /// Category names when one axis is categorical.
    pub fn categories(&self) -> Option<&[String]> {
        match &self.marks {
            Marks::Bars { labels, .. } => Some(labels),
            _ => None,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self.marks, Marks::Bars { horizontal: true, .. })
    }

    pub fn shows_legend(&self) -> bool {
        self.threshold.as_ref().is_some_and(|t| !t.label.is_empty())
    }

    /// Number of drawn bars, bins or points.
    pub fn mark_count(&self) -> usize {
        match &self.marks {
            Marks::Histogram { counts, .. } => counts.len(),
            Marks::Bars { values, .. } => values.len(),
            Marks::Line { points } | Marks::Scatter { points } => points.len(),
        }
    }

    /// A safe file name derived from the title.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .title
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let stem = stem.trim_matches('_');
        if stem.is_empty() { "custom_chart".to_string() } else { stem.to_string() }
    }
}

/// Label of the category nearest to an axis position, if the position sits
/// on a category.
pub fn category_at(labels: &[String], position: f64) -> Option<&str> {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return None;
    }
    labels.get(rounded as usize).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_lookup_requires_integral_positions() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_at(&labels, 0.0), Some("a"));
        assert_eq!(category_at(&labels, 1.0000001), Some("b"));
        assert_eq!(category_at(&labels, 0.5), None);
        assert_eq!(category_at(&labels, -1.0), None);
        assert_eq!(category_at(&labels, 2.0), None);
    }
}
