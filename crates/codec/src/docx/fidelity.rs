//! Import/export fidelity tracking
//!
//! Every place where the codec degrades content instead of failing records
//! a warning here. Warnings are keyed by code and counted, so a document
//! with fifty unreadable images yields one `image-unreadable` entry with a
//! count of fifty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Warning codes emitted by the reader and writer
pub mod codes {
    pub const IMAGE_UNREADABLE: &str = "image-unreadable";
    pub const CHART_UNRESOLVED: &str = "chart-unresolved";
    pub const CHART_IN_TABLE: &str = "chart-in-table";
    pub const NESTED_TABLE: &str = "nested-table";
    pub const STYLE_CYCLE: &str = "style-cycle";
    pub const SHAPE_NOT_PERSISTED: &str = "shape-not-persisted";
    pub const EMPTY_IMAGE_SKIPPED: &str = "empty-image-skipped";
}

/// Severity of a fidelity warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningSeverity {
    /// No data loss, but behavior may differ
    Info,
    /// Small formatting differences possible
    Minor,
    /// Some content may look different
    Moderate,
    /// Content is dropped
    Major,
}

/// Category of feature that caused the warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    Tables,
    Images,
    Shapes,
    Charts,
    Styles,
}

/// A single fidelity warning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FidelityWarning {
    pub code: String,
    /// Human-readable message of the first occurrence
    pub message: String,
    pub severity: WarningSeverity,
    pub category: FeatureCategory,
    /// Count of occurrences
    pub count: usize,
}

impl FidelityWarning {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: WarningSeverity,
        category: FeatureCategory,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            category,
            count: 1,
        }
    }

    pub fn image_unreadable(target: &str) -> Self {
        Self::new(
            codes::IMAGE_UNREADABLE,
            format!("image '{}' could not be read; kept as an empty image", target),
            WarningSeverity::Moderate,
            FeatureCategory::Images,
        )
    }

    pub fn chart_unresolved(relationship_id: &str) -> Self {
        Self::new(
            codes::CHART_UNRESOLVED,
            format!("chart '{}' has no readable chart part", relationship_id),
            WarningSeverity::Major,
            FeatureCategory::Charts,
        )
    }

    pub fn chart_in_table() -> Self {
        Self::new(
            codes::CHART_IN_TABLE,
            "charts inside table cells are not supported and were dropped",
            WarningSeverity::Major,
            FeatureCategory::Charts,
        )
    }

    pub fn nested_table() -> Self {
        Self::new(
            codes::NESTED_TABLE,
            "nested table flattened into the enclosing cell",
            WarningSeverity::Moderate,
            FeatureCategory::Tables,
        )
    }

    pub fn style_cycle(detail: &str) -> Self {
        Self::new(
            codes::STYLE_CYCLE,
            format!("table style inheritance loops ({}); style not applied", detail),
            WarningSeverity::Minor,
            FeatureCategory::Styles,
        )
    }

    pub fn shape_not_persisted(kind: &str) -> Self {
        Self::new(
            codes::SHAPE_NOT_PERSISTED,
            format!("{} shape has no markup representation and was not saved", kind),
            WarningSeverity::Major,
            FeatureCategory::Shapes,
        )
    }

    pub fn empty_image_skipped() -> Self {
        Self::new(
            codes::EMPTY_IMAGE_SKIPPED,
            "image without data was not saved",
            WarningSeverity::Minor,
            FeatureCategory::Images,
        )
    }
}

/// Tracks fidelity warnings during import/export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FidelityTracker {
    warnings: BTreeMap<String, FidelityWarning>,
}

impl FidelityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning, counting repeats of the same code
    pub fn add_warning(&mut self, warning: FidelityWarning) {
        tracing::warn!(code = %warning.code, "{}", warning.message);
        self.warnings
            .entry(warning.code.clone())
            .and_modify(|w| w.count += 1)
            .or_insert(warning);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &FidelityWarning> {
        self.warnings.values()
    }

    pub fn warning(&self, code: &str) -> Option<&FidelityWarning> {
        self.warnings.get(code)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.contains_key(code)
    }

    /// Occurrences of `code`, 0 when never seen
    pub fn count(&self, code: &str) -> usize {
        self.warnings.get(code).map_or(0, |w| w.count)
    }

    pub fn warnings_by_category(&self, category: FeatureCategory) -> Vec<&FidelityWarning> {
        self.warnings
            .values()
            .filter(|w| w.category == category)
            .collect()
    }

    pub fn worst_severity(&self) -> Option<WarningSeverity> {
        self.warnings.values().map(|w| w.severity).max()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_codes_are_counted() {
        let mut tracker = FidelityTracker::new();
        tracker.add_warning(FidelityWarning::image_unreadable("media/a.png"));
        tracker.add_warning(FidelityWarning::image_unreadable("media/b.png"));
        tracker.add_warning(FidelityWarning::nested_table());

        assert_eq!(tracker.count(codes::IMAGE_UNREADABLE), 2);
        assert_eq!(tracker.count(codes::NESTED_TABLE), 1);
        assert_eq!(tracker.count(codes::STYLE_CYCLE), 0);
        // first message is kept
        assert!(tracker
            .warning(codes::IMAGE_UNREADABLE)
            .unwrap()
            .message
            .contains("media/a.png"));
    }

    #[test]
    fn test_severity_and_category() {
        let mut tracker = FidelityTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.worst_severity(), None);

        tracker.add_warning(FidelityWarning::shape_not_persisted("Rectangle"));
        tracker.add_warning(FidelityWarning::empty_image_skipped());
        assert_eq!(tracker.worst_severity(), Some(WarningSeverity::Major));
        assert_eq!(tracker.warnings_by_category(FeatureCategory::Images).len(), 1);
    }
}
