//! Chart elements placed in the document flow

use charts::Chart;
use serde::{Deserialize, Serialize};

/// A chart placed in the document with its display extent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub content: ChartContent,
    /// Width in points
    pub width: f32,
    /// Height in points
    pub height: f32,
}

/// Chart data, or the reference still waiting to be resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartContent {
    Resolved(Chart),
    /// Placeholder emitted by the markup reader; only the relationship id
    /// of the chart part is known
    Unresolved { relationship_id: String },
}

impl ChartFrame {
    /// Default extent of new charts: 6in x 3.5in
    pub const DEFAULT_WIDTH: f32 = 432.0;
    pub const DEFAULT_HEIGHT: f32 = 252.0;

    pub fn new(chart: Chart) -> Self {
        Self {
            content: ChartContent::Resolved(chart),
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }

    pub fn placeholder(relationship_id: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            content: ChartContent::Unresolved {
                relationship_id: relationship_id.into(),
            },
            width,
            height,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn chart(&self) -> Option<&Chart> {
        match &self.content {
            ChartContent::Resolved(chart) => Some(chart),
            ChartContent::Unresolved { .. } => None,
        }
    }

    pub fn chart_mut(&mut self) -> Option<&mut Chart> {
        match &mut self.content {
            ChartContent::Resolved(chart) => Some(chart),
            ChartContent::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.content, ChartContent::Resolved(_))
    }

    /// Substitute parsed chart data for the placeholder
    pub fn resolve(&mut self, chart: Chart) {
        self.content = ChartContent::Resolved(chart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charts::{ChartSeries, ChartType};

    #[test]
    fn test_placeholder_resolution() {
        let mut frame = ChartFrame::placeholder("rId7", 300.0, 200.0);
        assert!(!frame.is_resolved());
        assert!(frame.chart().is_none());

        let chart = Chart::new(ChartType::Line).with_series(ChartSeries::new(
            "S",
            vec!["a".into()],
            vec![1.0],
        ));
        frame.resolve(chart.clone());
        assert_eq!(frame.chart(), Some(&chart));
        assert_eq!(frame.width, 300.0);
    }
}
