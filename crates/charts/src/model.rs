//! Chart model types
//!
//! This module defines the data structures for representing charts:
//! the plot type, title, legend placement, bar layout and data series.

use serde::{Deserialize, Serialize};

/// A complete chart representation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chart {
    /// The type of chart (bar, line, pie, etc.)
    pub chart_type: ChartType,
    /// Optional chart title
    pub title: Option<String>,
    /// Where the legend is drawn
    pub legend: LegendPosition,
    /// Bar orientation (only meaningful for bar charts)
    pub bar_direction: BarDirection,
    /// Bar grouping (only meaningful for bar charts)
    pub bar_grouping: BarGrouping,
    /// Data series, in plot order
    pub series: Vec<ChartSeries>,
}

impl Chart {
    /// Create a new chart of the given type
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            ..Default::default()
        }
    }

    /// Set the chart title
    pub fn with_title(mut self, text: impl Into<String>) -> Self {
        self.title = Some(text.into());
        self
    }

    /// Set the legend position
    pub fn with_legend(mut self, position: LegendPosition) -> Self {
        self.legend = position;
        self
    }

    /// Add a data series
    pub fn add_series(&mut self, series: ChartSeries) {
        self.series.push(series);
    }

    /// Builder-style variant of [`Chart::add_series`]
    pub fn with_series(mut self, series: ChartSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Whether the plot type uses bar direction and grouping
    pub fn is_bar(&self) -> bool {
        matches!(self.chart_type, ChartType::Bar | ChartType::Bar3D)
    }
}

/// Types of charts supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    #[default]
    Bar,
    Bar3D,
    Line,
    Pie,
    Area,
    Doughnut,
}

impl ChartType {
    /// Local name of the plot element in the chart part
    pub fn plot_element(&self) -> &'static str {
        match self {
            ChartType::Bar => "barChart",
            ChartType::Bar3D => "bar3DChart",
            ChartType::Line => "lineChart",
            ChartType::Pie => "pieChart",
            ChartType::Area => "areaChart",
            ChartType::Doughnut => "doughnutChart",
        }
    }

    /// Map a plot element local name to a chart type
    pub fn from_plot_element(name: &str) -> Option<Self> {
        match name {
            "barChart" => Some(ChartType::Bar),
            "bar3DChart" => Some(ChartType::Bar3D),
            "lineChart" | "line3DChart" => Some(ChartType::Line),
            "pieChart" | "pie3DChart" | "ofPieChart" => Some(ChartType::Pie),
            "areaChart" | "area3DChart" => Some(ChartType::Area),
            "doughnutChart" => Some(ChartType::Doughnut),
            _ => None,
        }
    }

    /// Whether the plot has category/value axes
    pub fn has_axes(&self) -> bool {
        !matches!(self, ChartType::Pie | ChartType::Doughnut)
    }
}

/// Legend placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegendPosition {
    Top,
    Bottom,
    Left,
    #[default]
    Right,
    /// No legend is drawn
    None,
}

impl LegendPosition {
    /// Parse the `c:legendPos` value
    pub fn from_xml(value: &str) -> Self {
        match value {
            "t" => LegendPosition::Top,
            "b" => LegendPosition::Bottom,
            "l" => LegendPosition::Left,
            // "tr" (top right) has no dedicated variant
            _ => LegendPosition::Right,
        }
    }

    /// The `c:legendPos` value, or `None` when no legend is written
    pub fn to_xml(&self) -> Option<&'static str> {
        match self {
            LegendPosition::Top => Some("t"),
            LegendPosition::Bottom => Some("b"),
            LegendPosition::Left => Some("l"),
            LegendPosition::Right => Some("r"),
            LegendPosition::None => None,
        }
    }
}

/// Orientation of bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarDirection {
    /// Vertical bars
    #[default]
    Column,
    /// Horizontal bars
    Bar,
}

impl BarDirection {
    pub fn from_xml(value: &str) -> Self {
        match value {
            "bar" => BarDirection::Bar,
            _ => BarDirection::Column,
        }
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            BarDirection::Column => "col",
            BarDirection::Bar => "bar",
        }
    }
}

/// How multiple bar series share a category slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarGrouping {
    #[default]
    Clustered,
    Stacked,
    PercentStacked,
    Standard,
}

impl BarGrouping {
    pub fn from_xml(value: &str) -> Self {
        match value {
            "stacked" => BarGrouping::Stacked,
            "percentStacked" => BarGrouping::PercentStacked,
            "standard" => BarGrouping::Standard,
            _ => BarGrouping::Clustered,
        }
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            BarGrouping::Clustered => "clustered",
            BarGrouping::Stacked => "stacked",
            BarGrouping::PercentStacked => "percentStacked",
            BarGrouping::Standard => "standard",
        }
    }
}

/// A single data series in a chart
///
/// `categories` and `values` are index-aligned. A point missing on one side
/// reads as an empty label or a zero value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Name of the series (shown in legend)
    pub name: String,
    /// Category labels
    pub categories: Vec<String>,
    /// Numeric values
    pub values: Vec<f64>,
}

impl ChartSeries {
    /// Create a new data series
    pub fn new(name: impl Into<String>, categories: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            categories,
            values,
        }
    }

    /// Number of points, taking the longer of the two sequences
    pub fn point_count(&self) -> usize {
        self.categories.len().max(self.values.len())
    }

    /// Category label at `index`, empty when absent
    pub fn category(&self, index: usize) -> &str {
        self.categories.get(index).map(String::as_str).unwrap_or("")
    }

    /// Value at `index`, zero when absent
    pub fn value(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    /// Pad both sequences to the same length with their defaults
    pub fn normalize(&mut self) {
        let count = self.point_count();
        self.categories.resize(count, String::new());
        self.values.resize(count, 0.0);
    }
}

/// Format a chart value the way the cached data snapshot stores it:
/// integral values without a fractional part, others in default decimal form.
pub fn format_chart_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_series_defaults_for_missing_points() {
        let series = ChartSeries::new("S", vec!["a".into(), "b".into(), "c".into()], vec![1.0]);
        assert_eq!(series.point_count(), 3);
        assert_eq!(series.category(2), "c");
        assert_eq!(series.value(2), 0.0);
        assert_eq!(series.category(7), "");
    }

    #[test]
    fn test_normalize_pads_both_sides() {
        let mut series = ChartSeries::new("S", vec![], vec![1.0, 2.0]);
        series.normalize();
        assert_eq!(series.categories, vec![String::new(), String::new()]);
        assert_eq!(series.values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_format_chart_number() {
        assert_eq!(format_chart_number(10.0), "10");
        assert_eq!(format_chart_number(-3.0), "-3");
        assert_eq!(format_chart_number(2.5), "2.5");
        assert_eq!(format_chart_number(0.0), "0");
    }

    #[test]
    fn test_plot_element_mapping() {
        for ty in [
            ChartType::Bar,
            ChartType::Bar3D,
            ChartType::Line,
            ChartType::Pie,
            ChartType::Area,
            ChartType::Doughnut,
        ] {
            assert_eq!(ChartType::from_plot_element(ty.plot_element()), Some(ty));
        }
        assert_eq!(ChartType::from_plot_element("line3DChart"), Some(ChartType::Line));
        assert_eq!(ChartType::from_plot_element("radarChart"), None);
    }

    #[test]
    fn test_legend_position_xml() {
        assert_eq!(LegendPosition::from_xml("b"), LegendPosition::Bottom);
        assert_eq!(LegendPosition::from_xml("tr"), LegendPosition::Right);
        assert_eq!(LegendPosition::None.to_xml(), None);
    }

    proptest! {
        #[test]
        fn whole_numbers_have_no_fraction(n in -1_000_000_000i64..1_000_000_000i64) {
            prop_assert_eq!(format_chart_number(n as f64), n.to_string());
        }

        #[test]
        fn formatted_values_parse_back(value in -1.0e9f64..1.0e9f64) {
            let text = format_chart_number(value);
            prop_assert_eq!(text.parse::<f64>().unwrap(), value);
        }
    }
}
