//! DrawingML parser for chart XML
//!
//! Parses `chart*.xml` parts from DOCX packages. Only the first plot's
//! type is recorded, but series from every plot in the plot area are read.
//! Series names, categories and values come from the cached snapshot
//! (`strCache`/`numCache`/literal `v` elements); the embedded workbook is
//! never opened.

use crate::error::{ChartError, ChartResult};
use crate::model::*;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parser for DrawingML chart XML
#[derive(Debug, Default)]
pub struct DrawingMLParser;

/// Which part of a `c:ser` element is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesSection {
    Name,
    Categories,
    Values,
}

#[derive(Debug, Default)]
struct ParseState {
    chart: Chart,
    plot_found: bool,
    legend: Option<LegendPosition>,
    title: Option<String>,
    series: Option<ChartSeries>,
    section: Option<SeriesSection>,
    point: Option<usize>,
}

impl DrawingMLParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse chart XML from a string
    pub fn parse(&self, xml: &str) -> ChartResult<Chart> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut state = ParseState::default();
        let mut path: Vec<String> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let name = local_name(e);
                    self.handle_open(e, &name, &path, &mut state)?;
                    path.push(name);
                }
                Ok(Event::Empty(ref e)) => {
                    let name = local_name(e);
                    self.handle_open(e, &name, &path, &mut state)?;
                    self.handle_close(&name, &path, &mut state);
                }
                Ok(Event::End(_)) => {
                    if let Some(name) = path.pop() {
                        self.handle_close(&name, &path, &mut state);
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|e| ChartError::XmlParse(e.to_string()))?;
                    self.handle_text(&text, &path, &mut state);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ChartError::XmlParse(format!(
                        "{} at position {}",
                        e,
                        reader.buffer_position()
                    )))
                }
                _ => {}
            }
        }

        if !state.plot_found {
            return Err(ChartError::InvalidData("no supported plot element".into()));
        }

        let mut chart = state.chart;
        chart.legend = state.legend.unwrap_or(LegendPosition::None);
        tracing::debug!(
            chart_type = ?chart.chart_type,
            series = chart.series.len(),
            "parsed chart part"
        );
        Ok(chart)
    }

    fn handle_open(
        &self,
        e: &BytesStart,
        name: &str,
        path: &[String],
        state: &mut ParseState,
    ) -> ChartResult<()> {
        let parent = path.last().map(String::as_str);

        if let Some(chart_type) = ChartType::from_plot_element(name) {
            if !state.plot_found {
                state.chart.chart_type = chart_type;
                state.plot_found = true;
            }
            return Ok(());
        }

        match name {
            "barDir" => {
                if let Some(val) = attribute(e, "val")? {
                    state.chart.bar_direction = BarDirection::from_xml(&val);
                }
            }
            "grouping" if matches!(parent, Some("barChart" | "bar3DChart")) => {
                if let Some(val) = attribute(e, "val")? {
                    state.chart.bar_grouping = BarGrouping::from_xml(&val);
                }
            }
            "legend" => {
                state.legend.get_or_insert(LegendPosition::Right);
            }
            "legendPos" => {
                let val = attribute(e, "val")?.unwrap_or_else(|| "r".to_string());
                state.legend = Some(LegendPosition::from_xml(&val));
            }
            "title" if parent == Some("chart") => {
                state.title = Some(String::new());
            }
            "ser" => {
                state.series = Some(ChartSeries::default());
            }
            "tx" if parent == Some("ser") => state.section = Some(SeriesSection::Name),
            "cat" | "xVal" if parent == Some("ser") => {
                state.section = Some(SeriesSection::Categories)
            }
            "val" | "yVal" if parent == Some("ser") => state.section = Some(SeriesSection::Values),
            "ptCount" => {
                let count = attribute(e, "val")?
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if let Some(series) = state.series.as_mut() {
                    match state.section {
                        Some(SeriesSection::Categories) if series.categories.len() < count => {
                            series.categories.resize(count, String::new());
                        }
                        Some(SeriesSection::Values) if series.values.len() < count => {
                            series.values.resize(count, 0.0);
                        }
                        _ => {}
                    }
                }
            }
            "pt" => {
                state.point = attribute(e, "idx")?.and_then(|v| v.parse::<usize>().ok());
            }
            _ => {}
        }

        Ok(())
    }

    fn handle_close(&self, name: &str, path: &[String], state: &mut ParseState) {
        let parent = path.last().map(String::as_str);

        match name {
            "ser" => {
                if let Some(series) = state.series.take() {
                    state.chart.series.push(series);
                }
                state.section = None;
            }
            "tx" | "cat" | "xVal" | "val" | "yVal" if parent == Some("ser") => {
                state.section = None;
            }
            "pt" => state.point = None,
            "title" if parent == Some("chart") => {
                if let Some(text) = state.title.take() {
                    if !text.is_empty() {
                        state.chart.title = Some(text);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_text(&self, text: &str, path: &[String], state: &mut ParseState) {
        match path.last().map(String::as_str) {
            Some("v") => {
                let (Some(series), Some(section)) = (state.series.as_mut(), state.section) else {
                    return;
                };
                match section {
                    SeriesSection::Name => series.name.push_str(text),
                    SeriesSection::Categories => {
                        let index = state.point.unwrap_or(series.categories.len());
                        set_at(&mut series.categories, index, text.to_string());
                    }
                    SeriesSection::Values => {
                        let index = state.point.unwrap_or(series.values.len());
                        let value = text.trim().parse::<f64>().unwrap_or(0.0);
                        set_at(&mut series.values, index, value);
                    }
                }
            }
            Some("t") => {
                if path.iter().any(|p| p == "title") {
                    if let Some(title) = state.title.as_mut() {
                        title.push_str(text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn set_at<T: Default + Clone>(items: &mut Vec<T>, index: usize, value: T) {
    if items.len() <= index {
        items.resize(index + 1, T::default());
    }
    items[index] = value;
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart, name: &str) -> ChartResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| ChartError::XmlParse(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAR_CHART: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <c:chart>
    <c:title><c:tx><c:rich><a:p><a:r><a:t>Sales</a:t></a:r></a:p></c:rich></c:tx></c:title>
    <c:plotArea>
      <c:barChart>
        <c:barDir val="bar"/>
        <c:grouping val="stacked"/>
        <c:ser>
          <c:idx val="0"/>
          <c:tx><c:strRef><c:f>Sheet1!$B$1</c:f><c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>Q1</c:v></c:pt></c:strCache></c:strRef></c:tx>
          <c:cat><c:strRef><c:strCache><c:ptCount val="3"/><c:pt idx="0"><c:v>Jan</c:v></c:pt><c:pt idx="2"><c:v>Mar</c:v></c:pt></c:strCache></c:strRef></c:cat>
          <c:val><c:numRef><c:numCache><c:formatCode>General</c:formatCode><c:ptCount val="3"/><c:pt idx="0"><c:v>10</c:v></c:pt><c:pt idx="1"><c:v>20.5</c:v></c:pt></c:numCache></c:numRef></c:val>
        </c:ser>
      </c:barChart>
      <c:catAx><c:title><c:tx><c:rich><a:p><a:r><a:t>Month</a:t></a:r></a:p></c:rich></c:tx></c:title></c:catAx>
    </c:plotArea>
    <c:legend><c:legendPos val="b"/></c:legend>
  </c:chart>
</c:chartSpace>"#;

    #[test]
    fn test_parse_bar_chart() {
        let chart = DrawingMLParser::new().parse(BAR_CHART).unwrap();
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.bar_direction, BarDirection::Bar);
        assert_eq!(chart.bar_grouping, BarGrouping::Stacked);
        assert_eq!(chart.title.as_deref(), Some("Sales"));
        assert_eq!(chart.legend, LegendPosition::Bottom);

        let series = &chart.series[0];
        assert_eq!(series.name, "Q1");
        assert_eq!(series.categories, vec!["Jan", "", "Mar"]);
        assert_eq!(series.values, vec![10.0, 20.5, 0.0]);
    }

    #[test]
    fn test_missing_legend_means_none() {
        let xml = r#"<c:chartSpace xmlns:c="c"><c:chart><c:plotArea><c:pieChart><c:ser><c:tx><c:v>Share</c:v></c:tx></c:ser></c:pieChart></c:plotArea></c:chart></c:chartSpace>"#;
        let chart = DrawingMLParser::new().parse(xml).unwrap();
        assert_eq!(chart.chart_type, ChartType::Pie);
        assert_eq!(chart.legend, LegendPosition::None);
        assert_eq!(chart.series[0].name, "Share");
        assert!(chart.title.is_none());
    }

    #[test]
    fn test_unsupported_plot_is_rejected() {
        let xml = r#"<c:chartSpace xmlns:c="c"><c:chart><c:plotArea><c:scatterChart/></c:plotArea></c:chart></c:chartSpace>"#;
        assert!(matches!(
            DrawingMLParser::new().parse(xml),
            Err(ChartError::InvalidData(_))
        ));
    }

    #[test]
    fn test_malformed_xml() {
        let xml = r#"<c:chartSpace><c:chart></c:plotArea></c:chartSpace>"#;
        assert!(matches!(
            DrawingMLParser::new().parse(xml),
            Err(ChartError::XmlParse(_))
        ));
    }
}
