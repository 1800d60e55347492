//! DrawingML writer for chart XML
//!
//! Serializes a [`Chart`] into a standalone chart part. Series data is
//! written as a cached snapshot with sheet-style formulas so that Word
//! renders the chart without an embedded workbook.

use crate::error::{ChartError, ChartResult};
use crate::model::*;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

const NS_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CATEGORY_AXIS_ID: &str = "111111111";
const VALUE_AXIS_ID: &str = "222222222";

/// Writer for DrawingML chart XML
#[derive(Debug, Default)]
pub struct DrawingMLWriter;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

impl DrawingMLWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self
    }

    /// Write a chart to an XML string
    pub fn write(&self, chart: &Chart) -> ChartResult<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(|e| ChartError::Serialization(e.to_string()))?;

        let mut chart_space = BytesStart::new("c:chartSpace");
        chart_space.push_attribute(("xmlns:c", NS_CHART));
        chart_space.push_attribute(("xmlns:a", NS_DRAWING));
        chart_space.push_attribute(("xmlns:r", NS_RELATIONSHIPS));
        self.start(&mut writer, chart_space)?;

        self.write_empty_element(&mut writer, "c:date1904", &[("val", "0")])?;
        self.write_empty_element(&mut writer, "c:lang", &[("val", "en-US")])?;
        self.write_empty_element(&mut writer, "c:roundedCorners", &[("val", "0")])?;

        self.write_chart(&mut writer, chart)?;

        self.end(&mut writer, "c:chartSpace")?;

        let result = writer.into_inner().into_inner();
        String::from_utf8(result).map_err(|e| ChartError::Serialization(e.to_string()))
    }

    fn write_chart(&self, writer: &mut XmlWriter, chart: &Chart) -> ChartResult<()> {
        self.start(writer, BytesStart::new("c:chart"))?;

        match chart.title.as_deref() {
            Some(title) => {
                self.write_title(writer, title)?;
                self.write_empty_element(writer, "c:autoTitleDeleted", &[("val", "0")])?;
            }
            None => self.write_empty_element(writer, "c:autoTitleDeleted", &[("val", "1")])?,
        }

        if chart.chart_type == ChartType::Bar3D {
            self.start(writer, BytesStart::new("c:view3D"))?;
            self.write_empty_element(writer, "c:rotX", &[("val", "15")])?;
            self.write_empty_element(writer, "c:rotY", &[("val", "20")])?;
            self.write_empty_element(writer, "c:rAngAx", &[("val", "1")])?;
            self.end(writer, "c:view3D")?;
        }

        self.write_plot_area(writer, chart)?;

        if let Some(position) = chart.legend.to_xml() {
            self.start(writer, BytesStart::new("c:legend"))?;
            self.write_empty_element(writer, "c:legendPos", &[("val", position)])?;
            self.write_empty_element(writer, "c:overlay", &[("val", "0")])?;
            self.end(writer, "c:legend")?;
        }

        self.write_empty_element(writer, "c:plotVisOnly", &[("val", "1")])?;
        self.write_empty_element(writer, "c:dispBlanksAs", &[("val", "gap")])?;

        self.end(writer, "c:chart")
    }

    fn write_title(&self, writer: &mut XmlWriter, title: &str) -> ChartResult<()> {
        self.start(writer, BytesStart::new("c:title"))?;
        self.start(writer, BytesStart::new("c:tx"))?;
        self.start(writer, BytesStart::new("c:rich"))?;
        self.write_empty_element(writer, "a:bodyPr", &[])?;
        self.write_empty_element(writer, "a:lstStyle", &[])?;
        self.start(writer, BytesStart::new("a:p"))?;
        self.start(writer, BytesStart::new("a:r"))?;
        self.write_text_element(writer, "a:t", title)?;
        self.end(writer, "a:r")?;
        self.end(writer, "a:p")?;
        self.end(writer, "c:rich")?;
        self.end(writer, "c:tx")?;
        self.write_empty_element(writer, "c:overlay", &[("val", "0")])?;
        self.end(writer, "c:title")
    }

    fn write_plot_area(&self, writer: &mut XmlWriter, chart: &Chart) -> ChartResult<()> {
        self.start(writer, BytesStart::new("c:plotArea"))?;
        self.write_empty_element(writer, "c:layout", &[])?;

        let plot = format!("c:{}", chart.chart_type.plot_element());
        self.start(writer, BytesStart::new(plot.as_str()))?;

        match chart.chart_type {
            ChartType::Bar | ChartType::Bar3D => {
                self.write_empty_element(writer, "c:barDir", &[("val", chart.bar_direction.to_xml())])?;
                self.write_empty_element(writer, "c:grouping", &[("val", chart.bar_grouping.to_xml())])?;
                self.write_empty_element(writer, "c:varyColors", &[("val", "0")])?;
            }
            ChartType::Line | ChartType::Area => {
                self.write_empty_element(writer, "c:grouping", &[("val", "standard")])?;
                self.write_empty_element(writer, "c:varyColors", &[("val", "0")])?;
            }
            ChartType::Pie | ChartType::Doughnut => {
                self.write_empty_element(writer, "c:varyColors", &[("val", "1")])?;
            }
        }

        for (index, series) in chart.series.iter().enumerate() {
            self.write_series(writer, chart.chart_type, index, series)?;
        }

        match chart.chart_type {
            ChartType::Bar | ChartType::Bar3D => {
                self.write_empty_element(writer, "c:gapWidth", &[("val", "150")])?;
                if matches!(chart.bar_grouping, BarGrouping::Stacked | BarGrouping::PercentStacked)
                    && chart.chart_type == ChartType::Bar
                {
                    self.write_empty_element(writer, "c:overlap", &[("val", "100")])?;
                }
                if chart.chart_type == ChartType::Bar3D {
                    self.write_empty_element(writer, "c:shape", &[("val", "box")])?;
                }
            }
            ChartType::Line => {
                self.write_empty_element(writer, "c:marker", &[("val", "1")])?;
            }
            ChartType::Pie => {
                self.write_empty_element(writer, "c:firstSliceAng", &[("val", "0")])?;
            }
            ChartType::Doughnut => {
                self.write_empty_element(writer, "c:firstSliceAng", &[("val", "0")])?;
                self.write_empty_element(writer, "c:holeSize", &[("val", "50")])?;
            }
            ChartType::Area => {}
        }

        if chart.chart_type.has_axes() {
            self.write_empty_element(writer, "c:axId", &[("val", CATEGORY_AXIS_ID)])?;
            self.write_empty_element(writer, "c:axId", &[("val", VALUE_AXIS_ID)])?;
        }

        self.end(writer, plot.as_str())?;

        if chart.chart_type.has_axes() {
            self.write_axes(writer, chart)?;
        }

        self.end(writer, "c:plotArea")
    }

    fn write_series(
        &self,
        writer: &mut XmlWriter,
        chart_type: ChartType,
        index: usize,
        series: &ChartSeries,
    ) -> ChartResult<()> {
        let idx = index.to_string();
        let count = series.point_count();
        let column = column_letter(index + 1);

        self.start(writer, BytesStart::new("c:ser"))?;
        self.write_empty_element(writer, "c:idx", &[("val", &idx)])?;
        self.write_empty_element(writer, "c:order", &[("val", &idx)])?;

        // Series name
        self.start(writer, BytesStart::new("c:tx"))?;
        self.start(writer, BytesStart::new("c:strRef"))?;
        self.write_text_element(writer, "c:f", &format!("Sheet1!${}$1", column))?;
        self.start(writer, BytesStart::new("c:strCache"))?;
        self.write_empty_element(writer, "c:ptCount", &[("val", "1")])?;
        self.write_point(writer, 0, &series.name)?;
        self.end(writer, "c:strCache")?;
        self.end(writer, "c:strRef")?;
        self.end(writer, "c:tx")?;

        if chart_type == ChartType::Line {
            self.start(writer, BytesStart::new("c:marker"))?;
            self.write_empty_element(writer, "c:symbol", &[("val", "none")])?;
            self.end(writer, "c:marker")?;
        }

        // Categories
        self.start(writer, BytesStart::new("c:cat"))?;
        self.start(writer, BytesStart::new("c:strRef"))?;
        self.write_text_element(writer, "c:f", &format!("Sheet1!$A$2:$A${}", count + 1))?;
        self.start(writer, BytesStart::new("c:strCache"))?;
        self.write_empty_element(writer, "c:ptCount", &[("val", &count.to_string())])?;
        for i in 0..count {
            self.write_point(writer, i, series.category(i))?;
        }
        self.end(writer, "c:strCache")?;
        self.end(writer, "c:strRef")?;
        self.end(writer, "c:cat")?;

        // Values
        self.start(writer, BytesStart::new("c:val"))?;
        self.start(writer, BytesStart::new("c:numRef"))?;
        self.write_text_element(
            writer,
            "c:f",
            &format!("Sheet1!${}$2:${}${}", column, column, count + 1),
        )?;
        self.start(writer, BytesStart::new("c:numCache"))?;
        self.write_text_element(writer, "c:formatCode", "General")?;
        self.write_empty_element(writer, "c:ptCount", &[("val", &count.to_string())])?;
        for i in 0..count {
            self.write_point(writer, i, &format_chart_number(series.value(i)))?;
        }
        self.end(writer, "c:numCache")?;
        self.end(writer, "c:numRef")?;
        self.end(writer, "c:val")?;

        if chart_type == ChartType::Line {
            self.write_empty_element(writer, "c:smooth", &[("val", "0")])?;
        }

        self.end(writer, "c:ser")
    }

    fn write_axes(&self, writer: &mut XmlWriter, chart: &Chart) -> ChartResult<()> {
        let horizontal = chart.is_bar() && chart.bar_direction == BarDirection::Bar;
        let (cat_pos, val_pos) = if horizontal { ("l", "b") } else { ("b", "l") };

        self.start(writer, BytesStart::new("c:catAx"))?;
        self.write_empty_element(writer, "c:axId", &[("val", CATEGORY_AXIS_ID)])?;
        self.start(writer, BytesStart::new("c:scaling"))?;
        self.write_empty_element(writer, "c:orientation", &[("val", "minMax")])?;
        self.end(writer, "c:scaling")?;
        self.write_empty_element(writer, "c:delete", &[("val", "0")])?;
        self.write_empty_element(writer, "c:axPos", &[("val", cat_pos)])?;
        self.write_empty_element(writer, "c:crossAx", &[("val", VALUE_AXIS_ID)])?;
        self.write_empty_element(writer, "c:crosses", &[("val", "autoZero")])?;
        self.end(writer, "c:catAx")?;

        self.start(writer, BytesStart::new("c:valAx"))?;
        self.write_empty_element(writer, "c:axId", &[("val", VALUE_AXIS_ID)])?;
        self.start(writer, BytesStart::new("c:scaling"))?;
        self.write_empty_element(writer, "c:orientation", &[("val", "minMax")])?;
        self.end(writer, "c:scaling")?;
        self.write_empty_element(writer, "c:delete", &[("val", "0")])?;
        self.write_empty_element(writer, "c:axPos", &[("val", val_pos)])?;
        self.write_empty_element(writer, "c:majorGridlines", &[])?;
        self.write_empty_element(
            writer,
            "c:numFmt",
            &[("formatCode", "General"), ("sourceLinked", "1")],
        )?;
        self.write_empty_element(writer, "c:crossAx", &[("val", CATEGORY_AXIS_ID)])?;
        self.write_empty_element(writer, "c:crosses", &[("val", "autoZero")])?;
        self.end(writer, "c:valAx")
    }

    fn write_point(&self, writer: &mut XmlWriter, index: usize, value: &str) -> ChartResult<()> {
        let mut pt = BytesStart::new("c:pt");
        pt.push_attribute(("idx", index.to_string().as_str()));
        self.start(writer, pt)?;
        self.write_text_element(writer, "c:v", value)?;
        self.end(writer, "c:pt")
    }

    fn start(&self, writer: &mut XmlWriter, element: BytesStart) -> ChartResult<()> {
        writer
            .write_event(Event::Start(element))
            .map_err(|e| ChartError::Serialization(e.to_string()))
    }

    fn end(&self, writer: &mut XmlWriter, name: &str) -> ChartResult<()> {
        writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| ChartError::Serialization(e.to_string()))
    }

    fn write_text_element(&self, writer: &mut XmlWriter, name: &str, text: &str) -> ChartResult<()> {
        self.start(writer, BytesStart::new(name))?;
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| ChartError::Serialization(e.to_string()))?;
        self.end(writer, name)
    }

    fn write_empty_element(
        &self,
        writer: &mut XmlWriter,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> ChartResult<()> {
        let mut element = BytesStart::new(name);
        for attr in attributes {
            element.push_attribute(*attr);
        }
        writer
            .write_event(Event::Empty(element))
            .map_err(|e| ChartError::Serialization(e.to_string()))
    }
}

/// Spreadsheet column letter for a zero-based column index (0 = A)
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DrawingMLParser;

    fn sample_chart() -> Chart {
        Chart::new(ChartType::Bar)
            .with_title("Quarterly")
            .with_legend(LegendPosition::Top)
            .with_series(ChartSeries::new(
                "Q1",
                vec!["Jan".into(), "Feb".into()],
                vec![10.0, 20.25],
            ))
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_write_uses_cached_number_format() {
        let xml = DrawingMLWriter::new().write(&sample_chart()).unwrap();
        assert!(xml.contains("<c:v>10</c:v>"));
        assert!(xml.contains("<c:v>20.25</c:v>"));
        assert!(xml.contains(r#"<c:legendPos val="t"/>"#));
        assert!(xml.contains("<c:barChart>"));
    }

    #[test]
    fn test_pie_chart_has_no_axes() {
        let mut chart = sample_chart();
        chart.chart_type = ChartType::Pie;
        let xml = DrawingMLWriter::new().write(&chart).unwrap();
        assert!(!xml.contains("c:catAx"));
        assert!(xml.contains("c:pieChart"));
    }

    #[test]
    fn test_written_chart_parses_back() {
        let chart = sample_chart();
        let xml = DrawingMLWriter::new().write(&chart).unwrap();
        let parsed = DrawingMLParser::new().parse(&xml).unwrap();
        assert_eq!(parsed, chart);
    }

    #[test]
    fn test_doughnut_without_legend_or_title() {
        let chart = Chart::new(ChartType::Doughnut)
            .with_legend(LegendPosition::None)
            .with_series(ChartSeries::new("S", vec!["a".into()], vec![1.5]));
        let xml = DrawingMLWriter::new().write(&chart).unwrap();
        assert!(xml.contains("c:holeSize"));
        let parsed = DrawingMLParser::new().parse(&xml).unwrap();
        assert_eq!(parsed, chart);
    }
}
