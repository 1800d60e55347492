//! Write-then-read tests over the whole package path

use chrono::{TimeZone, Utc};
use codec::docx::{codes, export_docx_bytes, import_docx_bytes, ImportResult};
use codec::{ReadSettings, WriteSettings};
use doc_model::charts::{Chart, ChartSeries, ChartType};
use doc_model::{
    Alignment, Border, Borders, ChartFrame, Color, Document, DocumentProperties, Element,
    FieldKind, HeaderFooter, Highlight, Hyperlink, ImageRef, Indent, LineSpacing, ListInfo,
    ListKind, Paragraph, Run, RunContent, RunFormat, Shape, ShapeKind, Spacing, Table, TableCell,
    UnderlineStyle,
};

fn round_trip(document: &Document) -> ImportResult {
    let (bytes, _) = export_docx_bytes(document, &WriteSettings::default(), None).unwrap();
    import_docx_bytes(&bytes, &ReadSettings::default()).unwrap()
}

fn formatted_paragraph() -> Paragraph {
    let strong = RunFormat {
        bold: Some(true),
        font: Some("Arial".into()),
        font_size: Some(14.0),
        color: Some(Color::rgb(0xC0, 0x00, 0x00)),
        ..Default::default()
    };
    let marked = RunFormat {
        italic: Some(true),
        underline: Some(UnderlineStyle::Double),
        highlight: Some(Highlight::Yellow),
        strikethrough: Some(false),
        ..Default::default()
    };
    Paragraph::new()
        .with_run(Run::text("Bold ").with_format(strong))
        .with_run(Run::text("marked").with_format(marked))
        .with_run(Run::text(" a\tb\nc"))
}

#[test]
fn test_paragraph_and_run_formatting() {
    let mut spaced = Paragraph::with_text("spaced").with_alignment(Alignment::Right);
    spaced.spacing = Spacing {
        before: Some(6.0),
        after: Some(12.0),
        line: Some(LineSpacing::exact(18.0)),
    };
    spaced.indent = Indent {
        left: Some(36.0),
        right: Some(18.0),
        first_line: Some(-18.0),
    };
    spaced.page_break_before = true;
    spaced.background = Some(Color::rgb(0xEE, 0xEE, 0xEE));
    spaced.borders = Borders::all(Border::single(1.0, Color::BLACK));

    let document = Document::new()
        .with(Paragraph::heading(2, "Introduction").with_alignment(Alignment::Center))
        .with(formatted_paragraph())
        .with(spaced.clone());

    let result = round_trip(&document);
    let read: Vec<&Paragraph> = result.document.paragraphs().collect();
    assert_eq!(read.len(), 3);

    assert_eq!(read[0].heading_level, Some(2));
    assert_eq!(read[0].alignment, Some(Alignment::Center));
    assert_eq!(read[0].text(), "Introduction");

    let expected = formatted_paragraph();
    assert_eq!(read[1].runs.len(), 3);
    for (got, want) in read[1].runs.iter().zip(&expected.runs) {
        assert_eq!(got.content, want.content);
        assert_eq!(got.format, want.format);
    }

    assert_eq!(read[2].spacing, spaced.spacing);
    assert_eq!(read[2].indent, spaced.indent);
    assert!(read[2].page_break_before);
    assert_eq!(read[2].background, spaced.background);
    assert_eq!(read[2].borders, spaced.borders);
    assert_eq!(read[2].alignment, Some(Alignment::Right));
}

#[test]
fn test_lists_hyperlinks_and_fields() {
    let document = Document::new()
        .with(Paragraph::with_text("first").with_list(ListInfo::bullet(0)))
        .with(Paragraph::with_text("second").with_list(ListInfo::numbered(1)))
        .with(
            Paragraph::new()
                .with_run(Run::text("site").with_hyperlink(Hyperlink::new("https://example.com/a?b=1&c=2").with_tooltip("Example")))
                .with_run(Run::text(" then "))
                .with_run(Run::text("intro").with_hyperlink(Hyperlink::new("#intro")))
                .with_run(Run::text(" page ").with_format(RunFormat::bold()))
                .with_run(Run::field(FieldKind::PageNumber).with_format(RunFormat::bold())),
        );

    let result = round_trip(&document);
    let read: Vec<&Paragraph> = result.document.paragraphs().collect();

    assert_eq!(read[0].list, Some(ListInfo::bullet(0)));
    assert_eq!(read[1].list.map(|l| (l.kind, l.level)), Some((ListKind::Numbered, 1)));

    let runs = &read[2].runs;
    assert_eq!(runs.len(), 5);
    let link = runs[0].hyperlink.as_ref().unwrap();
    assert_eq!(link.url, "https://example.com/a?b=1&c=2");
    assert_eq!(link.tooltip.as_deref(), Some("Example"));
    assert!(runs[1].hyperlink.is_none());
    assert_eq!(runs[2].hyperlink.as_ref().and_then(|h| h.anchor()), Some("intro"));
    assert_eq!(runs[4].content, RunContent::Field(FieldKind::PageNumber));
    assert_eq!(runs[4].format.bold, Some(true));
}

#[test]
fn test_images_tables_and_charts() {
    let mut image = ImageRef::new(vec![0x89, b'P', b'N', b'G', 1, 2, 3], "image/png", 144.0, 72.0);
    image.description = Some("Logo".into());

    let mut table = Table::new(3, 2).with_style("Plain");
    table.width = Some(360.0);
    table.caption = Some("Totals".into());
    table.rows[0].is_header = true;
    table.rows[0].cells[0] = TableCell::with_text("tall").with_background(Color::rgb(0x44, 0x72, 0xC4));
    table.rows[0].cells[0].row_span = 2;
    table.rows[0].cells[1] = TableCell::with_text("b1");
    table.rows[1].cells.remove(0);
    table.rows[1].cells[0] = TableCell::with_text("b2");
    table.rows[2].cells[0] = TableCell::with_text("wide");
    table.rows[2].cells[0].column_span = 2;
    table.rows[2].cells.truncate(1);

    let chart = Chart::new(ChartType::Bar)
        .with_title("Sales")
        .with_series(ChartSeries::new("North", vec!["Q1".into(), "Q2".into()], vec![1.5, 3.0]))
        .with_series(ChartSeries::new("South", vec!["Q1".into(), "Q2".into()], vec![2.0, 4.25]));

    let document = Document::new()
        .with(Paragraph::new().with_run(Run::image(image.clone())))
        .with(table)
        .with(ChartFrame::new(chart).with_size(360.0, 216.0));

    let result = round_trip(&document);
    let elements = &result.document.elements;
    assert_eq!(elements.len(), 3);

    let RunContent::Image(read_image) = &elements[0].as_paragraph().unwrap().runs[0].content else {
        panic!("expected an image run");
    };
    assert_eq!(read_image.data, image.data);
    assert_eq!(read_image.content_type, "image/png");
    assert_eq!((read_image.width, read_image.height), (144.0, 72.0));
    assert_eq!(read_image.description.as_deref(), Some("Logo"));

    let read_table = elements[1].as_table().unwrap();
    assert_eq!(read_table.style_id.as_deref(), Some("Plain"));
    assert_eq!(read_table.width, Some(360.0));
    assert_eq!(read_table.caption.as_deref(), Some("Totals"));
    assert!(read_table.rows[0].is_header);
    let tall = &read_table.rows[0].cells[0];
    assert_eq!(tall.row_span, 2);
    assert_eq!(tall.background, Some(Color::rgb(0x44, 0x72, 0xC4)));
    assert_eq!(read_table.rows[1].cells.len(), 1);
    assert_eq!(read_table.rows[1].cells[0].text(), "b2");
    assert_eq!(read_table.rows[2].cells[0].column_span, 2);

    let frame = elements[2].as_chart().unwrap();
    assert_eq!((frame.width, frame.height), (360.0, 216.0));
    let read_chart = frame.chart().unwrap();
    assert_eq!(read_chart.chart_type, ChartType::Bar);
    assert_eq!(read_chart.title.as_deref(), Some("Sales"));
    assert_eq!(read_chart.series.len(), 2);
    assert_eq!(read_chart.series[1].name, "South");
    assert_eq!(read_chart.series[1].values, vec![2.0, 4.25]);
    assert!(result.fidelity.is_empty());
}

#[test]
fn test_header_footer_and_properties() {
    let header = HeaderFooter::new(vec![Paragraph::new()
        .with_run(Run::text("Page "))
        .with_run(Run::field(FieldKind::PageNumber))
        .with_run(Run::text(" of "))
        .with_run(Run::field(FieldKind::TotalPages))]);
    let properties = DocumentProperties {
        title: Some("Annual report".into()),
        author: Some("Finance".into()),
        language: Some("en-US".into()),
        created: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        modified: None,
    };
    let document = Document {
        elements: vec![Paragraph::with_text("Body").into()],
        header: Some(header),
        footer: Some(HeaderFooter::with_text("Confidential")),
        properties: properties.clone(),
    };

    let result = round_trip(&document);
    let header = result.document.header.as_ref().unwrap();
    let runs = &header.paragraphs[0].runs;
    assert_eq!(runs[1].content, RunContent::Field(FieldKind::PageNumber));
    assert_eq!(runs[3].content, RunContent::Field(FieldKind::TotalPages));
    assert_eq!(result.document.footer.as_ref().unwrap().text(), "Confidential");
    assert_eq!(result.document.properties, properties);
}

#[test]
fn test_shapes_are_reported_not_saved() {
    let document = Document {
        elements: vec![
            Paragraph::with_text("before").into(),
            Element::from(Shape::new(ShapeKind::Rectangle, 50.0, 20.0)),
            Paragraph::with_text("after").into(),
        ],
        ..Default::default()
    };

    let (bytes, fidelity) = export_docx_bytes(&document, &WriteSettings::default(), None).unwrap();
    assert_eq!(fidelity.count(codes::SHAPE_NOT_PERSISTED), 1);

    let result = import_docx_bytes(&bytes, &ReadSettings::default()).unwrap();
    assert_eq!(result.document.shapes().count(), 0);
    assert_eq!(result.document.plain_text(), "before\nafter");
}

#[test]
fn test_second_save_is_stable() {
    let document = Document::new()
        .with(Paragraph::heading(1, "Title"))
        .with(formatted_paragraph())
        .with(Table::new(2, 2));

    let first = round_trip(&document).document;
    let second = round_trip(&first).document;
    assert_eq!(first, second);
}
