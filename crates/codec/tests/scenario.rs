//! End-to-end scenario: heading, styled table and bar chart through a file

use codec::docx::{
    export_docx_with, import_docx, Condition, ConditionRegion, TableStyleCatalog,
    TableStyleDefinition,
};
use codec::WriteSettings;
use doc_model::charts::{Chart, ChartSeries, ChartType};
use doc_model::{ChartFrame, Color, Document, Paragraph, Table, TableCell};
use tempfile::TempDir;

const HEADER_BLUE: Color = Color::rgb(0x44, 0x72, 0xC4);
const BAND_BLUE: Color = Color::rgb(0xD6, 0xE4, 0xF0);

fn report_style() -> TableStyleCatalog {
    let mut catalog = TableStyleCatalog::new();
    catalog.insert(
        TableStyleDefinition::new("ReportTable")
            .with_condition(
                ConditionRegion::FirstRow,
                Condition {
                    cell_shading: Some(HEADER_BLUE),
                    bold: Some(true),
                    ..Default::default()
                },
            )
            .with_condition(
                ConditionRegion::Band1Horz,
                Condition {
                    cell_shading: Some(BAND_BLUE),
                    ..Default::default()
                },
            ),
    );
    catalog
}

fn report() -> Document {
    let mut table = Table::new(2, 2).with_style("ReportTable");
    table.rows[0].cells[0] = TableCell::with_text("Month");
    table.rows[0].cells[1] = TableCell::with_text("Sales");
    table.rows[1].cells[0] = TableCell::with_text("Jan");
    table.rows[1].cells[1] = TableCell::with_text("10");

    let chart = Chart::new(ChartType::Bar).with_series(ChartSeries::new(
        "Q1",
        vec!["Jan".into(), "Feb".into()],
        vec![10.0, 20.0],
    ));

    Document::new()
        .with(Paragraph::heading(1, "Report"))
        .with(table)
        .with(ChartFrame::new(chart))
}

#[test]
fn test_report_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.docx");
    let catalog = report_style();

    let fidelity = export_docx_with(&report(), &path, &WriteSettings::default(), Some(&catalog)).unwrap();
    assert!(fidelity.is_empty());

    let result = import_docx(&path).unwrap();
    let document = &result.document;
    assert_eq!(document.elements.len(), 3);

    let heading = document.elements[0].as_paragraph().unwrap();
    assert_eq!(heading.heading_level, Some(1));
    assert_eq!(heading.text(), "Report");

    let table = document.elements[1].as_table().unwrap();
    assert_eq!(table.cell(0, 0).unwrap().background, Some(HEADER_BLUE));
    assert_eq!(table.cell(1, 0).unwrap().background, Some(BAND_BLUE));
    // the style fills bold only where the run leaves it unset
    let header_run = &table.cell(0, 1).unwrap().paragraphs[0].runs[0];
    assert_eq!(header_run.format.bold, Some(true));

    let chart = document.elements[2].as_chart().unwrap().chart().unwrap();
    assert_eq!(chart.series.len(), 1);
    let series = &chart.series[0];
    assert_eq!(series.name, "Q1");
    assert_eq!(series.categories, vec!["Jan".to_string(), "Feb".to_string()]);
    assert_eq!(series.values, vec![10.0, 20.0]);
}

#[test]
fn test_explicit_background_wins_over_style() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("explicit.docx");
    let catalog = report_style();

    let mut document = report();
    if let Some(table) = document.tables_mut().next() {
        table.rows[0].cells[0].background = Some(Color::rgb(0xFF, 0x00, 0x00));
    }
    export_docx_with(&document, &path, &WriteSettings::default(), Some(&catalog)).unwrap();

    let result = import_docx(&path).unwrap();
    let table = result.document.tables().next().unwrap();
    assert_eq!(table.cell(0, 0).unwrap().background, Some(Color::rgb(0xFF, 0x00, 0x00)));
    assert_eq!(table.cell(0, 1).unwrap().background, Some(HEADER_BLUE));
}

#[test]
fn test_style_not_applied_when_disabled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.docx");
    export_docx_with(&report(), &path, &WriteSettings::default(), Some(&report_style())).unwrap();

    let settings = codec::ReadSettings {
        apply_table_styles: false,
        ..Default::default()
    };
    let result = codec::import_docx_with(&path, &settings).unwrap();
    let table = result.document.tables().next().unwrap();
    assert_eq!(table.cell(0, 0).unwrap().background, None);
}
