//! Projections of the tree for editing surfaces that do not speak DOCX
//!
//! JSON goes both ways and carries everything, shapes included, with image
//! bytes base64 encoded. HTML is a read-only view.

use crate::{
    ChartContent, ChartFrame, Document, Element, FieldKind, HeaderFooter, ListKind, Paragraph, Run,
    RunContent, RunFormat, Shape, ShapeKind, Table, UnderlineStyle, VerticalAlign,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

/// Serialize the tree to JSON
pub fn to_json(document: &Document) -> crate::Result<String> {
    Ok(serde_json::to_string(document)?)
}

/// Serialize the tree to indented JSON
pub fn to_json_pretty(document: &Document) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Rebuild a tree from its JSON projection
pub fn from_json(json: &str) -> crate::Result<Document> {
    Ok(serde_json::from_str(json)?)
}

/// Render a read-only HTML view of the tree
pub fn to_html(document: &Document) -> String {
    let mut out = String::from("<article class=\"document\">");
    if let Some(header) = &document.header {
        write_header_footer(&mut out, "header", header);
    }
    for element in &document.elements {
        match element {
            Element::Paragraph(p) => write_paragraph(&mut out, p),
            Element::Table(t) => write_table(&mut out, t),
            Element::Chart(c) => write_chart(&mut out, c),
            Element::Shape(s) => write_shape(&mut out, s),
        }
    }
    if let Some(footer) = &document.footer {
        write_header_footer(&mut out, "footer", footer);
    }
    out.push_str("</article>");
    out
}

fn write_header_footer(out: &mut String, tag: &str, part: &HeaderFooter) {
    let _ = write!(out, "<{}>", tag);
    for p in &part.paragraphs {
        write_paragraph(out, p);
    }
    let _ = write!(out, "</{}>", tag);
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph) {
    let tag = match paragraph.heading_level {
        Some(level) => format!("h{}", level),
        None => "p".to_string(),
    };

    let mut style = Vec::new();
    if let Some(alignment) = paragraph.alignment {
        let value = match alignment {
            crate::Alignment::Left => "left",
            crate::Alignment::Center => "center",
            crate::Alignment::Right => "right",
            crate::Alignment::Justify => "justify",
        };
        style.push(format!("text-align:{}", value));
    }
    if let Some(before) = paragraph.spacing.before {
        style.push(format!("margin-top:{}pt", before));
    }
    if let Some(after) = paragraph.spacing.after {
        style.push(format!("margin-bottom:{}pt", after));
    }
    if let Some(left) = paragraph.indent.left {
        style.push(format!("margin-left:{}pt", left));
    }
    if let Some(first) = paragraph.indent.first_line {
        style.push(format!("text-indent:{}pt", first));
    }
    if let Some(background) = paragraph.background {
        style.push(format!("background-color:{}", background.to_css()));
    }

    let _ = write!(out, "<{}", tag);
    if let Some(list) = paragraph.list {
        let kind = match list.kind {
            ListKind::Bullet => "bullet",
            ListKind::Numbered => "numbered",
        };
        let _ = write!(out, " data-list=\"{}\" data-level=\"{}\"", kind, list.level);
    }
    write_style_attr(out, &style);
    out.push('>');
    for run in &paragraph.runs {
        write_run(out, run);
    }
    let _ = write!(out, "</{}>", tag);
}

fn write_run(out: &mut String, run: &Run) {
    if let Some(link) = &run.hyperlink {
        let _ = write!(out, "<a href=\"{}\"", encode_double_quoted_attribute(&link.url));
        if let Some(tooltip) = &link.tooltip {
            let _ = write!(out, " title=\"{}\"", encode_double_quoted_attribute(tooltip));
        }
        out.push('>');
    }

    match &run.content {
        RunContent::Text(text) => {
            let style = run_style(&run.format);
            if style.is_empty() {
                out.push_str(&encode_text(text));
            } else {
                out.push_str("<span");
                write_style_attr(out, &style);
                let _ = write!(out, ">{}</span>", encode_text(text));
            }
        }
        RunContent::Image(image) => {
            let _ = write!(
                out,
                "<img src=\"data:{};base64,{}\" width=\"{}\" height=\"{}\"",
                encode_double_quoted_attribute(&image.content_type),
                STANDARD.encode(&image.data),
                image.width,
                image.height
            );
            if let Some(alt) = &image.description {
                let _ = write!(out, " alt=\"{}\"", encode_double_quoted_attribute(alt));
            }
            out.push_str(">");
        }
        RunContent::Field(kind) => {
            let placeholder = match kind {
                FieldKind::PageNumber => "#",
                FieldKind::TotalPages => "##",
            };
            let _ = write!(
                out,
                "<span class=\"field\" data-field=\"{}\">{}</span>",
                kind.instruction(),
                placeholder
            );
        }
    }

    if run.hyperlink.is_some() {
        out.push_str("</a>");
    }
}

fn run_style(format: &RunFormat) -> Vec<String> {
    let mut style = Vec::new();
    if format.is_bold() {
        style.push("font-weight:bold".to_string());
    }
    if format.is_italic() {
        style.push("font-style:italic".to_string());
    }
    let mut decorations = Vec::new();
    if let Some(underline) = format.underline {
        decorations.push("underline");
        if underline == UnderlineStyle::Double {
            style.push("text-decoration-style:double".to_string());
        }
    }
    if format.strikethrough == Some(true) {
        decorations.push("line-through");
    }
    if !decorations.is_empty() {
        style.push(format!("text-decoration:{}", decorations.join(" ")));
    }
    if format.all_caps == Some(true) {
        style.push("text-transform:uppercase".to_string());
    }
    if format.small_caps == Some(true) {
        style.push("font-variant:small-caps".to_string());
    }
    match format.vertical_align {
        Some(VerticalAlign::Superscript) => style.push("vertical-align:super".to_string()),
        Some(VerticalAlign::Subscript) => style.push("vertical-align:sub".to_string()),
        None => {}
    }
    if let Some(font) = &format.font {
        style.push(format!("font-family:'{}'", font.replace('\'', "")));
    }
    if let Some(size) = format.font_size {
        style.push(format!("font-size:{}pt", size));
    }
    if let Some(color) = format.color {
        style.push(format!("color:{}", color.to_css()));
    }
    if let Some(highlight) = format.highlight {
        style.push(format!("background-color:{}", highlight.color().to_css()));
    }
    style
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str("<table");
    if let Some(summary) = &table.summary {
        let _ = write!(out, " aria-description=\"{}\"", encode_double_quoted_attribute(summary));
    }
    out.push('>');
    if let Some(caption) = &table.caption {
        let _ = write!(out, "<caption>{}</caption>", encode_text(caption));
    }
    for row in &table.rows {
        out.push_str("<tr>");
        let tag = if row.is_header { "th" } else { "td" };
        for cell in &row.cells {
            let _ = write!(out, "<{}", tag);
            if cell.column_span > 1 {
                let _ = write!(out, " colspan=\"{}\"", cell.column_span);
            }
            if cell.row_span > 1 {
                let _ = write!(out, " rowspan=\"{}\"", cell.row_span);
            }
            let mut style = Vec::new();
            if let Some(width) = cell.width {
                style.push(format!("width:{}pt", width));
            }
            if let Some(background) = cell.background {
                style.push(format!("background-color:{}", background.to_css()));
            }
            write_style_attr(out, &style);
            out.push('>');
            for p in &cell.paragraphs {
                write_paragraph(out, p);
            }
            let _ = write!(out, "</{}>", tag);
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
}

fn write_chart(out: &mut String, frame: &ChartFrame) {
    let chart = match &frame.content {
        ChartContent::Resolved(chart) => chart,
        ChartContent::Unresolved { relationship_id } => {
            let _ = write!(
                out,
                "<figure class=\"chart unresolved\" data-rel=\"{}\"></figure>",
                encode_double_quoted_attribute(relationship_id)
            );
            return;
        }
    };

    let _ = write!(
        out,
        "<figure class=\"chart\" data-type=\"{}\" style=\"width:{}pt;height:{}pt\">",
        chart.chart_type.plot_element(),
        frame.width,
        frame.height
    );
    if let Some(title) = &chart.title {
        let _ = write!(out, "<figcaption>{}</figcaption>", encode_text(title));
    }
    out.push_str("<table class=\"chart-data\">");
    for series in &chart.series {
        let _ = write!(out, "<tr><th>{}</th>", encode_text(&series.name));
        for index in 0..series.point_count() {
            let _ = write!(
                out,
                "<td data-category=\"{}\">{}</td>",
                encode_double_quoted_attribute(series.category(index)),
                charts::format_chart_number(series.value(index))
            );
        }
        out.push_str("</tr>");
    }
    out.push_str("</table></figure>");
}

fn write_shape(out: &mut String, shape: &Shape) {
    let mut style = vec![format!("width:{}pt", shape.width), format!("height:{}pt", shape.height)];
    if let Some(fill) = shape.fill {
        style.push(format!("background-color:{}", fill.to_css()));
    }
    if let Some(color) = shape.border_color.or(shape.stroke_color) {
        let width = shape.border_width.unwrap_or(1.0);
        style.push(format!("border:{}pt solid {}", width, color.to_css()));
    }
    if shape.kind == ShapeKind::Circle {
        style.push("border-radius:50%".to_string());
    }

    let _ = write!(out, "<div class=\"shape shape-{}\"", shape.kind.name());
    write_style_attr(out, &style);
    out.push('>');
    if let Some(source) = &shape.image_source {
        let _ = write!(out, "<img src=\"{}\">", encode_double_quoted_attribute(source));
    }
    out.push_str("</div>");
}

fn write_style_attr(out: &mut String, style: &[String]) {
    if !style.is_empty() {
        let _ = write!(
            out,
            " style=\"{}\"",
            encode_double_quoted_attribute(&style.join(";"))
        );
    }
}
