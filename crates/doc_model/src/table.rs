//! Table model - rows, cells, grid and style look flags
//!
//! Cells may span grid columns (`column_span`) and rows (`row_span`). A cell
//! covered by a vertical merge from above is never stored: the row simply
//! holds fewer cells, and [`Table::row_slots`] reconstructs where the covered
//! grid positions are.

use crate::{Alignment, Borders, Color, Paragraph, TableBorders};
use serde::{Deserialize, Serialize};

/// Vertical alignment of cell content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellVerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl CellVerticalAlign {
    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "top" => Some(CellVerticalAlign::Top),
            "center" => Some(CellVerticalAlign::Center),
            "bottom" => Some(CellVerticalAlign::Bottom),
            _ => None,
        }
    }

    pub fn to_xml(&self) -> &'static str {
        match self {
            CellVerticalAlign::Top => "top",
            CellVerticalAlign::Center => "center",
            CellVerticalAlign::Bottom => "bottom",
        }
    }
}

/// Which conditional regions of the table style are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLook {
    pub first_row: bool,
    pub last_row: bool,
    pub first_column: bool,
    pub last_column: bool,
    pub banded_rows: bool,
    pub banded_columns: bool,
}

impl Default for TableLook {
    /// The look new tables get: header row, first column and row banding
    fn default() -> Self {
        Self::from_bitmask(0x04A0)
    }
}

impl TableLook {
    /// Nothing active
    pub fn none() -> Self {
        Self {
            first_row: false,
            last_row: false,
            first_column: false,
            last_column: false,
            banded_rows: false,
            banded_columns: false,
        }
    }

    /// Decode the legacy hex `w:val` bitmask
    pub fn from_bitmask(value: u32) -> Self {
        Self {
            first_row: value & 0x0020 != 0,
            last_row: value & 0x0040 != 0,
            first_column: value & 0x0080 != 0,
            last_column: value & 0x0100 != 0,
            banded_rows: value & 0x0200 == 0,
            banded_columns: value & 0x0400 == 0,
        }
    }

    pub fn to_bitmask(&self) -> u32 {
        let mut value = 0;
        if self.first_row {
            value |= 0x0020;
        }
        if self.last_row {
            value |= 0x0040;
        }
        if self.first_column {
            value |= 0x0080;
        }
        if self.last_column {
            value |= 0x0100;
        }
        if !self.banded_rows {
            value |= 0x0200;
        }
        if !self.banded_columns {
            value |= 0x0400;
        }
        value
    }
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
    /// Grid columns consumed, at least 1
    pub column_span: u32,
    /// Rows covered by a vertical merge starting here, at least 1
    pub row_span: u32,
    /// Width in points
    pub width: Option<f32>,
    pub background: Option<Color>,
    pub borders: Borders,
    pub vertical_align: Option<CellVerticalAlign>,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            paragraphs: Vec::new(),
            column_span: 1,
            row_span: 1,
            width: None,
            background: None,
            borders: Borders::default(),
            vertical_align: None,
        }
    }
}

impl TableCell {
    /// An empty cell holding one empty paragraph
    pub fn new() -> Self {
        Self {
            paragraphs: vec![Paragraph::new()],
            ..Default::default()
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            paragraphs: vec![Paragraph::with_text(text)],
            ..Default::default()
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Plain text of all paragraphs, newline separated
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut crate::Run> {
        self.paragraphs.iter_mut().flat_map(|p| p.runs.iter_mut())
    }
}

/// A table row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Repeats as a header row
    pub is_header: bool,
    /// Explicit height in points
    pub height: Option<f32>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            ..Default::default()
        }
    }
}

/// Grid position occupant when walking a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSlot {
    /// The cell at this index of `row.cells` starts here
    Cell(usize),
    /// Covered by a vertical merge from a cell above
    Continuation { column_span: u32 },
}

/// A table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Table {
    pub rows: Vec<TableRow>,
    /// Named table style
    pub style_id: Option<String>,
    /// Column widths in points
    pub grid: Vec<f32>,
    pub borders: TableBorders,
    pub look: TableLook,
    pub alignment: Option<Alignment>,
    /// Preferred width in points
    pub width: Option<f32>,
    /// Accessibility caption
    pub caption: Option<String>,
    /// Accessibility description
    pub summary: Option<String>,
}

impl Table {
    /// A `rows` x `columns` table of empty cells
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: (0..rows)
                .map(|_| TableRow::new((0..columns).map(|_| TableCell::new()).collect()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid columns, from the grid or the widest row
    pub fn column_count(&self) -> usize {
        let widest = self
            .row_slots()
            .iter()
            .zip(&self.rows)
            .map(|(slots, row)| {
                slots
                    .iter()
                    .map(|slot| match slot {
                        GridSlot::Cell(i) => row.cells[*i].column_span.max(1) as usize,
                        GridSlot::Continuation { column_span } => (*column_span).max(1) as usize,
                    })
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(0);
        widest.max(self.grid.len())
    }

    pub fn cell(&self, row: usize, index: usize) -> Option<&TableCell> {
        self.rows.get(row)?.cells.get(index)
    }

    pub fn cell_mut(&mut self, row: usize, index: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row)?.cells.get_mut(index)
    }

    /// Per row, the grid positions in order, with vertically merged
    /// continuations restored
    pub fn row_slots(&self) -> Vec<Vec<GridSlot>> {
        // (start column, column span, rows still covered)
        let mut active: Vec<(usize, u32, u32)> = Vec::new();
        let mut result = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            let mut slots = Vec::new();
            let mut column = 0usize;
            let mut next_cell = 0usize;
            let mut started = Vec::new();

            loop {
                if let Some(entry) = active
                    .iter_mut()
                    .find(|(start, _, remaining)| *start == column && *remaining > 0)
                {
                    slots.push(GridSlot::Continuation {
                        column_span: entry.1,
                    });
                    entry.2 -= 1;
                    column += entry.1.max(1) as usize;
                    continue;
                }
                if let Some(cell) = row.cells.get(next_cell) {
                    let span = cell.column_span.max(1);
                    slots.push(GridSlot::Cell(next_cell));
                    if cell.row_span > 1 {
                        started.push((column, span, cell.row_span - 1));
                    }
                    next_cell += 1;
                    column += span as usize;
                    continue;
                }
                // Trailing continuations past the last real cell
                match active
                    .iter()
                    .filter(|(start, _, remaining)| *start > column && *remaining > 0)
                    .map(|(start, _, _)| *start)
                    .min()
                {
                    Some(start) => column = start,
                    None => break,
                }
            }

            active.retain(|(_, _, remaining)| *remaining > 0);
            active.extend(started);
            result.push(slots);
        }

        result
    }

    /// Grid column where each stored cell starts, per row
    pub fn grid_columns(&self) -> Vec<Vec<usize>> {
        self.row_slots()
            .iter()
            .zip(&self.rows)
            .map(|(slots, row)| {
                let mut column = 0usize;
                let mut starts = Vec::with_capacity(row.cells.len());
                for slot in slots {
                    match slot {
                        GridSlot::Cell(i) => {
                            starts.push(column);
                            column += row.cells[*i].column_span.max(1) as usize;
                        }
                        GridSlot::Continuation { column_span } => {
                            column += (*column_span).max(1) as usize;
                        }
                    }
                }
                starts
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_shape() {
        let table = Table::new(2, 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(1, 2).map(|c| c.paragraphs.len()), Some(1));
        assert!(table.cell(2, 0).is_none());
    }

    #[test]
    fn test_look_bitmask() {
        let look = TableLook::from_bitmask(0x04A0);
        assert!(look.first_row && look.first_column && look.banded_rows);
        assert!(!look.last_row && !look.last_column && !look.banded_columns);
        assert_eq!(look.to_bitmask(), 0x04A0);
        assert_eq!(TableLook::default(), look);
    }

    #[test]
    fn test_row_slots_restore_vertical_merge() {
        // | A (rowspan 2) | B |
        // |               | C |
        let mut table = Table::new(2, 2);
        table.rows[0].cells[0].row_span = 2;
        table.rows[1].cells.remove(0);

        let slots = table.row_slots();
        assert_eq!(slots[0], vec![GridSlot::Cell(0), GridSlot::Cell(1)]);
        assert_eq!(
            slots[1],
            vec![GridSlot::Continuation { column_span: 1 }, GridSlot::Cell(0)]
        );
        assert_eq!(table.grid_columns()[1], vec![1]);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_row_slots_trailing_continuation() {
        let mut table = Table::new(3, 2);
        table.rows[0].cells[1].row_span = 3;
        table.rows[1].cells.pop();
        table.rows[2].cells.pop();

        let slots = table.row_slots();
        assert_eq!(slots[2], vec![GridSlot::Cell(0), GridSlot::Continuation { column_span: 1 }]);
    }

    #[test]
    fn test_column_span_positions() {
        let mut table = Table::new(2, 3);
        table.rows[0].cells[0].column_span = 2;
        table.rows[0].cells.pop();
        assert_eq!(table.grid_columns()[0], vec![0, 2]);
        assert_eq!(table.column_count(), 3);
    }
}
