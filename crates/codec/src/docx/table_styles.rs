//! Table style cascade
//!
//! Resolves the conditional formatting of a named table style onto the
//! cells of a table. The cascade only fills gaps: a background, run color
//! or bold flag that is already set on a cell or run is never replaced, and
//! table borders are only filled on sides the table leaves unset.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::styles::{Condition, ConditionRegion, TableStyleCatalog, TableStyleDefinition};
use doc_model::{Table, TableLook};
use std::collections::HashSet;

/// Position of a cell in the table grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    /// First grid column the cell covers
    pub first_column: usize,
    /// Last grid column the cell covers
    pub last_column: usize,
    pub row_count: usize,
    pub column_count: usize,
}

impl CellPosition {
    fn is_first_row(&self) -> bool {
        self.row == 0
    }

    fn is_last_row(&self) -> bool {
        self.row + 1 == self.row_count
    }

    fn is_first_column(&self) -> bool {
        self.first_column == 0
    }

    fn is_last_column(&self) -> bool {
        self.last_column + 1 >= self.column_count
    }
}

/// Applies table style conditions from a catalog
pub struct TableStyleResolver<'a> {
    catalog: &'a TableStyleCatalog,
}

impl<'a> TableStyleResolver<'a> {
    pub fn new(catalog: &'a TableStyleCatalog) -> Self {
        Self { catalog }
    }

    /// The style with its `basedOn` ancestors merged in
    ///
    /// A region the child defines is kept whole; regions only an ancestor
    /// defines are inherited from the nearest one. Returns `Ok(None)` when
    /// the style id is not in the catalog and [`DocxError::StyleCycle`] when
    /// the chain loops.
    pub fn resolve_style(&self, style_id: &str) -> DocxResult<Option<TableStyleDefinition>> {
        let Some(style) = self.catalog.get(style_id) else {
            return Ok(None);
        };

        let mut resolved = style.clone();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut chain = vec![style.style_id.as_str()];
        visited.insert(style.style_id.as_str());

        let mut parent_id = style.based_on.as_deref();
        while let Some(id) = parent_id {
            if !visited.insert(id) {
                chain.push(id);
                return Err(DocxError::StyleCycle(chain.join(" -> ")));
            }
            chain.push(id);

            let Some(parent) = self.catalog.get(id) else {
                tracing::debug!(style = style_id, parent = id, "basedOn style not in catalog");
                break;
            };
            for (region, condition) in &parent.conditions {
                resolved
                    .conditions
                    .entry(*region)
                    .or_insert_with(|| condition.clone());
            }
            parent_id = parent.based_on.as_deref();
        }

        Ok(Some(resolved))
    }

    /// Regions that apply to a cell, lowest priority first
    pub fn regions_for(look: &TableLook, position: &CellPosition) -> Vec<ConditionRegion> {
        let mut regions = vec![ConditionRegion::WholeTable];

        if look.banded_columns {
            let skip = (look.first_column && position.is_first_column())
                || (look.last_column && position.is_last_column());
            if !skip {
                let index = position.first_column - usize::from(look.first_column);
                regions.push(if index % 2 == 0 {
                    ConditionRegion::Band1Vert
                } else {
                    ConditionRegion::Band2Vert
                });
            }
        }

        if look.banded_rows {
            let skip = (look.first_row && position.is_first_row())
                || (look.last_row && position.is_last_row());
            if !skip {
                let index = position.row - usize::from(look.first_row);
                regions.push(if index % 2 == 0 {
                    ConditionRegion::Band1Horz
                } else {
                    ConditionRegion::Band2Horz
                });
            }
        }

        if look.first_column && position.is_first_column() {
            regions.push(ConditionRegion::FirstCol);
        }
        if look.last_column && position.is_last_column() {
            regions.push(ConditionRegion::LastCol);
        }
        if look.first_row && position.is_first_row() {
            regions.push(ConditionRegion::FirstRow);
        }
        if look.last_row && position.is_last_row() {
            regions.push(ConditionRegion::LastRow);
        }

        let corners = [
            (
                ConditionRegion::NwCell,
                look.first_row && look.first_column,
                position.is_first_row() && position.is_first_column(),
            ),
            (
                ConditionRegion::NeCell,
                look.first_row && look.last_column,
                position.is_first_row() && position.is_last_column(),
            ),
            (
                ConditionRegion::SwCell,
                look.last_row && look.first_column,
                position.is_last_row() && position.is_first_column(),
            ),
            (
                ConditionRegion::SeCell,
                look.last_row && look.last_column,
                position.is_last_row() && position.is_last_column(),
            ),
        ];
        for (region, active, at) in corners {
            if active && at {
                regions.push(region);
            }
        }

        regions
    }

    /// Effective condition for one cell of a resolved style
    pub fn cell_condition(
        style: &TableStyleDefinition,
        look: &TableLook,
        position: &CellPosition,
    ) -> Condition {
        let mut effective = Condition::default();
        for region in Self::regions_for(look, position) {
            if let Some(condition) = style.condition(region) {
                effective.overlay(condition);
            }
        }
        effective
    }

    /// Fill the gaps of `table` from its named style
    ///
    /// Returns `Ok(false)` when the table has no style or the style is not
    /// in the catalog.
    pub fn apply(&self, table: &mut Table) -> DocxResult<bool> {
        let Some(style_id) = table.style_id.clone() else {
            return Ok(false);
        };
        let Some(style) = self.resolve_style(&style_id)? else {
            tracing::debug!(style = %style_id, "table style not in catalog");
            return Ok(false);
        };

        let starts = table.grid_columns();
        let row_count = table.row_count();
        let column_count = table.column_count();
        let look = table.look;

        for (row_index, row) in table.rows.iter_mut().enumerate() {
            for (cell_index, cell) in row.cells.iter_mut().enumerate() {
                let first_column = starts
                    .get(row_index)
                    .and_then(|r| r.get(cell_index))
                    .copied()
                    .unwrap_or(cell_index);
                let position = CellPosition {
                    row: row_index,
                    first_column,
                    last_column: first_column + cell.column_span.max(1) as usize - 1,
                    row_count,
                    column_count,
                };
                let condition = Self::cell_condition(&style, &look, &position);

                if cell.background.is_none() {
                    cell.background = condition.cell_shading;
                }
                for run in cell.runs_mut() {
                    if run.format.color.is_none() {
                        run.format.color = condition.text_color;
                    }
                    if run.format.bold.is_none() {
                        run.format.bold = condition.bold;
                    }
                }
            }
        }

        if let Some(whole) = style.condition(ConditionRegion::WholeTable) {
            table.borders.fill_missing(&whole.borders);
        }

        tracing::debug!(style = %style_id, "table style applied");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Border, Color, Paragraph, Run, RunFormat, TableBorders, TableCell};

    const A: Color = Color::rgb(0xAA, 0xAA, 0xAA);
    const B: Color = Color::rgb(0xBB, 0xBB, 0xBB);
    const C: Color = Color::rgb(0xCC, 0xCC, 0xCC);

    fn shading(color: Color) -> Condition {
        Condition {
            cell_shading: Some(color),
            ..Default::default()
        }
    }

    fn catalog() -> TableStyleCatalog {
        let mut catalog = TableStyleCatalog::new();
        catalog.insert(
            TableStyleDefinition::new("Base")
                .with_condition(ConditionRegion::WholeTable, shading(A))
                .with_condition(
                    ConditionRegion::LastRow,
                    Condition {
                        bold: Some(true),
                        ..Default::default()
                    },
                ),
        );
        catalog.insert(
            TableStyleDefinition::new("Fancy")
                .based_on("Base")
                .with_condition(
                    ConditionRegion::FirstRow,
                    Condition {
                        cell_shading: Some(B),
                        text_color: Some(Color::WHITE),
                        bold: Some(true),
                        borders: TableBorders::default(),
                    },
                )
                .with_condition(ConditionRegion::Band1Horz, shading(C)),
        );
        catalog
    }

    fn position(row: usize, column: usize, rows: usize, columns: usize) -> CellPosition {
        CellPosition {
            row,
            first_column: column,
            last_column: column,
            row_count: rows,
            column_count: columns,
        }
    }

    #[test]
    fn test_inheritance_merges_missing_regions() {
        let catalog = catalog();
        let resolver = TableStyleResolver::new(&catalog);
        let style = resolver.resolve_style("Fancy").unwrap().unwrap();
        assert_eq!(style.condition(ConditionRegion::WholeTable), Some(&shading(A)));
        assert!(style.condition(ConditionRegion::LastRow).is_some());
        assert_eq!(
            style.condition(ConditionRegion::FirstRow).and_then(|c| c.cell_shading),
            Some(B)
        );
    }

    #[test]
    fn test_unknown_style_is_none() {
        let catalog = catalog();
        let resolver = TableStyleResolver::new(&catalog);
        assert!(resolver.resolve_style("Missing").unwrap().is_none());
    }

    #[test]
    fn test_cycle_detected() {
        let mut catalog = TableStyleCatalog::new();
        catalog.insert(TableStyleDefinition::new("A").based_on("B"));
        catalog.insert(TableStyleDefinition::new("B").based_on("C"));
        catalog.insert(TableStyleDefinition::new("C").based_on("A"));
        let resolver = TableStyleResolver::new(&catalog);
        match resolver.resolve_style("A") {
            Err(DocxError::StyleCycle(chain)) => assert_eq!(chain, "A -> B -> C -> A"),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let mut catalog = TableStyleCatalog::new();
        catalog.insert(TableStyleDefinition::new("Loop").based_on("Loop"));
        let resolver = TableStyleResolver::new(&catalog);
        assert!(matches!(resolver.resolve_style("Loop"), Err(DocxError::StyleCycle(_))));
    }

    #[test]
    fn test_region_priority_order() {
        let look = TableLook {
            first_row: true,
            last_row: true,
            first_column: true,
            last_column: false,
            banded_rows: true,
            banded_columns: true,
        };
        let regions = TableStyleResolver::regions_for(&look, &position(0, 0, 3, 3));
        assert_eq!(
            regions,
            vec![
                ConditionRegion::WholeTable,
                ConditionRegion::FirstCol,
                ConditionRegion::FirstRow,
                ConditionRegion::NwCell,
            ]
        );

        let regions = TableStyleResolver::regions_for(&look, &position(1, 1, 3, 3));
        assert_eq!(
            regions,
            vec![
                ConditionRegion::WholeTable,
                ConditionRegion::Band1Vert,
                ConditionRegion::Band1Horz,
            ]
        );

        let regions = TableStyleResolver::regions_for(&look, &position(2, 2, 3, 3));
        assert_eq!(
            regions,
            vec![
                ConditionRegion::WholeTable,
                ConditionRegion::Band2Vert,
                ConditionRegion::LastRow,
            ]
        );
    }

    #[test]
    fn test_banding_without_header_row() {
        let look = TableLook {
            first_row: false,
            banded_rows: true,
            ..TableLook::none()
        };
        assert!(TableStyleResolver::regions_for(&look, &position(0, 0, 4, 1))
            .contains(&ConditionRegion::Band1Horz));
        assert!(TableStyleResolver::regions_for(&look, &position(1, 0, 4, 1))
            .contains(&ConditionRegion::Band2Horz));
    }

    #[test]
    fn test_cascade_precedence() {
        let catalog = catalog();
        let resolver = TableStyleResolver::new(&catalog);
        let mut table = Table::new(3, 2).with_style("Fancy");
        table.rows[0].cells[1] = TableCell::with_text("x").with_background(C);
        resolver.apply(&mut table).unwrap();

        // header row wins over whole table
        assert_eq!(table.rows[0].cells[0].background, Some(B));
        // explicit value is kept
        assert_eq!(table.rows[0].cells[1].background, Some(C));
        // first data row is band 1
        assert_eq!(table.rows[1].cells[0].background, Some(C));
        // default look has no last row, so band 2 falls back to whole table
        assert_eq!(table.rows[2].cells[0].background, Some(A));
    }

    #[test]
    fn test_run_formatting_fills_gaps_only() {
        let catalog = catalog();
        let resolver = TableStyleResolver::new(&catalog);
        let mut table = Table::new(1, 2).with_style("Fancy");
        table.rows[0].cells[0].paragraphs = vec![Paragraph::new().with_run(Run::text("plain"))];
        table.rows[0].cells[1].paragraphs = vec![Paragraph::new().with_run(
            Run::text("explicit").with_format(RunFormat {
                bold: Some(false),
                color: Some(Color::BLACK),
                ..Default::default()
            }),
        )];
        resolver.apply(&mut table).unwrap();

        let plain = &table.rows[0].cells[0].paragraphs[0].runs[0].format;
        assert_eq!(plain.bold, Some(true));
        assert_eq!(plain.color, Some(Color::WHITE));

        let explicit = &table.rows[0].cells[1].paragraphs[0].runs[0].format;
        assert_eq!(explicit.bold, Some(false));
        assert_eq!(explicit.color, Some(Color::BLACK));
    }

    #[test]
    fn test_table_borders_filled_not_replaced() {
        let mut catalog = TableStyleCatalog::new();
        catalog.insert(TableStyleDefinition::new("Grid").with_condition(
            ConditionRegion::WholeTable,
            Condition {
                borders: TableBorders::all(Border::single(0.5, Color::BLACK)),
                ..Default::default()
            },
        ));
        let mut table = Table::new(1, 1).with_style("Grid");
        table.borders.top = Some(Border::none());

        TableStyleResolver::new(&catalog).apply(&mut table).unwrap();
        assert_eq!(table.borders.top, Some(Border::none()));
        assert_eq!(table.borders.bottom, Some(Border::single(0.5, Color::BLACK)));
        assert!(table.borders.inside_vertical.is_some());
    }

    #[test]
    fn test_unstyled_table_untouched() {
        let catalog = catalog();
        let mut table = Table::new(2, 2);
        let before = table.clone();
        assert!(!TableStyleResolver::new(&catalog).apply(&mut table).unwrap());
        assert_eq!(table, before);
    }
}
