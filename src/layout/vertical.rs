//! One column per field, one row per record.

use super::widths::{compensate_capped, natural_width};
use super::{header_cell, sized, GridPlan, LayoutInput, RowPlan, TableLayout, TextMeter};
use crate::cell::{Cell, CellData, CellRole};
use crate::config::{LayoutKind, TableConfig};
use crate::data::CellValue;
use crate::error::Result;
use crate::highlight;

pub struct VerticalLayout;

impl TableLayout for VerticalLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Vertical
    }

    fn build(&self, input: &LayoutInput<'_>, meter: &mut TextMeter) -> Result<GridPlan> {
        let columns = &input.config.option.columns;
        let surface = input.surface;

        let mut widths: Vec<f64> = columns
            .iter()
            .map(|key| {
                let header = meter.header_width(surface, key);
                let contents: Vec<f64> = input
                    .records
                    .iter()
                    .map(|r| meter.body_width(surface, &input.text(key, r.get(key), true)))
                    .collect();
                natural_width(header, contents)
            })
            .collect();
        let natural_sum = widths.iter().sum();
        let compensated = compensate_capped(&mut widths, input.budget);

        let mut rows = Vec::with_capacity(input.records.len() + 1);
        let header = columns
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (key, width))| {
                let data = CellData {
                    key: key.clone(),
                    value: CellValue::Null,
                    row_indexes: vec![0],
                    column_indexes: vec![i],
                    is_number: input.is_number(key),
                    text: key.clone(),
                    ..CellData::default()
                };
                header_cell(
                    sized(data, *width, compensated),
                    CellRole::COLUMN_HEADER,
                    Some(input.sort),
                )
            })
            .collect();
        rows.push(RowPlan::new(header));

        for (index, record) in input.records.iter().enumerate() {
            let cells = columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (key, width))| {
                    let value = record.get(key);
                    let data = CellData {
                        data_index: Some(input.data_offset + index),
                        key: key.clone(),
                        value: value.cloned().unwrap_or_default(),
                        row_indexes: vec![index + 1],
                        column_indexes: vec![i],
                        is_number: input.is_number(key),
                        text: input.text(key, value, true),
                        ..CellData::default()
                    };
                    Cell::normal(sized(data, *width, compensated))
                })
                .collect();
            rows.push(RowPlan::new(cells));
        }

        Ok(GridPlan {
            widths,
            natural_sum,
            rows,
        })
    }

    fn linked_cells(&self, cells: &[Cell], origin: usize) -> Vec<usize> {
        highlight::column_links(cells, origin)
    }

    fn paginates(&self) -> bool {
        true
    }

    fn sort_columns(&self, config: &TableConfig) -> Vec<(String, bool)> {
        sortable(config)
    }

    fn selects_key(&self, role: CellRole) -> bool {
        role.heads_column()
    }
}

/// Numeric and date fields among the configured columns.
pub(super) fn sortable(config: &TableConfig) -> Vec<(String, bool)> {
    config
        .option
        .columns
        .iter()
        .filter_map(|key| {
            let meta = config.option.meta(key)?;
            meta.is_sortable().then(|| (key.clone(), meta.is_date()))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::super::test_support::{all_cells, flat_config, record, run, surface};
    use super::*;
    use crate::cell::CellKind;
    use crate::table::events::SelectedType;

    fn config() -> TableConfig {
        flat_config(
            LayoutKind::Vertical,
            vec![
                record(&[("name", "north".into()), ("sales", 12.0.into())]),
                record(&[("name", "south".into()), ("sales", (-3.0).into())]),
            ],
            &[],
            &["name", "sales"],
        )
    }

    #[test]
    fn test_grid_shape() {
        let plan = run(&VerticalLayout, &config(), &surface());
        assert_eq!(plan.rows.len(), 3);
        let header = &plan.rows[0].cells;
        assert!(header.iter().all(Cell::is_header));
        assert_eq!(header[1].data.text, "sales");
        let body = &plan.rows[2].cells[1];
        assert_eq!(body.data.data_index, Some(1));
        assert_eq!(body.data.row_indexes, vec![2]);
        assert_eq!(body.data.text, "-3");
    }

    #[test]
    fn test_numeric_header_is_sortable() {
        let plan = run(&VerticalLayout, &config(), &surface());
        let sortable: Vec<bool> = plan.rows[0]
            .cells
            .iter()
            .map(|c| matches!(c.kind(), CellKind::Header(h) if h.sort_type().is_some()))
            .collect();
        assert_eq!(sortable, vec![false, true]);
    }

    #[test]
    fn test_widths_fill_viewport() {
        let plan = run(&VerticalLayout, &config(), &surface());
        assert!(plan.natural_sum < 570.0);
        let total: f64 = plan.widths.iter().sum();
        assert!((total - 570.0).abs() < 1e-9);
    }

    #[test]
    fn test_wide_columns_take_the_slack() {
        let mut config = config();
        config.option.data = crate::data::TableData::Flat(vec![record(&[
            ("name", "x".repeat(40).into()),
            ("sales", 1.0.into()),
        ])]);
        let plan = run(&VerticalLayout, &config, &surface());
        // "name" is capped, so it alone receives the remainder.
        let sales_natural = 5.0 * 10.0 + 28.0;
        assert_eq!(plan.widths[1], sales_natural);
        assert_eq!(plan.widths[0], 570.0 - sales_natural);
    }

    #[test]
    fn test_header_selection_reports_key_and_column_values() {
        let plan = run(&VerticalLayout, &config(), &surface());
        let cells = all_cells(&plan);
        let linked = VerticalLayout.linked_cells(&cells, 1);
        let refs: Vec<&Cell> = linked.iter().map(|i| &cells[*i]).collect();
        let selection = VerticalLayout.selection(&cells[1], &refs).unwrap();
        assert_eq!(selection.selected_type, SelectedType::Key);
        assert_eq!(selection.selected_value, CellValue::Text("sales".into()));
        assert_eq!(selection.data.len(), 2);
    }

    #[test]
    fn test_body_selection_uses_display_text_for_numbers() {
        let plan = run(&VerticalLayout, &config(), &surface());
        let cells = all_cells(&plan);
        let origin = 5;
        let linked = VerticalLayout.linked_cells(&cells, origin);
        let refs: Vec<&Cell> = linked.iter().map(|i| &cells[*i]).collect();
        let selection = VerticalLayout.selection(&cells[origin], &refs).unwrap();
        assert_eq!(selection.selected_type, SelectedType::Value);
        assert_eq!(selection.selected_value, CellValue::Text("-3".into()));
    }
}
