//! Key/value pairs of the first record, wrapped into visual rows.

use super::metrics::{MAX_COL_WIDTH, NEGATIVE_COLOR};
use super::{header_cell, sized, width_at, GridPlan, LayoutInput, RowPlan, TableLayout, TextMeter};
use crate::cell::{Cell, CellData, CellRole};
use crate::config::LayoutKind;
use crate::data::{CellValue, Record};
use crate::error::Result;
use crate::highlight;
use crate::table::events::{SelectedDatum, SelectedType, Selection};

/// Sub-columns taken by one key/value pair.
const PAIR: usize = 2;
/// Sub-column count whose odd trailing pair spans the full row.
const SPANNING_COLUMNS_NUM: usize = 4;

pub struct HorizontalLayout;

struct Geometry<'a> {
    widths: &'a [f64],
    natural_sum: f64,
    viewport: f64,
    columns_num: usize,
    rows_len: usize,
    chunks_len: usize,
}

impl Geometry<'_> {
    fn cell_width(&self, is_header: bool, col: usize, row: usize, pair: usize) -> f64 {
        let first = width_at(self.widths, 0);
        if self.columns_num == PAIR {
            return if is_header {
                first
            } else {
                self.viewport - first
            };
        }
        let last_row = row + 1 == self.chunks_len;
        if self.columns_num == SPANNING_COLUMNS_NUM
            && last_row
            && !self.rows_len.is_multiple_of(PAIR)
            && col != 0
        {
            return self.natural_sum.max(self.viewport) - first;
        }
        width_at(self.widths, col + pair * PAIR)
    }
}

fn pair_widths(
    input: &LayoutInput<'_>,
    meter: &mut TextMeter,
    chunks: &[&[String]],
    record: &Record,
) -> Vec<f64> {
    let surface = input.surface;
    let pairs = chunks.first().map_or(0, |c| c.len());
    let mut widths = Vec::with_capacity(pairs * PAIR);
    for col in 0..pairs {
        let mut header: f64 = 0.0;
        let mut content: f64 = 0.0;
        for key in chunks.iter().filter_map(|chunk| chunk.get(col)) {
            header = header.max(meter.header_width(surface, key));
            let text = input.text(key, record.get(key), true);
            content = content.max(meter.body_width(surface, &text));
        }
        widths.push(header.min(MAX_COL_WIDTH));
        widths.push(content.min(MAX_COL_WIDTH));
    }
    widths
}

impl TableLayout for HorizontalLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Horizontal
    }

    fn build(&self, input: &LayoutInput<'_>, meter: &mut TextMeter) -> Result<GridPlan> {
        let Some(record) = input.records.first() else {
            return Ok(GridPlan::default());
        };
        let keys = &input.config.option.rows;
        let columns_num = input.config.columns_num().max(PAIR);
        let pairs_per_row = columns_num / PAIR;
        let chunks: Vec<&[String]> = keys.chunks(pairs_per_row).collect();

        let mut widths = pair_widths(input, meter, &chunks, record);
        let natural_sum: f64 = widths.iter().sum();
        if input.budget.underfilled(natural_sum) && columns_num > PAIR {
            let offset = input.budget.offset(natural_sum, pairs_per_row);
            for w in widths.iter_mut().skip(1).step_by(PAIR) {
                *w += offset;
            }
        }

        let geometry = Geometry {
            widths: &widths,
            natural_sum,
            viewport: input.width(),
            columns_num,
            rows_len: keys.len(),
            chunks_len: chunks.len(),
        };
        let mut rows = Vec::with_capacity(chunks.len());
        for (row, chunk) in chunks.iter().enumerate() {
            let mut cells = Vec::with_capacity(chunk.len() * PAIR);
            for (pair, key) in chunk.iter().enumerate() {
                let value = record.get(key).cloned().unwrap_or_default();
                for col in 0..PAIR {
                    let is_header = col == 0;
                    let width = geometry.cell_width(is_header, col, row, pair);
                    let mut data = CellData {
                        key: key.clone(),
                        value: value.clone(),
                        row_indexes: vec![row],
                        column_indexes: vec![col + pair * PAIR],
                        ..CellData::default()
                    };
                    if is_header {
                        data.text = key.clone();
                        cells.push(header_cell(sized(data, width, true), CellRole::HEADER, None));
                    } else {
                        data.data_index = Some(input.data_offset);
                        data.is_number = input.is_number(key);
                        data.text = input.text(key, record.get(key), true);
                        if data.is_number && value.is_negative() {
                            data.color = Some(NEGATIVE_COLOR.to_string());
                        }
                        cells.push(Cell::normal(sized(data, width, true)));
                    }
                }
            }
            rows.push(RowPlan::new(cells));
        }

        Ok(GridPlan {
            widths,
            natural_sum,
            rows,
        })
    }

    fn linked_cells(&self, cells: &[Cell], origin: usize) -> Vec<usize> {
        highlight::pair_links(cells, origin)
    }

    fn shows_overlay(&self) -> bool {
        false
    }

    fn selects_key(&self, role: CellRole) -> bool {
        role.is_header
    }

    fn selection(&self, origin: &Cell, linked: &[&Cell]) -> Option<Selection> {
        let (selected_type, selected_value) = if origin.is_header() {
            (SelectedType::Key, CellValue::Text(origin.data.key.clone()))
        } else {
            (SelectedType::Value, CellValue::Text(origin.data.text.clone()))
        };
        Some(Selection {
            data: linked
                .iter()
                .filter(|c| !c.is_header())
                .map(|c| SelectedDatum::from(&c.data))
                .collect(),
            selected_value,
            selected_type,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::super::test_support::{all_cells, flat_config, record, run, surface};
    use super::*;
    use crate::config::TableConfig;

    fn config(columns_num: usize, keys: &[&str]) -> TableConfig {
        let pairs: Vec<(&str, CellValue)> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (*k, CellValue::Number(i as f64 - 1.0)))
            .collect();
        let mut config = flat_config(LayoutKind::Horizontal, vec![record(&pairs)], keys, &[]);
        config.option.columns_num = Some(columns_num);
        config
    }

    #[test]
    fn test_single_pair_fills_viewport() {
        let setup = config(2, &["sales", "cost"]);
        let plan = run(&HorizontalLayout, &setup, &surface());
        assert_eq!(plan.rows.len(), 2);
        let row = &plan.rows[0].cells;
        assert_eq!(row[0].data.width + row[1].data.width, 570.0);
        assert!(row[0].is_header());
        assert_eq!(row[1].data.data_index, Some(0));
    }

    #[test]
    fn test_negative_numbers_are_coloured() {
        let setup = config(2, &["sales", "cost"]);
        let plan = run(&HorizontalLayout, &setup, &surface());
        // sales = -1
        let sales = &plan.rows[0].cells[1].data;
        assert_eq!(sales.color.as_deref(), Some(NEGATIVE_COLOR));
        assert_eq!(plan.rows[0].cells[0].data.color, None);
        // "cost" has no numeric meta.
        assert_eq!(plan.rows[1].cells[1].data.color, None);
    }

    #[test]
    fn test_value_columns_take_the_slack() {
        let setup = config(4, &["a", "b", "c", "d"]);
        let plan = run(&HorizontalLayout, &setup, &surface());
        assert_eq!(plan.rows.len(), 2);
        let total: f64 = plan.widths.iter().sum();
        assert!((total - 570.0).abs() < 1e-9);
        assert_eq!(plan.widths[0], 38.0);
        assert!(plan.widths[1] > plan.widths[0]);
    }

    #[test]
    fn test_odd_trailing_pair_spans_row() {
        let plan = run(&HorizontalLayout, &config(4, &["a", "b", "c"]), &surface());
        assert_eq!(plan.rows.len(), 2);
        let last = &plan.rows[1].cells;
        assert_eq!(last.len(), 2);
        let span = plan.natural_sum.max(570.0) - plan.widths[0];
        assert_eq!(last[1].data.width, span);
        assert_eq!(last[0].data.width, plan.widths[0]);
    }

    #[test]
    fn test_pair_selection() {
        let setup = config(2, &["sales", "cost"]);
        let plan = run(&HorizontalLayout, &setup, &surface());
        let cells = all_cells(&plan);
        let linked = HorizontalLayout.linked_cells(&cells, 0);
        assert_eq!(linked, vec![0, 1]);
        let refs: Vec<&Cell> = linked.iter().map(|i| &cells[*i]).collect();
        let selection = HorizontalLayout.selection(&cells[0], &refs).unwrap();
        assert_eq!(selection.selected_type, SelectedType::Key);
        assert_eq!(selection.data.len(), 1);
        assert_eq!(selection.data[0].value, CellValue::Number(-1.0));

        let selection = HorizontalLayout.selection(&cells[1], &refs).unwrap();
        assert_eq!(selection.selected_type, SelectedType::Value);
        assert_eq!(selection.selected_value, CellValue::Text("-1".into()));
    }
}
