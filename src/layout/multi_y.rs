//! Records as columns, fields as row headers.

use super::widths::{compensate_body, find_max_at_indices};
use super::{header_cell, sized, width_at, GridPlan, LayoutInput, RowPlan, TableLayout, TextMeter};
use crate::cell::{Cell, CellData, CellRole};
use crate::config::LayoutKind;
use crate::data::{labelled_header, CellValue};
use crate::error::Result;
use crate::highlight;

pub struct MultiYLayout;

impl TableLayout for MultiYLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::MultiY
    }

    fn build(&self, input: &LayoutInput<'_>, meter: &mut TextMeter) -> Result<GridPlan> {
        let option = &input.config.option;
        let meta = &option.data_meta_info;
        let surface = input.surface;

        // One array per key: the header label, then one entry per record.
        let measurements: Vec<Vec<f64>> = option
            .rows
            .iter()
            .chain(&option.columns)
            .map(|key| {
                std::iter::once(meter.header_width(surface, &labelled_header(key, meta)))
                    .chain(input.records.iter().map(|r| {
                        meter.body_width(surface, &input.text(key, r.get(key), false))
                    }))
                    .collect()
            })
            .collect();
        let (mut widths, natural_sum) = find_max_at_indices(&measurements)?;
        let compensated = compensate_body(&mut widths, 1, input.budget);

        let mut rows = Vec::with_capacity(option.rows.len() + 1);
        let label_key = option.columns.first().cloned().unwrap_or_default();
        let header: Vec<Cell> = option
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let corner = i == 0;
                let data = CellData {
                    data_index: i.checked_sub(1),
                    key: label_key.clone(),
                    value: CellValue::Text(column.clone()),
                    row_indexes: vec![0],
                    column_indexes: vec![i],
                    is_number: input.is_number(&label_key),
                    text: if corner {
                        String::new()
                    } else {
                        column.clone()
                    },
                    ..CellData::default()
                };
                let role = if corner {
                    CellRole::CORNER
                } else {
                    CellRole::COLUMN_HEADER
                };
                header_cell(sized(data, width_at(&widths, i), compensated), role, None)
            })
            .collect();
        if !header.is_empty() {
            rows.push(RowPlan::new(header));
        }

        for (index, key) in option.rows.iter().enumerate() {
            let mut cells = Vec::with_capacity(input.records.len() + 1);
            let row_header = CellData {
                key: key.clone(),
                row_indexes: vec![index + 1],
                column_indexes: vec![0],
                text: labelled_header(key, meta),
                ..CellData::default()
            };
            cells.push(header_cell(
                sized(row_header, width_at(&widths, 0), compensated),
                CellRole::ROW_HEADER,
                None,
            ));
            for (idx, record) in input.records.iter().enumerate() {
                let value = record.get(key);
                let data = CellData {
                    data_index: Some(input.data_offset + idx),
                    key: key.clone(),
                    value: value.cloned().unwrap_or_default(),
                    row_indexes: vec![index + 1],
                    column_indexes: vec![idx + 1],
                    is_number: input.is_number(key),
                    text: input.text(key, value, false),
                    ..CellData::default()
                };
                cells.push(Cell::normal(sized(
                    data,
                    width_at(&widths, idx + 1),
                    compensated,
                )));
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
        highlight::cross_links(cells, origin)
    }

    fn selects_key(&self, role: CellRole) -> bool {
        role.heads_row()
    }
}
