//! Records as rows, with the first column acting as row headers.

use super::vertical::sortable;
use super::widths::{compensate_body, natural_width};
use super::{header_cell, sized, GridPlan, LayoutInput, RowPlan, TableLayout, TextMeter};
use crate::cell::{Cell, CellData, CellRole};
use crate::config::{LayoutKind, TableConfig};
use crate::data::{labelled_header, CellValue};
use crate::error::Result;
use crate::highlight;

pub struct MultiXLayout;

impl TableLayout for MultiXLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::MultiX
    }

    fn build(&self, input: &LayoutInput<'_>, meter: &mut TextMeter) -> Result<GridPlan> {
        let columns = &input.config.option.columns;
        let meta = &input.config.option.data_meta_info;
        let surface = input.surface;

        let mut widths: Vec<f64> = columns
            .iter()
            .map(|key| {
                let header = meter.header_width(surface, &labelled_header(key, meta));
                let contents: Vec<f64> = input
                    .records
                    .iter()
                    .map(|r| meter.body_width(surface, &input.text(key, r.get(key), false)))
                    .collect();
                natural_width(header, contents)
            })
            .collect();
        let natural_sum = widths.iter().sum();
        let compensated = compensate_body(&mut widths, 1, input.budget);

        let mut rows = Vec::with_capacity(input.records.len() + 1);
        let header = columns
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (key, width))| {
                let role = if i == 0 {
                    CellRole::CORNER
                } else {
                    CellRole::COLUMN_HEADER
                };
                let data = CellData {
                    key: key.clone(),
                    value: CellValue::Null,
                    row_indexes: vec![0],
                    column_indexes: vec![i],
                    is_number: input.is_number(key),
                    text: if i == 0 {
                        String::new()
                    } else {
                        labelled_header(key, meta)
                    },
                    ..CellData::default()
                };
                header_cell(sized(data, *width, compensated), role, Some(input.sort))
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
                    let data = sized(
                        CellData {
                            data_index: Some(input.data_offset + index),
                            key: key.clone(),
                            value: value.cloned().unwrap_or_default(),
                            row_indexes: vec![index + 1],
                            column_indexes: vec![i],
                            is_number: i != 0 && input.is_number(key),
                            text: input.text(key, value, false),
                            ..CellData::default()
                        },
                        *width,
                        compensated,
                    );
                    if i == 0 {
                        header_cell(data, CellRole::ROW_HEADER, None)
                    } else {
                        Cell::normal(data)
                    }
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
        highlight::cross_links(cells, origin)
    }

    fn paginates(&self) -> bool {
        true
    }

    fn sort_columns(&self, config: &TableConfig) -> Vec<(String, bool)> {
        sortable(config)
            .into_iter()
            .filter(|(key, _)| config.option.columns.first() != Some(key))
            .collect()
    }

    fn selects_key(&self, role: CellRole) -> bool {
        role.heads_column()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::super::test_support::{all_cells, flat_config, record, run, surface};
    use super::*;
    use crate::config::FieldMeta;
    use crate::table::events::SelectedType;

    fn config() -> TableConfig {
        let mut config = flat_config(
            LayoutKind::MultiX,
            vec![
                record(&[("region", "north".into()), ("sales", 12.0.into())]),
                record(&[("region", "south".into()), ("sales", 7.0.into())]),
            ],
            &[],
            &["region", "sales"],
        );
        config
            .option
            .data_meta_info
            .insert("sales".into(), FieldMeta::number(Some("k")));
        config
    }

    #[test]
    fn test_roles_and_labels() {
        let plan = run(&MultiXLayout, &config(), &surface());
        let header = &plan.rows[0].cells;
        assert!(header[0].role().is_corner());
        assert_eq!(header[0].data.text, "");
        assert_eq!(header[1].data.text, "sales (k)");
        assert!(plan.rows[1].cells[0].role().heads_row());
        assert_eq!(plan.rows[1].cells[0].data.text, "north");
        assert!(!plan.rows[1].cells[1].is_header());
    }

    #[test]
    fn test_row_header_column_is_not_compensated() {
        let plan = run(&MultiXLayout, &config(), &surface());
        // "region" plus padding and slack.
        assert_eq!(plan.widths[0], 88.0);
        assert!((plan.widths.iter().sum::<f64>() - 570.0).abs() < 1e-9);
    }

    #[test]
    fn test_row_header_selects_value() {
        let plan = run(&MultiXLayout, &config(), &surface());
        let cells = all_cells(&plan);
        let origin = 2;
        let linked = MultiXLayout.linked_cells(&cells, origin);
        assert_eq!(linked, vec![2, 3]);
        let refs: Vec<&Cell> = linked.iter().map(|i| &cells[*i]).collect();
        let selection = MultiXLayout.selection(&cells[origin], &refs).unwrap();
        assert_eq!(selection.selected_type, SelectedType::Value);
        assert_eq!(selection.selected_value, CellValue::Text("north".into()));
        assert_eq!(selection.data.len(), 1);
    }

    #[test]
    fn test_column_header_selection() {
        let plan = run(&MultiXLayout, &config(), &surface());
        let cells = all_cells(&plan);
        let linked = MultiXLayout.linked_cells(&cells, 1);
        assert_eq!(linked, vec![1, 3, 5]);
        let refs: Vec<&Cell> = linked.iter().map(|i| &cells[*i]).collect();
        let selection = MultiXLayout.selection(&cells[1], &refs).unwrap();
        assert_eq!(selection.selected_type, SelectedType::Key);
        assert_eq!(selection.data.len(), 2);
    }

    #[test]
    fn test_corner_never_selects() {
        let plan = run(&MultiXLayout, &config(), &surface());
        let cells = all_cells(&plan);
        assert!(MultiXLayout.linked_cells(&cells, 0).is_empty());
        assert!(MultiXLayout.selection(&cells[0], &[]).is_none());
    }
}
