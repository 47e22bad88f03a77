//! Hierarchical row headers over record columns.
//!
//! Rows follow the rank-sorted tree of the first record. Row headers are
//! indented by level and carry a toggle when the node has children; a row
//! hidden by a collapsed ancestor stays hidden across relayouts.

use super::metrics::ICON_WIDTH;
use super::widths::{compensate_body, find_max_at_indices};
use super::{header_cell, sized, width_at, GridPlan, LayoutInput, RowPlan, TableLayout, TextMeter};
use crate::cell::{Cell, CellData, CellRole, HeaderCell, TreeHandle};
use crate::config::LayoutKind;
use crate::data::{sort_flat_tree, CellValue, TreeRecord};
use crate::error::Result;
use crate::highlight;

pub struct TreeLayout;

/// Row keys in tree order, restricted to the configured rows when any.
fn row_order(first: &TreeRecord, rows: &[String]) -> Vec<String> {
    for missing in rows.iter().filter(|r| !first.contains_key(*r)) {
        log::warn!("tree row {missing} has no node in the first record");
    }
    first
        .keys()
        .filter(|k| rows.is_empty() || rows.contains(k))
        .cloned()
        .collect()
}

impl TableLayout for TreeLayout {
    fn kind(&self) -> LayoutKind {
        LayoutKind::Tree
    }

    fn build(&self, input: &LayoutInput<'_>, meter: &mut TextMeter) -> Result<GridPlan> {
        let option = &input.config.option;
        let Some(first) = input.tree.first().map(sort_flat_tree) else {
            return Ok(GridPlan::default());
        };
        let order = row_order(&first, &option.rows);
        let surface = input.surface;

        let measurements: Vec<Vec<f64>> = order
            .iter()
            .chain(&option.columns)
            .map(|key| {
                let level = first.get(key).map_or(0, |n| n.level);
                let header = meter.header_width(surface, key) + f64::from(level) * ICON_WIDTH;
                std::iter::once(header)
                    .chain(input.tree.iter().map(|record| {
                        let value = record.get(key).map(|n| &n.value);
                        meter.body_width(surface, &input.text(key, value, false))
                    }))
                    .collect()
            })
            .collect();
        let (mut widths, natural_sum) = find_max_at_indices(&measurements)?;
        let compensated = compensate_body(&mut widths, 1, input.budget);

        let mut rows = Vec::with_capacity(order.len() + 1);
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

        for (index, key) in order.iter().enumerate() {
            let Some(node) = first.get(key) else {
                continue;
            };
            let id = node.id.clone();
            let mut cells = Vec::with_capacity(input.tree.len() + 1);

            let row_header = CellData {
                key: key.clone(),
                row_indexes: vec![index + 1],
                column_indexes: vec![0],
                text: key.clone(),
                node: Some(id.clone()),
                ..CellData::default()
            };
            let handle = TreeHandle {
                node: id.clone(),
                level: node.level,
                has_children: input.visibility.has_children(&id),
                expanded: input.visibility.is_expanded(&id),
            };
            cells.push(Cell::header(
                sized(row_header, width_at(&widths, 0), compensated),
                HeaderCell::new(CellRole::ROW_HEADER).with_tree(handle),
            ));

            for (idx, record) in input.tree.iter().enumerate() {
                let value = record.get(key).map(|n| &n.value);
                let data = CellData {
                    data_index: Some(idx),
                    key: key.clone(),
                    value: value.cloned().unwrap_or_default(),
                    row_indexes: vec![index + 1],
                    column_indexes: vec![idx + 1],
                    is_number: input.is_number(key),
                    text: input.text(key, value, false),
                    node: Some(id.clone()),
                    ..CellData::default()
                };
                cells.push(Cell::normal(sized(
                    data,
                    width_at(&widths, idx + 1),
                    compensated,
                )));
            }

            rows.push(RowPlan {
                visible: input.visibility.is_row_visible(&id),
                node: Some(id),
                cells,
            });
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

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::super::test_support::{run, surface};
    use super::*;
    use crate::cell::CellKind;
    use crate::config::{TableConfig, TableOption};
    use crate::data::{NodeId, TableData, TreeNode};

    fn node(id: &str, pid: &str, level: u32, rank: f64, value: f64) -> TreeNode {
        TreeNode {
            id: NodeId::new(id),
            pid: NodeId::new(pid),
            level,
            rank,
            value: CellValue::Number(value),
        }
    }

    fn record(scale: f64) -> TreeRecord {
        [
            ("child b", node("b", "a", 2, 2.0, 2.0 * scale)),
            ("total", node("a", "root", 1, 1.0, 10.0 * scale)),
            ("child c", node("c", "a", 2, 1.0, 3.0 * scale)),
        ]
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect()
    }

    fn config() -> TableConfig {
        TableConfig {
            option: TableOption {
                data: TableData::Tree(vec![record(1.0), record(2.0)]),
                columns: vec!["period".into(), "Q1".into(), "Q2".into()],
                ..TableOption::default()
            },
            table_type: LayoutKind::Tree,
            ..TableConfig::default()
        }
    }

    #[test]
    fn test_rows_follow_rank_order() {
        let plan = run(&TreeLayout, &config(), &surface());
        let keys: Vec<&str> = plan.rows[1..]
            .iter()
            .map(|r| r.cells[0].data.key.as_str())
            .collect();
        assert_eq!(keys, vec!["total", "child c", "child b"]);
        assert_eq!(plan.rows[1].node, Some(NodeId::new("a")));
        assert!(plan.rows.iter().all(|r| r.visible));
    }

    #[test]
    fn test_row_headers_carry_tree_handles() {
        let plan = run(&TreeLayout, &config(), &surface());
        let CellKind::Header(parent) = plan.rows[1].cells[0].kind() else {
            panic!("row header expected");
        };
        assert!(parent.tree().unwrap().has_children);
        let CellKind::Header(leaf) = plan.rows[2].cells[0].kind() else {
            panic!("row header expected");
        };
        assert!(!leaf.tree().unwrap().has_children);
        assert_eq!(plan.rows[1].cells[2].data.text, "20");
    }

    #[test]
    fn test_indent_widens_row_header_column() {
        let plan = run(&TreeLayout, &config(), &surface());
        // "child c": 70px text, 28px padding, two levels of icon.
        assert_eq!(plan.widths[0], 70.0 + 28.0 + 32.0);
    }

    #[test]
    fn test_configured_rows_filter_the_tree() {
        let mut config = config();
        config.option.rows = vec!["child b".into(), "total".into()];
        let plan = run(&TreeLayout, &config, &surface());
        let keys: Vec<&str> = plan.rows[1..]
            .iter()
            .map(|r| r.cells[0].data.key.as_str())
            .collect();
        assert_eq!(keys, vec!["total", "child b"]);
    }

    #[test]
    fn test_empty_tree() {
        let mut config = config();
        config.option.data = TableData::Tree(Vec::new());
        assert!(run(&TreeLayout, &config, &surface()).rows.is_empty());
    }
}
