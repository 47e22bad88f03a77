//! Serializable view of a mounted table.

use serde::Serialize;

use super::TableState;
use crate::cell::{Cell, CellKind};
use crate::config::LayoutKind;
use crate::pagination::PageItem;
use crate::sort::SortType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSnapshot {
    pub key: String,
    pub text: String,
    pub width: f64,
    pub data_index: Option<usize>,
    pub is_header: bool,
    pub hovered: bool,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortType>,
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        let sort = match cell.kind() {
            CellKind::Header(header) => header.sort_type(),
            CellKind::Normal(_) => None,
        };
        Self {
            key: cell.data.key.clone(),
            text: cell.data.text.clone(),
            width: cell.data.width,
            data_index: cell.data.data_index,
            is_header: cell.is_header(),
            hovered: cell.is_hovered(),
            selected: cell.is_selected(),
            sort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSnapshot {
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub current_page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub items: Vec<PageItem>,
}

/// Widths, rows and navigation state after the latest layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub table_type: LayoutKind,
    pub widths: Vec<f64>,
    pub rows: Vec<RowSnapshot>,
    pub pagination: Option<PageSnapshot>,
    pub sort_key: Option<String>,
    pub is_y_overflow: bool,
    pub layout_passes: usize,
}

impl TableSnapshot {
    pub(super) fn capture(state: &TableState) -> Self {
        let rows = state
            .rows
            .iter()
            .map(|row| RowSnapshot {
                visible: row.visible,
                node: row.node.as_ref().map(|n| n.as_str().to_string()),
                cells: state
                    .cells
                    .get(row.cells.clone())
                    .unwrap_or_default()
                    .iter()
                    .map(CellSnapshot::from)
                    .collect(),
            })
            .collect();
        Self {
            table_type: state.layout.kind(),
            widths: state.widths.clone(),
            rows,
            pagination: state.pagination.map(|p| PageSnapshot {
                current_page: p.current_page(),
                page_size: p.page_size(),
                total_count: p.total_count(),
                total_pages: p.total_pages(),
                items: p.items(),
            }),
            sort_key: state.sort.sort_key().map(str::to_string),
            is_y_overflow: state.is_y_overflow,
            layout_passes: state.passes,
        }
    }

    /// Texts of the visible rows, for quick comparisons.
    pub fn visible_texts(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .filter(|r| r.visible)
            .map(|r| r.cells.iter().map(|c| c.text.as_str()).collect())
            .collect()
    }
}
