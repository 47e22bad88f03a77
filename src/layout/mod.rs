//! Grid layout strategies.
//!
//! Each table variant is a [`TableLayout`]: it resolves column widths from
//! measured text, builds the grid of cells for one layout pass, and decides
//! which cells light up together. The table orchestrator only talks to this
//! trait, so variants are picked from configuration instead of subclassing.

pub mod metrics;
pub mod widths;

mod horizontal;
mod multi_x;
mod multi_y;
mod tree;
mod vertical;

pub use horizontal::HorizontalLayout;
pub use metrics::TextMeter;
pub use multi_x::MultiXLayout;
pub use multi_y::MultiYLayout;
pub use tree::TreeLayout;
pub use vertical::VerticalLayout;
pub use widths::{find_max_at_indices, natural_width, WidthBudget};

use crate::cell::{Cell, CellData, CellRole, HeaderCell};
use crate::config::{LayoutKind, TableConfig};
use crate::data::{CellValue, NodeId, Record, TreeRecord, TreeVisibility};
use crate::error::Result;
use crate::sort::SortState;
use crate::surface::Surface;
use crate::table::events::{SelectedDatum, SelectedType, Selection};

/// Everything a layout pass reads.
pub struct LayoutInput<'a> {
    pub config: &'a TableConfig,
    /// Flat records to lay out: the current page for paginated variants,
    /// the whole (sorted) dataset otherwise.
    pub records: &'a [Record],
    /// Tree records, for the tree variant.
    pub tree: &'a [TreeRecord],
    /// Absolute index of `records[0]` in the dataset.
    pub data_offset: usize,
    pub sort: &'a SortState,
    pub visibility: &'a TreeVisibility,
    pub budget: WidthBudget,
    pub surface: &'a dyn Surface,
}

impl LayoutInput<'_> {
    /// Viewport width of the table.
    pub fn width(&self) -> f64 {
        self.config.table_style.width
    }

    pub fn is_number(&self, key: &str) -> bool {
        self.config.option.meta(key).is_some_and(|m| m.is_number())
    }

    /// Display text of a raw value, see [`crate::data::display_text`].
    pub fn text(&self, key: &str, value: Option<&CellValue>, show_unit: bool) -> String {
        crate::data::display_text(
            key,
            value,
            show_unit,
            &self.config.option.data_meta_info,
            &self.config.format_data,
        )
    }
}

/// One visual row of a plan.
#[derive(Debug, Clone)]
pub struct RowPlan {
    /// Tree node the row represents.
    pub node: Option<NodeId>,
    pub visible: bool,
    pub cells: Vec<Cell>,
}

impl RowPlan {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            node: None,
            visible: true,
            cells,
        }
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone, Default)]
pub struct GridPlan {
    /// Resolved width of every visual column.
    pub widths: Vec<f64>,
    /// Natural width sum before compensation.
    pub natural_sum: f64,
    pub rows: Vec<RowPlan>,
}

impl GridPlan {
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }
}

/// A table variant.
pub trait TableLayout {
    fn kind(&self) -> LayoutKind;

    /// Resolve widths and build the grid for one pass.
    fn build(&self, input: &LayoutInput<'_>, meter: &mut TextMeter) -> Result<GridPlan>;

    /// Indices of the cells highlighted together with `origin`.
    fn linked_cells(&self, cells: &[Cell], origin: usize) -> Vec<usize>;

    /// Whether records are split into pages.
    fn paginates(&self) -> bool {
        false
    }

    /// Sortable `(key, is_date)` columns.
    fn sort_columns(&self, _config: &TableConfig) -> Vec<(String, bool)> {
        Vec::new()
    }

    /// Whether a header selection draws the bounding overlay.
    fn shows_overlay(&self) -> bool {
        true
    }

    /// Whether selecting a header with `role` selects a key rather than a value.
    fn selects_key(&self, role: CellRole) -> bool;

    /// Payload of a selection made from `origin`. `None` for the corner.
    fn selection(&self, origin: &Cell, linked: &[&Cell]) -> Option<Selection> {
        let role = origin.role();
        if role.is_corner() {
            return None;
        }
        let selected_type = if role.is_header && self.selects_key(role) {
            SelectedType::Key
        } else {
            SelectedType::Value
        };
        let selected_value = match selected_type {
            SelectedType::Key => CellValue::Text(origin.data.key.clone()),
            SelectedType::Value if origin.data.is_number => {
                CellValue::Text(origin.data.text.clone())
            }
            SelectedType::Value => origin.data.value.clone(),
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

impl LayoutKind {
    /// The strategy rendering this variant.
    pub fn strategy(self) -> Box<dyn TableLayout> {
        match self {
            Self::Horizontal => Box::new(HorizontalLayout),
            Self::Vertical => Box::new(VerticalLayout),
            Self::MultiX => Box::new(MultiXLayout),
            Self::MultiY => Box::new(MultiYLayout),
            Self::Tree => Box::new(TreeLayout),
        }
    }
}

/// Cell box widths: the resolved width, capped at the natural maximum unless
/// compensation stretched the grid.
pub(crate) fn sized(mut data: CellData, width: f64, compensated: bool) -> CellData {
    data.width = width;
    data.max_width = if compensated {
        width
    } else {
        metrics::MAX_COL_WIDTH
    };
    data
}

/// Build a header cell with the sort affordance when `key` is sortable.
pub(crate) fn header_cell(data: CellData, role: CellRole, sort: Option<&SortState>) -> Cell {
    let mut header = HeaderCell::new(role);
    if let Some(sort) = sort.filter(|s| !role.is_corner() && s.is_sortable(&data.key)) {
        header = header.with_sorting(sort.sort_type(&data.key));
    }
    Cell::header(data, header)
}

/// Width at `index`, falling back to the column cap for short width lists.
pub(crate) fn width_at(widths: &[f64], index: usize) -> f64 {
    widths.get(index).copied().unwrap_or(metrics::MAX_COL_WIDTH)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{FieldMeta, TableOption};
    use crate::data::TableData;
    use crate::surface::HeadlessSurface;

    /// Surface measuring 10px per character at any font size.
    pub fn surface() -> HeadlessSurface {
        HeadlessSurface::new().with_measure(|text, _| text.chars().count() as f64 * 10.0)
    }

    pub fn flat_config(
        kind: LayoutKind,
        records: Vec<Record>,
        rows: &[&str],
        columns: &[&str],
    ) -> TableConfig {
        let mut config = TableConfig {
            option: TableOption {
                data: TableData::Flat(records),
                rows: rows.iter().map(|s| (*s).to_string()).collect(),
                columns: columns.iter().map(|s| (*s).to_string()).collect(),
                ..TableOption::default()
            },
            table_type: kind,
            ..TableConfig::default()
        };
        config
            .option
            .data_meta_info
            .insert("sales".into(), FieldMeta::number(None));
        config
    }

    pub fn record(pairs: &[(&str, CellValue)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    pub fn run(
        layout: &dyn TableLayout,
        config: &TableConfig,
        surface: &HeadlessSurface,
    ) -> GridPlan {
        let records = config.option.data.flat().unwrap_or_default();
        let tree = config.option.data.tree().unwrap_or_default();
        let sort = SortState::new(layout.sort_columns(config));
        let visibility = TreeVisibility::new(tree);
        let input = LayoutInput {
            config,
            records,
            tree,
            data_offset: 0,
            sort: &sort,
            visibility: &visibility,
            budget: WidthBudget::new(config.table_style.width),
            surface,
        };
        match layout.build(&input, &mut TextMeter::new()) {
            Ok(plan) => plan,
            Err(e) => panic!("layout failed: {e}"),
        }
    }

    pub fn all_cells(plan: &GridPlan) -> Vec<Cell> {
        plan.rows
            .iter()
            .flat_map(|r| r.cells.iter().cloned())
            .collect()
    }
}
