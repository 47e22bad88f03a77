//! Cell primitives.
//!
//! A [`Cell`] pairs the data it shows ([`CellData`]) with one of two closed
//! variants ([`CellKind`]): header cells carry the sort and tree affordances,
//! normal cells carry the expand affordance. Both implement
//! [`CellCapability`], the only interface the table drives them through.

mod header;
mod normal;

pub use header::{HeaderCell, TreeHandle};
pub use normal::NormalCell;

use serde::Serialize;

use crate::data::{CellValue, NodeId};
use crate::surface::{ElementId, Rect, Surface};

/// CSS class names applied by cells.
pub mod classes {
    pub const MAIN_CELL: &str = "main-cell";
    pub const CURSOR_POINTER: &str = "cursor-pointer";
    pub const NUMBER_CELL: &str = "number-cell";
    pub const CELL_TEXT: &str = "cell-text";
    pub const SELECT_BORDER: &str = "select-border";

    pub const HEADER_CELL: &str = "header-cell";
    pub const COLUMN_HEADER: &str = "column-header";
    pub const ROW_HEADER: &str = "row-header";
    pub const CORNER_CELL: &str = "corner-cell";
    pub const HEADER_HOVER: &str = "header-cell-hover";
    pub const HEADER_SELECT: &str = "header-cell-select";
    pub const HEADER_BORDER_BOTTOM: &str = "header-border-bottom-select";
    pub const HEADER_BORDER_RIGHT: &str = "header-border-right-select";

    pub const ICON_CONTAINER: &str = "icon-container";
    pub const ICON_CONTAINER_HOVER: &str = "icon-container-hover";
    pub const ICON_CONTAINER_SELECTED: &str = "icon-container-selected";
    pub const SHOW_ICON: &str = "show-icon";
    pub const HIDE_ICON: &str = "hide-icon";
    pub const UP_SORT: &str = "up-sort";
    pub const DOWN_SORT: &str = "down-sort";
    pub const UP_SORT_ENABLE: &str = "up-sort-enable";
    pub const DOWN_SORT_ENABLE: &str = "down-sort-enable";

    pub const TREE_INDENT: &str = "tree-icon-container";
    pub const TREE_ICON: &str = "tree-icon";
    pub const TREE_ICON_COLLAPSED: &str = "tree-icon-selected";

    pub const NORMAL_CELL: &str = "normal-cell";
    pub const NORMAL_HOVER: &str = "normal-cell-hover";
    pub const EXPAND_CONTAINER: &str = "expand-icon-container";
    pub const EXPAND_CONTAINER_CLOSE: &str = "expand-icon-container-close";
    pub const EXPAND_ICON: &str = "expand-icon";
    pub const EXPAND_ICON_CLOSE: &str = "expand-icon-close";
    pub const FLEX_END: &str = "flex-end";
}

/// Header flags of a cell, fixed by its variant and position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRole {
    pub is_header: bool,
    pub is_row_header: bool,
    pub is_column_header: bool,
}

impl CellRole {
    pub const BODY: Self = Self {
        is_header: false,
        is_row_header: false,
        is_column_header: false,
    };
    /// Header of a key/value pair or of a column without row headers.
    pub const HEADER: Self = Self {
        is_header: true,
        is_row_header: false,
        is_column_header: false,
    };
    pub const COLUMN_HEADER: Self = Self {
        is_header: true,
        is_row_header: false,
        is_column_header: true,
    };
    pub const ROW_HEADER: Self = Self {
        is_header: true,
        is_row_header: true,
        is_column_header: false,
    };
    /// Top-left cell of a two-dimensional table. Never interactive.
    pub const CORNER: Self = Self {
        is_header: true,
        is_row_header: true,
        is_column_header: true,
    };

    pub const fn is_corner(&self) -> bool {
        self.is_header && self.is_row_header && self.is_column_header
    }

    /// Heads a column: any header that is not a row header.
    pub const fn heads_column(&self) -> bool {
        self.is_header && !self.is_row_header
    }

    /// Heads a row: a row header that is not the corner.
    pub const fn heads_row(&self) -> bool {
        self.is_header && self.is_row_header && !self.is_column_header
    }
}

/// Interaction flags of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellState {
    /// Part of the hovered or selected linked set.
    pub hovered: bool,
    pub selected: bool,
    /// Directly under the pointer.
    pub pointer_over: bool,
    /// The cell a selection was made from.
    pub focused: bool,
}

/// Data a cell shows and reports back in selection events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    /// Index of the source record, `None` for header cells.
    pub data_index: Option<usize>,
    pub key: String,
    pub value: CellValue,
    pub row_indexes: Vec<usize>,
    pub column_indexes: Vec<usize>,
    pub is_number: bool,
    /// Transformed display text.
    pub text: String,
    pub width: f64,
    pub max_width: f64,
    pub color: Option<String>,
    /// Tree row the cell belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
}

impl CellData {
    /// Grid row of the cell.
    pub fn row(&self) -> Option<usize> {
        self.row_indexes.first().copied()
    }

    /// Grid column of the cell.
    pub fn column(&self) -> Option<usize> {
        self.column_indexes.first().copied()
    }
}

/// What an affordance click asks the table to do.
#[derive(Debug, Clone, PartialEq)]
pub enum CellAction {
    /// Advance the sort of a column.
    Sort { key: String },
    /// Show or hide the descendants of a tree node.
    Tree { node: NodeId, expanded: bool },
    /// Expand or collapse clamped text.
    Expand { expanded: bool },
}

/// The one interface the table uses to drive a cell variant.
pub trait CellCapability {
    fn role(&self) -> CellRole;

    /// Whether pointer events are bound to the cell at all.
    fn is_interactive(&self) -> bool {
        !self.role().is_corner()
    }

    /// Build the cell's elements under `parent`; returns the cell element.
    fn mount(&mut self, surface: &dyn Surface, parent: ElementId, data: &CellData) -> ElementId;

    /// Reflect `state` in the cell's classes.
    fn refresh(&self, surface: &dyn Surface, state: CellState);

    /// Clickable affordances that handle their own clicks.
    fn affordances(&self) -> Vec<ElementId>;

    /// React to a click on `element`, one of [`Self::affordances`].
    fn activate(&mut self, surface: &dyn Surface, element: ElementId, data: &CellData)
        -> Option<CellAction>;
}

/// Closed set of cell variants.
#[derive(Debug, Clone)]
pub enum CellKind {
    Header(HeaderCell),
    Normal(NormalCell),
}

impl CellCapability for CellKind {
    fn role(&self) -> CellRole {
        match self {
            Self::Header(c) => c.role(),
            Self::Normal(c) => c.role(),
        }
    }

    fn is_interactive(&self) -> bool {
        match self {
            Self::Header(c) => c.is_interactive(),
            Self::Normal(c) => c.is_interactive(),
        }
    }

    fn mount(&mut self, surface: &dyn Surface, parent: ElementId, data: &CellData) -> ElementId {
        match self {
            Self::Header(c) => c.mount(surface, parent, data),
            Self::Normal(c) => c.mount(surface, parent, data),
        }
    }

    fn refresh(&self, surface: &dyn Surface, state: CellState) {
        match self {
            Self::Header(c) => c.refresh(surface, state),
            Self::Normal(c) => c.refresh(surface, state),
        }
    }

    fn affordances(&self) -> Vec<ElementId> {
        match self {
            Self::Header(c) => c.affordances(),
            Self::Normal(c) => c.affordances(),
        }
    }

    fn activate(
        &mut self,
        surface: &dyn Surface,
        element: ElementId,
        data: &CellData,
    ) -> Option<CellAction> {
        match self {
            Self::Header(c) => c.activate(surface, element, data),
            Self::Normal(c) => c.activate(surface, element, data),
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone)]
pub struct Cell {
    pub data: CellData,
    kind: CellKind,
    state: CellState,
    visible: bool,
    element: Option<ElementId>,
}

impl Cell {
    pub fn new(data: CellData, kind: CellKind) -> Self {
        Self {
            data,
            kind,
            state: CellState::default(),
            visible: true,
            element: None,
        }
    }

    pub fn header(data: CellData, header: HeaderCell) -> Self {
        Self::new(data, CellKind::Header(header))
    }

    pub fn normal(data: CellData) -> Self {
        Self::new(data, CellKind::Normal(NormalCell::new()))
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    pub fn role(&self) -> CellRole {
        self.kind.role()
    }

    pub fn is_header(&self) -> bool {
        self.role().is_header
    }

    pub fn is_interactive(&self) -> bool {
        self.kind.is_interactive()
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn is_hovered(&self) -> bool {
        self.state.hovered
    }

    pub fn is_selected(&self) -> bool {
        self.state.selected
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Element of a mounted cell.
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    /// Create the cell's elements under `row`.
    pub fn mount(&mut self, surface: &dyn Surface, row: ElementId) -> ElementId {
        let element = self.kind.mount(surface, row, &self.data);
        self.element = Some(element);
        self.kind.refresh(surface, self.state);
        element
    }

    pub fn hover(&mut self, surface: &dyn Surface, hovered: bool) {
        self.update(surface, |s| s.hovered = hovered);
    }

    pub fn select(&mut self, surface: &dyn Surface, selected: bool) {
        self.update(surface, |s| s.selected = selected);
    }

    pub fn set_pointer_over(&mut self, surface: &dyn Surface, over: bool) {
        self.update(surface, |s| s.pointer_over = over);
    }

    pub fn set_focused(&mut self, surface: &dyn Surface, focused: bool) {
        self.update(surface, |s| s.focused = focused);
    }

    /// Drop hover, selection and focus at once.
    pub fn clear(&mut self, surface: &dyn Surface) {
        self.update(surface, |s| {
            s.hovered = false;
            s.selected = false;
            s.focused = false;
        });
    }

    fn update(&mut self, surface: &dyn Surface, f: impl FnOnce(&mut CellState)) {
        let before = self.state;
        f(&mut self.state);
        if self.state != before {
            self.kind.refresh(surface, self.state);
        }
    }

    /// Rendered rectangle, empty until mounted.
    pub fn rendered_rect(&self, surface: &dyn Surface) -> Rect {
        self.element
            .map(|e| surface.bounding_rect(e))
            .unwrap_or_default()
    }

    pub fn affordances(&self) -> Vec<ElementId> {
        self.kind.affordances()
    }

    pub fn activate(&mut self, surface: &dyn Surface, element: ElementId) -> Option<CellAction> {
        self.kind.activate(surface, element, &self.data)
    }

    /// Add the expand affordance if the text is clamped. Returns the new
    /// affordance element.
    pub fn enable_expand(&mut self, surface: &dyn Surface) -> Option<ElementId> {
        match &mut self.kind {
            CellKind::Normal(normal) => normal.enable_expand(surface),
            CellKind::Header(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::surface::{ElementKind, HeadlessSurface};

    #[test]
    fn test_roles() {
        assert!(CellRole::CORNER.is_corner());
        assert!(!CellRole::CORNER.heads_row());
        assert!(!CellRole::CORNER.heads_column());
        assert!(CellRole::COLUMN_HEADER.heads_column());
        assert!(CellRole::HEADER.heads_column());
        assert!(CellRole::ROW_HEADER.heads_row());
        assert!(!CellRole::BODY.heads_row() && !CellRole::BODY.heads_column());
    }

    #[test]
    fn test_state_changes_refresh_classes() {
        let surface = HeadlessSurface::new();
        let row = surface.create_element(surface.root(), ElementKind::Row, "");
        let mut cell = Cell::normal(CellData {
            key: "a".into(),
            text: "1".into(),
            width: 80.0,
            ..CellData::default()
        });
        let el = cell.mount(&surface, row);
        assert!(surface.has_class(el, classes::NORMAL_CELL));

        cell.hover(&surface, true);
        assert!(surface.has_class(el, classes::NORMAL_HOVER));
        cell.select(&surface, true);
        assert!(!surface.has_class(el, classes::NORMAL_HOVER));
        cell.clear(&surface);
        assert!(!cell.is_selected());
        assert!(!cell.is_hovered());
    }

    #[test]
    fn test_corner_is_not_interactive() {
        let cell = Cell::header(CellData::default(), HeaderCell::new(CellRole::CORNER));
        assert!(!cell.is_interactive());
        let cell = Cell::header(CellData::default(), HeaderCell::new(CellRole::ROW_HEADER));
        assert!(cell.is_interactive());
    }
}
