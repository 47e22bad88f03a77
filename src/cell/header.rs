//! Header cells: column, row and corner headers.

use super::{classes, CellAction, CellCapability, CellData, CellRole, CellState};
use crate::data::NodeId;
use crate::layout::metrics::MIN_BODY_CELL_HEIGHT;
use crate::sort::SortType;
use crate::surface::{BoxSize, ElementId, ElementKind, Surface};

/// Spaces of indent per tree level.
const INDENT_PER_LEVEL: usize = 3;
const NBSP: char = '\u{a0}';

/// Tree row header state.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeHandle {
    pub node: NodeId,
    pub level: u32,
    pub has_children: bool,
    pub expanded: bool,
}

impl TreeHandle {
    /// Indent in spaces; a toggle icon takes the place of one level.
    fn indent(&self) -> usize {
        let level = usize::try_from(self.level).unwrap_or_default();
        if self.has_children {
            level.saturating_sub(1) * INDENT_PER_LEVEL
        } else {
            level * INDENT_PER_LEVEL
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Elements {
    cell: Option<ElementId>,
    sort: Option<ElementId>,
    up: Option<ElementId>,
    down: Option<ElementId>,
    tree_icon: Option<ElementId>,
}

/// A header cell, optionally with a sort icon or a tree toggle.
#[derive(Debug, Clone)]
pub struct HeaderCell {
    role: CellRole,
    sort: Option<SortType>,
    tree: Option<TreeHandle>,
    elements: Elements,
}

impl HeaderCell {
    pub fn new(role: CellRole) -> Self {
        Self {
            role,
            sort: None,
            tree: None,
            elements: Elements::default(),
        }
    }

    /// Show a sort icon reflecting `sort`.
    #[must_use]
    pub fn with_sorting(mut self, sort: SortType) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn with_tree(mut self, tree: TreeHandle) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn sort_type(&self) -> Option<SortType> {
        self.sort
    }

    pub fn tree(&self) -> Option<&TreeHandle> {
        self.tree.as_ref()
    }

    /// The sort icon container, when sorting is enabled and mounted.
    pub fn sort_element(&self) -> Option<ElementId> {
        self.elements.sort
    }

    pub fn tree_element(&self) -> Option<ElementId> {
        self.elements.tree_icon
    }

    fn refresh_sort(&self, surface: &dyn Surface, state: CellState) {
        let (Some(container), Some(sort)) = (self.elements.sort, self.sort) else {
            return;
        };
        let active = state.hovered || state.pointer_over;
        let shown = active || state.selected || sort != SortType::Original;
        let hover = active && !state.selected;
        let idle = !active && !state.selected;
        surface.toggle_class(container, classes::ICON_CONTAINER, idle);
        surface.toggle_class(container, classes::ICON_CONTAINER_HOVER, hover);
        surface.toggle_class(container, classes::ICON_CONTAINER_SELECTED, state.selected);
        surface.toggle_class(container, classes::SHOW_ICON, shown);
        surface.toggle_class(container, classes::HIDE_ICON, !shown);
        if let Some(up) = self.elements.up {
            let enabled = sort == SortType::Ascending;
            surface.toggle_class(up, classes::UP_SORT_ENABLE, enabled);
        }
        if let Some(down) = self.elements.down {
            let enabled = sort == SortType::Descending;
            surface.toggle_class(down, classes::DOWN_SORT_ENABLE, enabled);
        }
    }

    fn class_list(&self, data: &CellData) -> String {
        let role = self.role;
        let mut list = vec![classes::MAIN_CELL, classes::HEADER_CELL];
        if role.is_column_header || role.heads_column() {
            list.push(classes::COLUMN_HEADER);
        }
        if role.heads_row() {
            list.push(classes::ROW_HEADER);
        }
        if role.is_corner() {
            list.push(classes::CORNER_CELL);
        } else {
            list.push(classes::CURSOR_POINTER);
        }
        if data.is_number {
            list.push(classes::NUMBER_CELL);
        }
        list.join(" ")
    }
}

impl CellCapability for HeaderCell {
    fn role(&self) -> CellRole {
        self.role
    }

    fn mount(&mut self, surface: &dyn Surface, parent: ElementId, data: &CellData) -> ElementId {
        let cell = surface.create_element(parent, ElementKind::Cell, &self.class_list(data));
        surface.set_size(
            cell,
            BoxSize {
                width: Some(data.width),
                max_width: (data.max_width > 0.0).then_some(data.max_width),
                min_height: Some(MIN_BODY_CELL_HEIGHT),
                max_height: None,
            },
        );
        let mut elements = Elements {
            cell: Some(cell),
            ..Elements::default()
        };

        if let Some(tree) = &self.tree {
            let indent = surface.create_element(cell, ElementKind::Text, classes::TREE_INDENT);
            surface.set_text(indent, &NBSP.to_string().repeat(tree.indent()));
            if tree.has_children {
                let icon = surface.create_element(cell, ElementKind::Icon, classes::TREE_ICON);
                surface.toggle_class(icon, classes::TREE_ICON_COLLAPSED, !tree.expanded);
                elements.tree_icon = Some(icon);
            }
        }

        let text = surface.create_element(cell, ElementKind::Text, classes::CELL_TEXT);
        surface.set_text(text, &data.text);
        if let Some(color) = &data.color {
            surface.set_style(text, "color", color);
        }

        if self.sort.is_some() {
            let container = surface.create_element(
                cell,
                ElementKind::Icon,
                &format!("{} {}", classes::ICON_CONTAINER, classes::HIDE_ICON),
            );
            elements.up =
                Some(surface.create_element(container, ElementKind::Icon, classes::UP_SORT));
            elements.down =
                Some(surface.create_element(container, ElementKind::Icon, classes::DOWN_SORT));
            elements.sort = Some(container);
        }

        self.elements = elements;
        cell
    }

    fn refresh(&self, surface: &dyn Surface, state: CellState) {
        let Some(cell) = self.elements.cell else {
            return;
        };
        let role = self.role;
        let active = state.hovered || state.pointer_over;
        surface.toggle_class(cell, classes::HEADER_HOVER, active && !state.selected);
        surface.toggle_class(cell, classes::HEADER_SELECT, state.selected);
        surface.toggle_class(
            cell,
            classes::HEADER_BORDER_BOTTOM,
            state.selected && role.is_column_header,
        );
        surface.toggle_class(
            cell,
            classes::HEADER_BORDER_RIGHT,
            state.selected && role.is_row_header,
        );
        surface.toggle_class(
            cell,
            classes::SELECT_BORDER,
            state.focused && !role.is_row_header && !role.is_column_header,
        );
        self.refresh_sort(surface, state);
    }

    fn affordances(&self) -> Vec<ElementId> {
        self.elements
            .sort
            .into_iter()
            .chain(self.elements.tree_icon)
            .collect()
    }

    fn activate(
        &mut self,
        surface: &dyn Surface,
        element: ElementId,
        data: &CellData,
    ) -> Option<CellAction> {
        if self.elements.sort == Some(element) {
            return Some(CellAction::Sort {
                key: data.key.clone(),
            });
        }
        if self.elements.tree_icon == Some(element) {
            let tree = self.tree.as_mut()?;
            tree.expanded = !tree.expanded;
            surface.toggle_class(element, classes::TREE_ICON_COLLAPSED, !tree.expanded);
            return Some(CellAction::Tree {
                node: tree.node.clone(),
                expanded: tree.expanded,
            });
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    fn data(text: &str) -> CellData {
        CellData {
            key: "sales".into(),
            text: text.into(),
            width: 120.0,
            ..CellData::default()
        }
    }

    fn mount(header: &mut HeaderCell, surface: &HeadlessSurface, data: &CellData) -> ElementId {
        let row = surface.create_element(surface.root(), ElementKind::Row, "");
        header.mount(surface, row, data)
    }

    #[test]
    fn test_column_header_classes() {
        let s = HeadlessSurface::new();
        let mut h = HeaderCell::new(CellRole::COLUMN_HEADER);
        let el = mount(&mut h, &s, &data("Sales"));
        assert!(s.has_class(el, classes::HEADER_CELL));
        assert!(s.has_class(el, classes::COLUMN_HEADER));
        assert!(s.has_class(el, classes::CURSOR_POINTER));

        h.refresh(
            &s,
            CellState {
                selected: true,
                ..CellState::default()
            },
        );
        assert!(s.has_class(el, classes::HEADER_SELECT));
        assert!(s.has_class(el, classes::HEADER_BORDER_BOTTOM));
        assert!(!s.has_class(el, classes::HEADER_BORDER_RIGHT));
    }

    #[test]
    fn test_corner_has_no_pointer() {
        let s = HeadlessSurface::new();
        let mut h = HeaderCell::new(CellRole::CORNER);
        let el = mount(&mut h, &s, &data(""));
        assert!(!s.has_class(el, classes::CURSOR_POINTER));
        assert!(s.has_class(el, classes::CORNER_CELL));
    }

    #[test]
    fn test_sort_icon_visibility() {
        let s = HeadlessSurface::new();
        let mut h = HeaderCell::new(CellRole::HEADER).with_sorting(SortType::Original);
        mount(&mut h, &s, &data("Sales"));
        let icon = h.sort_element().unwrap();
        assert!(s.has_class(icon, classes::HIDE_ICON));

        let hovered = CellState {
            hovered: true,
            ..CellState::default()
        };
        h.refresh(&s, hovered);
        assert!(s.has_class(icon, classes::SHOW_ICON));
        assert!(s.has_class(icon, classes::ICON_CONTAINER_HOVER));

        let mut sorted = HeaderCell::new(CellRole::HEADER).with_sorting(SortType::Descending);
        mount(&mut sorted, &s, &data("Sales"));
        sorted.refresh(&s, CellState::default());
        let icon = sorted.sort_element().unwrap();
        assert!(s.has_class(icon, classes::SHOW_ICON));
        let down = s.children(icon)[1];
        assert!(s.has_class(down, classes::DOWN_SORT_ENABLE));
    }

    #[test]
    fn test_sort_activation_reports_key() {
        let s = HeadlessSurface::new();
        let mut h = HeaderCell::new(CellRole::HEADER).with_sorting(SortType::Original);
        let d = data("Sales");
        mount(&mut h, &s, &d);
        let icon = h.sort_element().unwrap();
        assert_eq!(
            h.activate(&s, icon, &d),
            Some(CellAction::Sort {
                key: "sales".into()
            })
        );
    }

    #[test]
    fn test_tree_toggle() {
        let s = HeadlessSurface::new();
        let mut h = HeaderCell::new(CellRole::ROW_HEADER).with_tree(TreeHandle {
            node: NodeId::new("a"),
            level: 2,
            has_children: true,
            expanded: true,
        });
        let d = data("A");
        let el = mount(&mut h, &s, &d);
        let indent = s.children(el)[0];
        assert_eq!(s.text(indent).chars().count(), 3);

        let icon = h.tree_element().unwrap();
        let action = h.activate(&s, icon, &d);
        assert_eq!(
            action,
            Some(CellAction::Tree {
                node: NodeId::new("a"),
                expanded: false
            })
        );
        assert!(s.has_class(icon, classes::TREE_ICON_COLLAPSED));
        h.activate(&s, icon, &d);
        assert!(!s.has_class(icon, classes::TREE_ICON_COLLAPSED));
    }

    #[test]
    fn test_leaf_indent_covers_icon_slot() {
        let leaf = TreeHandle {
            node: NodeId::new("b"),
            level: 2,
            has_children: false,
            expanded: true,
        };
        assert_eq!(leaf.indent(), 6);
    }
}
