//! Body cells and the expand affordance for clamped text.

use super::{classes, CellAction, CellCapability, CellData, CellRole, CellState};
use crate::layout::metrics::{LINE_CLAMP, MIN_BODY_CELL_HEIGHT};
use crate::surface::{BoxSize, ElementId, ElementKind, Surface};

pub const EXPAND_LABEL: &str = "查看全部";
pub const COLLAPSE_LABEL: &str = "折叠内容";

/// A body cell.
#[derive(Debug, Clone, Default)]
pub struct NormalCell {
    cell: Option<ElementId>,
    text: Option<ElementId>,
    expand: Option<ElementId>,
    expand_icon: Option<ElementId>,
    expanded: bool,
}

impl NormalCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn expand_element(&self) -> Option<ElementId> {
        self.expand
    }

    /// Add the expand affordance when the text is clamped.
    ///
    /// Returns the affordance only when it was created by this call.
    pub fn enable_expand(&mut self, surface: &dyn Surface) -> Option<ElementId> {
        if self.expand.is_some() {
            return None;
        }
        let (cell, text) = (self.cell?, self.text?);
        if !surface.text_overflows(text) {
            return None;
        }
        let container = surface.create_element(cell, ElementKind::Icon, classes::EXPAND_CONTAINER);
        surface.set_text(container, EXPAND_LABEL);
        let icon = surface.create_element(container, ElementKind::Icon, classes::EXPAND_ICON);
        self.expand = Some(container);
        self.expand_icon = Some(icon);
        Some(container)
    }
}

impl CellCapability for NormalCell {
    fn role(&self) -> CellRole {
        CellRole::BODY
    }

    fn mount(&mut self, surface: &dyn Surface, parent: ElementId, data: &CellData) -> ElementId {
        let mut class = format!(
            "{} {} {}",
            classes::MAIN_CELL,
            classes::NORMAL_CELL,
            classes::CURSOR_POINTER
        );
        if data.is_number {
            class.push(' ');
            class.push_str(classes::NUMBER_CELL);
        }
        let cell = surface.create_element(parent, ElementKind::Cell, &class);
        surface.set_size(
            cell,
            BoxSize {
                width: Some(data.width),
                max_width: (data.max_width > 0.0).then_some(data.max_width),
                min_height: Some(MIN_BODY_CELL_HEIGHT),
                max_height: None,
            },
        );
        let text = surface.create_element(cell, ElementKind::Text, classes::CELL_TEXT);
        surface.set_text(text, &data.text);
        if let Some(color) = &data.color {
            surface.set_style(text, "color", color);
        }
        *self = Self {
            cell: Some(cell),
            text: Some(text),
            ..Self::default()
        };
        cell
    }

    fn refresh(&self, surface: &dyn Surface, state: CellState) {
        let Some(cell) = self.cell else {
            return;
        };
        let hovered = state.hovered && !state.selected;
        surface.toggle_class(cell, classes::NORMAL_HOVER, hovered);
        surface.toggle_class(cell, classes::SELECT_BORDER, state.focused);
    }

    fn affordances(&self) -> Vec<ElementId> {
        self.expand.into_iter().collect()
    }

    fn activate(
        &mut self,
        surface: &dyn Surface,
        element: ElementId,
        _data: &CellData,
    ) -> Option<CellAction> {
        if self.expand != Some(element) {
            return None;
        }
        self.expanded = !self.expanded;
        let expanded = self.expanded;
        surface.toggle_class(element, classes::EXPAND_CONTAINER_CLOSE, expanded);
        let label = if expanded {
            COLLAPSE_LABEL
        } else {
            EXPAND_LABEL
        };
        surface.set_text(element, label);
        if let Some(icon) = self.expand_icon {
            surface.toggle_class(icon, classes::EXPAND_ICON_CLOSE, expanded);
        }
        if let Some(cell) = self.cell {
            surface.toggle_class(cell, classes::FLEX_END, expanded);
        }
        if let Some(text) = self.text {
            let clamp = if expanded {
                "unset".to_string()
            } else {
                LINE_CLAMP.to_string()
            };
            surface.set_style(text, "-webkit-line-clamp", &clamp);
        }
        Some(CellAction::Expand { expanded })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    fn mounted(surface: &HeadlessSurface, text: &str, width: f64) -> (NormalCell, ElementId) {
        let row = surface.create_element(surface.root(), ElementKind::Row, "");
        let mut cell = NormalCell::new();
        let data = CellData {
            text: text.into(),
            width,
            is_number: true,
            ..CellData::default()
        };
        let el = cell.mount(surface, row, &data);
        (cell, el)
    }

    #[test]
    fn test_mount_classes_and_text() {
        let s = HeadlessSurface::new();
        let (_, el) = mounted(&s, "12", 80.0);
        assert!(s.has_class(el, classes::NUMBER_CELL));
        assert_eq!(s.text(s.children(el)[0]), "12");
    }

    #[test]
    fn test_short_text_gets_no_affordance() {
        let s = HeadlessSurface::new();
        let (mut cell, _) = mounted(&s, "short", 200.0);
        assert_eq!(cell.enable_expand(&s), None);
        assert!(cell.affordances().is_empty());
    }

    #[test]
    fn test_expand_toggles_label() {
        let s = HeadlessSurface::new().with_measure(|text, _| text.len() as f64 * 10.0);
        let (mut cell, el) = mounted(&s, &"x".repeat(50), 34.0);
        let expand = cell.enable_expand(&s).unwrap();
        assert_eq!(cell.enable_expand(&s), None);
        assert_eq!(s.text(expand), EXPAND_LABEL);

        let action = cell.activate(&s, expand, &CellData::default());
        assert_eq!(action, Some(CellAction::Expand { expanded: true }));
        assert_eq!(s.text(expand), COLLAPSE_LABEL);
        assert!(s.has_class(el, classes::FLEX_END));

        cell.activate(&s, expand, &CellData::default());
        assert!(!cell.is_expanded());
        assert!(!s.has_class(el, classes::FLEX_END));
    }
}
