//! Pointer interaction: hover, selection, affordances and outside clicks.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use super::events::TableEvent;
use super::TableState;
use crate::cell::{Cell, CellAction};
use crate::data::NodeId;
use crate::overlay::{bounding_box, relative_to};
use crate::pagination::{PageAction, PageItem, Pagination};
use crate::surface::{ElementId, SurfaceEvent};

/// What a bound listener does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Interaction {
    Enter(usize),
    Leave(usize),
    Select(usize),
    /// Click on a sort icon, tree toggle or expand control of a cell.
    Affordance { cell: usize, element: ElementId },
    Page(PageAction, PageItem),
    /// Document-level click.
    Outside,
}

/// Route a surface event into the table behind `weak`.
///
/// Host listeners run after the table's state is released, so they may call
/// back into the table.
pub(super) fn dispatch(
    weak: &Weak<RefCell<TableState>>,
    generation: Option<u64>,
    action: Interaction,
    event: &mut SurfaceEvent,
) {
    let Some(state) = weak.upgrade() else {
        return;
    };
    let (emitted, listeners) = {
        let Ok(mut s) = state.try_borrow_mut() else {
            log::warn!("dropping re-entrant {action:?}");
            return;
        };
        if s.destroyed || generation.is_some_and(|g| g != s.generation) {
            return;
        }
        let emitted = s.handle(action, event);
        (emitted, s.listeners.clone())
    };
    for event in &emitted {
        for listener in &listeners {
            listener(event);
        }
    }
}

/// Frame callback scheduled after a layout pass.
pub(super) fn after_paint(weak: &Weak<RefCell<TableState>>, generation: u64) {
    let Some(state) = weak.upgrade() else {
        return;
    };
    let Ok(mut s) = state.try_borrow_mut() else {
        return;
    };
    if s.destroyed || s.generation != generation {
        return;
    }
    s.after_paint();
}

impl TableState {
    fn handle(&mut self, action: Interaction, event: &mut SurfaceEvent) -> Vec<TableEvent> {
        match action {
            Interaction::Enter(index) => {
                self.enter(index);
                Vec::new()
            }
            Interaction::Leave(index) => {
                self.leave(index);
                Vec::new()
            }
            Interaction::Select(index) => self.select(index).into_iter().collect(),
            Interaction::Affordance { cell, element } => {
                event.stop_propagation();
                self.activate(cell, element).into_iter().collect()
            }
            Interaction::Page(action, item) => self.change_page(action, item).into_iter().collect(),
            Interaction::Outside => {
                let inside = event
                    .target
                    .is_some_and(|t| self.surface.contains(self.elements.root, t));
                if !inside {
                    self.clear_selection();
                }
                Vec::new()
            }
        }
    }

    /// Visible cells linked to `origin`.
    fn resolve_linked(&self, origin: usize) -> Vec<usize> {
        let linked: Vec<usize> = self
            .layout
            .linked_cells(&self.cells, origin)
            .into_iter()
            .filter(|i| self.cells.get(*i).is_some_and(Cell::is_visible))
            .collect();
        log::trace!("cell {origin} links {} cells", linked.len());
        linked
    }

    fn enter(&mut self, index: usize) {
        let linked = self.resolve_linked(index);
        let surface = Rc::clone(&self.surface);
        for i in &linked {
            if let Some(cell) = self.cells.get_mut(*i) {
                cell.hover(surface.as_ref(), true);
            }
        }
        if let Some(cell) = self.cells.get_mut(index) {
            cell.set_pointer_over(surface.as_ref(), true);
        }
        self.linked = linked;
        self.linked_origin = Some(index);
    }

    fn leave(&mut self, index: usize) {
        let surface = Rc::clone(&self.surface);
        for i in self.linked.iter().chain(&self.last_selected) {
            if let Some(cell) = self.cells.get_mut(*i) {
                cell.hover(surface.as_ref(), false);
            }
        }
        if let Some(cell) = self.cells.get_mut(index) {
            cell.set_pointer_over(surface.as_ref(), false);
        }
    }

    /// Commit a selection made from `index`.
    fn select(&mut self, index: usize) -> Option<TableEvent> {
        let role = self.cells.get(index)?.role();
        if role.is_corner() {
            return None;
        }
        let surface = Rc::clone(&self.surface);

        self.context.with_overlay(|o| o.hide(surface.as_ref()));
        for i in std::mem::take(&mut self.last_selected) {
            if let Some(cell) = self.cells.get_mut(i) {
                cell.clear(surface.as_ref());
            }
        }

        if self.linked_origin != Some(index) {
            self.linked = self.resolve_linked(index);
            self.linked_origin = Some(index);
        }
        for i in &self.linked {
            if let Some(cell) = self.cells.get_mut(*i) {
                cell.hover(surface.as_ref(), true);
                cell.select(surface.as_ref(), true);
            }
        }
        if let Some(cell) = self.cells.get_mut(index) {
            cell.set_focused(surface.as_ref(), true);
        }

        if role.is_header && self.layout.shows_overlay() {
            let rects: Vec<_> = self
                .linked
                .iter()
                .filter_map(|i| self.cells.get(*i))
                .map(|c| c.rendered_rect(surface.as_ref()))
                .collect();
            if let Some(rect) = bounding_box(&rects) {
                let scroll = self.elements.scroll;
                let rect = relative_to(
                    rect,
                    surface.bounding_rect(scroll),
                    surface.scroll_offset(scroll),
                );
                self.context
                    .with_overlay(|o| o.show(surface.as_ref(), self.id, scroll, rect));
            }
        }
        self.last_selected = self.linked.clone();

        let origin = self.cells.get(index)?;
        let linked: Vec<&Cell> = self
            .last_selected
            .iter()
            .filter_map(|i| self.cells.get(*i))
            .collect();
        self.layout
            .selection(origin, &linked)
            .map(TableEvent::CellSelected)
    }

    /// Drop the current selection, e.g. after a click outside the table.
    fn clear_selection(&mut self) {
        let surface = Rc::clone(&self.surface);
        self.context
            .with_overlay(|o| o.hide_for(surface.as_ref(), self.id));
        for i in std::mem::take(&mut self.last_selected) {
            if let Some(cell) = self.cells.get_mut(i) {
                cell.clear(surface.as_ref());
            }
        }
    }

    fn activate(&mut self, index: usize, element: ElementId) -> Option<TableEvent> {
        let surface = Rc::clone(&self.surface);
        let action = self
            .cells
            .get_mut(index)?
            .activate(surface.as_ref(), element)?;
        match action {
            CellAction::Sort { key } => {
                self.sort.advance(&key)?;
                self.data = self.sort.apply(&self.pristine);
                if let Err(e) = self.update() {
                    log::error!("relayout after sorting {key} failed: {e}");
                }
                None
            }
            CellAction::Tree { node, expanded } => {
                self.toggle_tree(&node, expanded);
                Some(TableEvent::TreeSelected {
                    id: node.as_str().to_string(),
                })
            }
            CellAction::Expand { expanded } => Some(TableEvent::CellExpand {
                is_expand: expanded,
            }),
        }
    }

    /// Show or hide exactly the rows under `node` whose state follows it.
    fn toggle_tree(&mut self, node: &NodeId, expanded: bool) {
        let affected: HashSet<NodeId> =
            self.visibility.toggle(node, expanded).into_iter().collect();
        let surface = Rc::clone(&self.surface);
        for id in &affected {
            let Some(row) = self.row_of_node.get(id).and_then(|r| self.rows.get_mut(*r)) else {
                continue;
            };
            let visible = self.visibility.is_row_visible(id);
            if row.visible == visible {
                continue;
            }
            row.visible = visible;
            surface.set_visible(row.element, visible);
            if let Some(cells) = self.cells.get_mut(row.cells.clone()) {
                for cell in cells {
                    cell.set_visible(visible);
                }
            }
        }
    }

    fn change_page(&mut self, action: PageAction, item: PageItem) -> Option<TableEvent> {
        let page = self
            .pagination
            .as_mut()
            .and_then(|p: &mut Pagination| p.navigate(action, item))?;
        log::debug!("page {page} via {action:?}");
        if let Err(e) = self.update() {
            log::error!("relayout for page {page} failed: {e}");
        }
        Some(TableEvent::PageChanged { page })
    }
}
