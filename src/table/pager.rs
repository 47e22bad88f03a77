//! Pagination bar.

use super::interaction::Interaction;
use super::TableState;
use crate::pagination::{PageAction, PageItem};
use crate::surface::{ElementKind, EventKind, EventTarget};

pub(super) const WRAPPER: &str = "pagination-wrapper";
const BUTTON: &str = "button";
const CURRENT_PAGE: &str = "current-page";
const LEFT_PAGE: &str = "left-page";
const RIGHT_PAGE: &str = "right-page";
const PREV_BUTTON: &str = "prev-button";
const PREV_DISABLED: &str = "prev-button-disabled";
const NEXT_BUTTON: &str = "next-button";
const NEXT_DISABLED: &str = "next-button-disabled";

impl TableState {
    /// Rebuild the buttons for the current page. The bar stays hidden when
    /// everything fits on one page.
    pub(super) fn render_pager(&mut self) {
        let pager = self.elements.pager;
        let Some(pagination) = self.pagination.filter(|p| p.is_needed()) else {
            self.surface.set_visible(pager, false);
            return;
        };
        self.surface.set_visible(pager, true);

        let current = pagination.current_page();
        let total = pagination.total_pages();
        let mut buttons = Vec::new();

        let prev = if current == 1 {
            format!("{PREV_BUTTON} {PREV_DISABLED}")
        } else {
            format!("{PREV_BUTTON} {BUTTON}")
        };
        buttons.push((prev, String::new(), PageAction::Prev, PageItem::Page(current)));

        for item in pagination.items() {
            let (class, text) = match item {
                PageItem::Page(page) if page == current => (CURRENT_PAGE, page.to_string()),
                PageItem::Page(page) => (BUTTON, page.to_string()),
                PageItem::JumpBack => (LEFT_PAGE, String::new()),
                PageItem::JumpForward => (RIGHT_PAGE, String::new()),
            };
            buttons.push((class.to_string(), text, PageAction::Click, item));
        }

        let next = if current == total {
            format!("{NEXT_BUTTON} {NEXT_DISABLED}")
        } else {
            format!("{NEXT_BUTTON} {BUTTON}")
        };
        buttons.push((next, String::new(), PageAction::Next, PageItem::Page(current)));

        let generation = Some(self.generation);
        for (class, text, action, item) in buttons {
            let button = self
                .surface
                .create_element(pager, ElementKind::Button, &class);
            if !text.is_empty() {
                self.surface.set_text(button, &text);
            }
            let listener = self.listen(
                EventTarget::Element(button),
                EventKind::Click,
                generation,
                Interaction::Page(action, item),
            );
            self.bound.push(listener);
            self.pager_buttons.push(button);
        }
    }
}
