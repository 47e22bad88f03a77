//! The table orchestrator.
//!
//! A [`Table`] owns one grid on a [`Surface`]: it runs the layout strategy
//! picked by `tableType`, mounts the resulting cells, wires pointer events
//! back into its state and reports user actions to host listeners.
//!
//! Every relayout (first render, sort, page change, overflow correction)
//! tears the grid down and rebuilds it from scratch. Listeners bound to an
//! old grid carry its generation number and are ignored once it is gone.

pub mod events;
mod interaction;
mod pager;
mod snapshot;

pub use events::{
    EventListener, EventType, SelectedDatum, SelectedType, Selection, TableEvent,
};
pub use snapshot::{CellSnapshot, PageSnapshot, RowSnapshot, TableSnapshot};

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::{Rc, Weak};

use interaction::Interaction;

use crate::cell::Cell;
use crate::config::TableConfig;
use crate::data::{NodeId, Record, TreeVisibility};
use crate::error::Result;
use crate::layout::{GridPlan, LayoutInput, TableLayout, TextMeter, WidthBudget};
use crate::overlay::{TableContext, TableId};
use crate::pagination::Pagination;
use crate::sort::{SortState, SortType};
use crate::surface::{
    BoxSize, ElementId, ElementKind, EventKind, EventTarget, FrameId, ListenerId, Surface,
};

/// Class of the table root, the boundary for outside clicks.
pub const MAIN_CONTAINER: &str = "main-container";
const THEME_CONTAINER: &str = "theme-container";
/// Class of the scrolling block holding the rows.
pub const TABLE_CONTAINER: &str = "table-container";
pub const TABLE_ROW: &str = "table-row";

/// Apply `token.<section>` entries as CSS custom properties.
fn apply_theme(surface: &dyn Surface, element: ElementId, vars: Vec<(String, String)>) {
    for (name, value) in vars {
        let property = if name.starts_with("--") {
            name
        } else {
            format!("--{name}")
        };
        surface.set_style(element, &property, &value);
    }
}

#[derive(Debug, Clone, Copy)]
struct Elements {
    root: ElementId,
    scroll: ElementId,
    pager: ElementId,
}

/// A mounted row and the cells it holds.
#[derive(Debug, Clone)]
struct MountedRow {
    element: ElementId,
    node: Option<NodeId>,
    visible: bool,
    cells: Range<usize>,
}

pub(crate) struct TableState {
    id: TableId,
    weak: Weak<RefCell<TableState>>,
    surface: Rc<dyn Surface>,
    context: TableContext,
    config: TableConfig,
    layout: Box<dyn TableLayout>,
    elements: Elements,

    /// Records in host order; never reordered.
    pristine: Vec<Record>,
    /// Records in display order.
    data: Vec<Record>,
    sort: SortState,
    pagination: Option<Pagination>,
    visibility: TreeVisibility,
    meter: TextMeter,

    widths: Vec<f64>,
    cells: Vec<Cell>,
    rows: Vec<MountedRow>,
    row_of_node: HashMap<NodeId, usize>,
    /// Cells lit by the last pointer entry, and the cell that lit them.
    linked: Vec<usize>,
    linked_origin: Option<usize>,
    last_selected: Vec<usize>,

    is_y_overflow: bool,
    passes: usize,
    generation: u64,
    frame: Option<FrameId>,
    /// Listeners bound to the current grid and pager.
    bound: Vec<ListenerId>,
    pager_buttons: Vec<ElementId>,
    document_listener: Option<ListenerId>,
    listeners: Vec<EventListener>,
    destroyed: bool,
}

impl TableState {
    // ------------------------------------------------------------------
    // Layout passes
    // ------------------------------------------------------------------

    /// Rebuild the whole grid.
    fn update(&mut self) -> Result<()> {
        self.teardown_grid();
        self.generation += 1;
        self.passes += 1;

        let plan = self.build_plan()?;
        log::debug!(
            "{:?} layout pass {}: {} columns, {} cells, y-overflow {}",
            self.layout.kind(),
            self.passes,
            plan.widths.len(),
            plan.cell_count(),
            self.is_y_overflow
        );
        self.mount(plan);
        self.render_pager();
        self.bind_cells();
        self.schedule_frame();
        Ok(())
    }

    fn build_plan(&mut self) -> Result<GridPlan> {
        let scrollbar = if self.is_y_overflow {
            self.surface.scrollbar_width()
        } else {
            0.0
        };
        let budget = WidthBudget::new(self.config.table_style.width).with_scrollbar(scrollbar);
        let (records, data_offset) = match &self.pagination {
            Some(pagination) => (
                pagination.slice(&self.data),
                pagination.page_range(self.data.len()).start,
            ),
            None => (self.data.as_slice(), 0),
        };
        let input = LayoutInput {
            config: &self.config,
            records,
            tree: self.config.option.data.tree().unwrap_or_default(),
            data_offset,
            sort: &self.sort,
            visibility: &self.visibility,
            budget,
            surface: self.surface.as_ref(),
        };
        self.layout.build(&input, &mut self.meter)
    }

    fn mount(&mut self, plan: GridPlan) {
        let surface = Rc::clone(&self.surface);
        for row in plan.rows {
            let element =
                surface.create_element(self.elements.scroll, ElementKind::Row, TABLE_ROW);
            let start = self.cells.len();
            for mut cell in row.cells {
                cell.mount(surface.as_ref(), element);
                cell.set_visible(row.visible);
                self.cells.push(cell);
            }
            if !row.visible {
                surface.set_visible(element, false);
            }
            if let Some(node) = &row.node {
                self.row_of_node.insert(node.clone(), self.rows.len());
            }
            self.rows.push(MountedRow {
                element,
                node: row.node,
                visible: row.visible,
                cells: start..self.cells.len(),
            });
        }
        self.widths = plan.widths;
    }

    /// Drop every element, listener and pending frame of the current grid.
    fn teardown_grid(&mut self) {
        let surface = Rc::clone(&self.surface);
        if let Some(frame) = self.frame.take() {
            surface.cancel_frame(frame);
        }
        for listener in self.bound.drain(..) {
            surface.off(listener);
        }
        self.context
            .with_overlay(|o| o.hide_for(surface.as_ref(), self.id));
        for row in self.rows.drain(..) {
            surface.remove_element(row.element);
        }
        for button in self.pager_buttons.drain(..) {
            surface.remove_element(button);
        }
        self.cells.clear();
        self.row_of_node.clear();
        self.linked.clear();
        self.linked_origin = None;
        self.last_selected.clear();
    }

    fn listen(
        &self,
        target: EventTarget,
        kind: EventKind,
        generation: Option<u64>,
        action: Interaction,
    ) -> ListenerId {
        let weak = Weak::clone(&self.weak);
        self.surface.on(
            target,
            kind,
            Box::new(move |event| interaction::dispatch(&weak, generation, action, event)),
        )
    }

    fn bind_cells(&mut self) {
        let generation = Some(self.generation);
        let mut bound = Vec::new();
        for (index, cell) in self.cells.iter().enumerate() {
            let Some(element) = cell.element() else {
                continue;
            };
            if cell.is_interactive() {
                let target = EventTarget::Element(element);
                bound.push(self.listen(
                    target,
                    EventKind::Enter,
                    generation,
                    Interaction::Enter(index),
                ));
                bound.push(self.listen(
                    target,
                    EventKind::Leave,
                    generation,
                    Interaction::Leave(index),
                ));
                bound.push(self.listen(
                    target,
                    EventKind::Click,
                    generation,
                    Interaction::Select(index),
                ));
            }
            for affordance in cell.affordances() {
                bound.push(self.listen(
                    EventTarget::Element(affordance),
                    EventKind::Click,
                    generation,
                    Interaction::Affordance {
                        cell: index,
                        element: affordance,
                    },
                ));
            }
        }
        self.bound.extend(bound);
    }

    fn schedule_frame(&mut self) {
        let weak = Weak::clone(&self.weak);
        let generation = self.generation;
        self.frame = Some(
            self.surface
                .request_frame(Box::new(move || interaction::after_paint(&weak, generation))),
        );
    }

    /// Post-paint checks: overflow correction first, then expand affordances.
    fn after_paint(&mut self) {
        self.frame = None;
        let height = self.surface.scroll_height(self.elements.scroll);
        if height > self.config.table_style.max_height && !self.is_y_overflow {
            // The scrollbar width is a device constant, so this second pass
            // settles the widths for good.
            self.is_y_overflow = true;
            log::debug!(
                "content height {height} exceeds {}, relayout without scrollbar width",
                self.config.table_style.max_height
            );
            if let Err(e) = self.update() {
                log::error!("overflow relayout failed: {e}");
            }
            return;
        }
        self.enable_expands();
    }

    fn enable_expands(&mut self) {
        let surface = Rc::clone(&self.surface);
        let added: Vec<(usize, ElementId)> = self
            .cells
            .iter_mut()
            .enumerate()
            .filter(|(_, c)| c.is_visible())
            .filter_map(|(i, c)| c.enable_expand(surface.as_ref()).map(|e| (i, e)))
            .collect();
        if !added.is_empty() {
            log::debug!("{} cells clamp their text", added.len());
        }
        let generation = Some(self.generation);
        for (cell, element) in added {
            let listener = self.listen(
                EventTarget::Element(element),
                EventKind::Click,
                generation,
                Interaction::Affordance { cell, element },
            );
            self.bound.push(listener);
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.teardown_grid();
        let surface = Rc::clone(&self.surface);
        if let Some(listener) = self.document_listener.take() {
            surface.off(listener);
        }
        self.context
            .with_overlay(|o| o.release(surface.as_ref(), self.id, self.elements.scroll));
        surface.remove_element(self.elements.root);
        self.listeners.clear();
        self.destroyed = true;
        log::debug!("table destroyed after {} layout passes", self.passes);
    }
}

/// A data table mounted on a surface.
///
/// Dropping a `Table` without calling [`Table::destroy`] leaves its elements
/// on the surface; its listeners go inert.
pub struct Table {
    state: Rc<RefCell<TableState>>,
}

impl Table {
    /// Validate `config`, build the element tree under `container` and run
    /// the first layout pass.
    ///
    /// Post-paint checks (overflow correction, expand affordances) run on
    /// the surface's next frame.
    pub fn new(
        surface: Rc<dyn Surface>,
        container: ElementId,
        mut config: TableConfig,
        context: &TableContext,
    ) -> Result<Self> {
        config.validate()?;
        let layout = config.table_type.strategy();
        let pristine = config
            .option
            .data
            .flat()
            .map(<[Record]>::to_vec)
            .unwrap_or_default();
        let sort = SortState::new(layout.sort_columns(&config));
        let pagination = layout
            .paginates()
            .then(|| Pagination::new(config.pagination, pristine.len()));
        let visibility = TreeVisibility::new(config.option.data.tree().unwrap_or_default());

        let root = surface.create_element(
            container,
            ElementKind::Block,
            &format!("{MAIN_CONTAINER} {THEME_CONTAINER}"),
        );
        apply_theme(surface.as_ref(), root, config.token_vars("dvTable"));
        let scroll = surface.create_element(root, ElementKind::Block, TABLE_CONTAINER);
        surface.set_size(
            scroll,
            BoxSize {
                width: Some(config.table_style.width),
                max_height: Some(config.table_style.max_height),
                ..BoxSize::default()
            },
        );
        let pager = surface.create_element(
            root,
            ElementKind::Block,
            &format!("{} {THEME_CONTAINER}", pager::WRAPPER),
        );
        apply_theme(surface.as_ref(), pager, config.token_vars("dvPagination"));
        surface.set_visible(pager, false);

        let id = context.register();
        let data = pristine.clone();
        let state = Rc::new_cyclic(|weak| {
            RefCell::new(TableState {
                id,
                weak: Weak::clone(weak),
                surface,
                context: context.clone(),
                config,
                layout,
                elements: Elements {
                    root,
                    scroll,
                    pager,
                },
                pristine,
                data,
                sort,
                pagination,
                visibility,
                meter: TextMeter::new(),
                widths: Vec::new(),
                cells: Vec::new(),
                rows: Vec::new(),
                row_of_node: HashMap::new(),
                linked: Vec::new(),
                linked_origin: None,
                last_selected: Vec::new(),
                is_y_overflow: false,
                passes: 0,
                generation: 0,
                frame: None,
                bound: Vec::new(),
                pager_buttons: Vec::new(),
                document_listener: None,
                listeners: Vec::new(),
                destroyed: false,
            })
        });

        {
            let mut s = state.borrow_mut();
            let listener = s.listen(
                EventTarget::Document,
                EventKind::Click,
                None,
                Interaction::Outside,
            );
            s.document_listener = Some(listener);
            if let Err(e) = s.update() {
                s.destroy();
                return Err(e);
            }
        }
        Ok(Self { state })
    }

    /// Subscribe to every event the table emits.
    pub fn on(&self, listener: impl Fn(&TableEvent) + 'static) {
        self.state.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub fn id(&self) -> TableId {
        self.state.borrow().id
    }

    /// Serializable description of the current grid.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::capture(&self.state.borrow())
    }

    /// Whether the overflow correction pass has run.
    pub fn is_y_overflow(&self) -> bool {
        self.state.borrow().is_y_overflow
    }

    /// Layout passes run so far.
    pub fn layout_passes(&self) -> usize {
        self.state.borrow().passes
    }

    pub fn sort_type(&self, key: &str) -> SortType {
        self.state.borrow().sort.sort_type(key)
    }

    pub fn current_page(&self) -> Option<usize> {
        self.state
            .borrow()
            .pagination
            .as_ref()
            .map(Pagination::current_page)
    }

    /// Root element of the table, the boundary for outside clicks.
    pub fn root(&self) -> ElementId {
        self.state.borrow().elements.root
    }

    /// Scroll container holding the rows.
    pub fn scroll_container(&self) -> ElementId {
        self.state.borrow().elements.scroll
    }

    /// Element of the cell at visual `(row, column)`.
    pub fn cell_element(&self, row: usize, column: usize) -> Option<ElementId> {
        let state = self.state.borrow();
        let mounted = state.rows.get(row)?;
        state
            .cells
            .get(mounted.cells.clone())?
            .get(column)
            .and_then(Cell::element)
    }

    /// Elements of every mounted row, in order.
    pub fn row_elements(&self) -> Vec<ElementId> {
        self.state.borrow().rows.iter().map(|r| r.element).collect()
    }

    /// Remove the table from its surface and release every listener, the
    /// pending frame and the overlay.
    pub fn destroy(self) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => state.destroy(),
            Err(_) => log::error!("destroy called from inside a table event handler"),
        }
    }
}
