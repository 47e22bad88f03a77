//! Common test utilities: headless surfaces, config builders and event
//! capture.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;
use std::rc::Rc;

use dvtable::config::FieldMeta;
use dvtable::data::TableData;
use dvtable::surface::ElementId;
use dvtable::{
    CellValue, HeadlessSurface, LayoutKind, Record, Surface, Table, TableConfig, TableContext,
    TableEvent,
};

/// Width every character measures at, whatever the font.
pub const CHAR_WIDTH: f64 = 10.0;

/// Surface measuring [`CHAR_WIDTH`] per character.
#[must_use]
pub fn surface() -> Rc<HeadlessSurface> {
    Rc::new(HeadlessSurface::new().with_measure(|text, _| text.chars().count() as f64 * CHAR_WIDTH))
}

#[must_use]
pub fn record(pairs: &[(&str, CellValue)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// Flat config with `sales` numeric and `date` a date field.
#[must_use]
pub fn flat_config(
    kind: LayoutKind,
    records: Vec<Record>,
    rows: &[&str],
    columns: &[&str],
) -> TableConfig {
    let mut config = TableConfig {
        table_type: kind,
        ..TableConfig::default()
    };
    config.option.data = TableData::Flat(records);
    config.option.rows = rows.iter().map(|s| (*s).to_string()).collect();
    config.option.columns = columns.iter().map(|s| (*s).to_string()).collect();
    config
        .option
        .data_meta_info
        .insert("sales".into(), FieldMeta::number(None));
    config
        .option
        .data_meta_info
        .insert("date".into(), FieldMeta::date());
    config
}

/// A table mounted on its own surface and context.
pub struct Fixture {
    pub surface: Rc<HeadlessSurface>,
    pub context: TableContext,
    pub table: Table,
    pub events: Rc<RefCell<Vec<TableEvent>>>,
}

impl Fixture {
    pub fn new(config: TableConfig) -> Self {
        let surface = surface();
        let context = TableContext::new();
        let (table, events) = mount(&surface, &context, surface.root(), config);
        Self {
            surface,
            context,
            table,
            events,
        }
    }

    /// Run pending frames until the table settles.
    pub fn settle(&self) {
        for _ in 0..4 {
            if self.surface.run_frames() == 0 {
                return;
            }
        }
    }

    pub fn cell(&self, row: usize, column: usize) -> ElementId {
        self.table
            .cell_element(row, column)
            .unwrap_or_else(|| panic!("no cell at ({row}, {column})"))
    }

    pub fn texts(&self) -> Vec<Vec<String>> {
        self.table
            .snapshot()
            .visible_texts()
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect()
    }

    pub fn take_events(&self) -> Vec<TableEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

/// Mount a table under `container` and capture its events.
pub fn mount(
    surface: &Rc<HeadlessSurface>,
    context: &TableContext,
    container: ElementId,
    config: TableConfig,
) -> (Table, Rc<RefCell<Vec<TableEvent>>>) {
    let shared: Rc<dyn Surface> = Rc::clone(surface) as Rc<dyn Surface>;
    let table = Table::new(shared, container, config, context).expect("table builds");
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    table.on(move |event| sink.borrow_mut().push(event.clone()));
    (table, events)
}
