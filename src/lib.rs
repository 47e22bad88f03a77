//! dvtable - data-view tables for the web
//!
//! Lays out records as interactive tables in the browser via WebAssembly:
//! - Five layouts: key/value, vertical, two multi-dimensional grids and trees
//! - Width resolution from measured text with leftover-space compensation
//! - Linked hover/selection highlighting with a shared selection overlay
//! - Column sorting, pagination and collapsible tree rows
//! - Headless surface for native hosts, tests and the CLI
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { DvContext, DvTable } from 'dvtable';
//! await init();
//! const table = new DvTable(container, config, new DvContext(), formatData);
//! table.on('cell:selected', (e) => console.log(e.data.selectedValue));
//! ```
//!
//! # Usage (Rust)
//!
//! ```no_run
//! use std::rc::Rc;
//! use dvtable::{HeadlessSurface, Surface, Table, TableConfig, TableContext};
//!
//! let surface = Rc::new(HeadlessSurface::new());
//! let config = TableConfig::from_json(r#"{"tableType": "vertical",
//!     "option": {"data": [{"a": 1}], "columns": ["a"]}}"#)?;
//! let shared: Rc<dyn Surface> = Rc::clone(&surface) as Rc<dyn Surface>;
//! let table = Table::new(shared, surface.root(), config, &TableContext::new())?;
//! surface.run_frames();
//! println!("{:?}", table.snapshot().widths);
//! # Ok::<(), dvtable::TableError>(())
//! ```

pub mod cache;
pub mod cell;
pub mod config;
pub mod data;
pub mod error;
pub mod highlight;
pub mod layout;
pub mod overlay;
pub mod pagination;
pub mod sort;
pub mod surface;
pub mod table;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use config::{FormatData, LayoutKind, TableConfig};
pub use data::{CellValue, Record};
pub use error::{Result, TableError};
pub use overlay::TableContext;
pub use surface::{HeadlessSurface, Surface};
pub use table::{Table, TableEvent, TableSnapshot};

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
