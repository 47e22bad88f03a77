//! JavaScript bindings.
//!
//! ```javascript
//! import init, { DvContext, DvTable } from 'dvtable';
//! await init();
//! const context = new DvContext();
//! const table = new DvTable(container, config, context, formatData);
//! table.on('cell:selected', (e) => console.log(e.data));
//! table.destroy();
//! ```

use std::rc::Rc;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::config::{FormatData, TableConfig};
use crate::data::CellValue;
use crate::overlay::TableContext;
use crate::surface::{DomSurface, Surface};
use crate::table::Table;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Wrap a JS `formatData(key, value, showUnit)` function.
fn js_format(function: Function) -> FormatData {
    FormatData::new(move |key: &str, value: &CellValue, show_unit: bool| {
        let raw = to_js(value).unwrap_or(JsValue::NULL);
        function
            .call3(
                &JsValue::NULL,
                &JsValue::from_str(key),
                &raw,
                &JsValue::from_bool(show_unit),
            )
            .ok()
            .and_then(|r| r.as_string())
            .unwrap_or_else(|| value.to_plain_string())
    })
}

/// Surface and selection overlay shared by the tables of one page.
#[wasm_bindgen]
pub struct DvContext {
    surface: Rc<DomSurface>,
    context: TableContext,
}

#[wasm_bindgen]
impl DvContext {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<DvContext, JsValue> {
        console_error_panic_hook::set_once();
        Ok(Self {
            surface: Rc::new(DomSurface::new()?),
            context: TableContext::new(),
        })
    }
}

/// A table mounted in a DOM container.
#[wasm_bindgen]
pub struct DvTable {
    table: Option<Table>,
}

#[wasm_bindgen]
impl DvTable {
    /// # Errors
    /// Returns an error if the configuration is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        config: JsValue,
        context: &DvContext,
        format_data: Option<Function>,
    ) -> Result<DvTable, JsValue> {
        console_error_panic_hook::set_once();
        let mut config: TableConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;
        if let Some(function) = format_data {
            config = config.with_format_data(js_format(function));
        }
        let container = context.surface.attach(container);
        let surface: Rc<dyn Surface> = Rc::clone(&context.surface) as Rc<dyn Surface>;
        let table = Table::new(surface, container, config, &context.context)?;
        Ok(Self { table: Some(table) })
    }

    /// Subscribe `callback` to events named `name`, e.g. `cell:selected`.
    pub fn on(&self, name: String, callback: Function) {
        let Some(table) = &self.table else {
            return;
        };
        table.on(move |event| {
            if event.name() != name {
                return;
            }
            match to_js(&event.payload()) {
                Ok(payload) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                        log::warn!("{} listener threw: {e:?}", event.name());
                    }
                }
                Err(e) => log::warn!("dropping {}: {e:?}", event.name()),
            }
        });
    }

    /// # Errors
    /// Returns an error if the table was destroyed.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| JsValue::from_str("table destroyed"))?;
        to_js(&table.snapshot())
    }

    /// Tear the table down. Later calls do nothing.
    pub fn destroy(&mut self) {
        if let Some(table) = self.table.take() {
            table.destroy();
        }
    }
}
