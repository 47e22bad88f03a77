//! Browser tests for the DOM surface. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;

use dvtable::surface::{DomSurface, ElementKind, Font, Surface};
use dvtable::wasm::{DvContext, DvTable};
use dvtable::{TableConfig, TableContext};
use js_sys::{Array, Function, JSON};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn container() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let div: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    document.body().unwrap().append_child(&div).unwrap();
    div
}

#[wasm_bindgen_test]
fn test_elements_land_in_the_container() {
    let surface = DomSurface::new().unwrap();
    let host = container();
    let root = surface.attach(host.clone());

    let block = surface.create_element(root, ElementKind::Block, "a b");
    surface.set_text(block, "hello");
    let element = host.first_element_child().unwrap();
    assert!(element.class_list().contains("a"));
    assert!(element.class_list().contains("b"));
    assert_eq!(element.text_content().as_deref(), Some("hello"));
    assert!(surface.contains(root, block));

    surface.remove_element(block);
    assert_eq!(host.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn test_text_is_measured_with_canvas() {
    let surface = DomSurface::new().unwrap();
    let font = Font {
        family: "sans-serif",
        size: 12.0,
        weight: 400,
    };
    let short = surface.measure_text("ab", &font);
    let long = surface.measure_text("abcdef", &font);
    assert!(short > 0.0);
    assert!(long > short);
}

#[wasm_bindgen_test]
fn test_table_mounts_and_destroys() {
    let surface = Rc::new(DomSurface::new().unwrap());
    let host = container();
    let root = surface.attach(host.clone());
    let config = TableConfig::from_json(
        r#"{"tableType": "vertical",
            "option": {"data": [{"a": 1}, {"a": 2}], "columns": ["a"]}}"#,
    )
    .unwrap();

    let shared: Rc<dyn Surface> = Rc::clone(&surface) as Rc<dyn Surface>;
    let table = dvtable::Table::new(shared, root, config, &TableContext::new()).unwrap();
    assert_eq!(host.child_element_count(), 1);
    assert_eq!(table.row_elements().len(), 3);

    table.destroy();
    assert_eq!(host.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn test_throwing_listener_does_not_block_the_next_one() {
    let host = container();
    let config = JSON::parse(
        r#"{"tableType": "vertical", "option": {"data": [{"a": 1}], "columns": ["a"]}}"#,
    )
    .unwrap();
    let context = DvContext::new().unwrap();
    let mut table = DvTable::new(host.clone(), config, &context, None).unwrap();

    let seen = Array::new();
    table.on(
        "cell:selected".into(),
        Function::new_no_args("throw new Error('listener failed')"),
    );
    table.on(
        "cell:selected".into(),
        Function::new_with_args("e", "this.push(e)").bind(&seen),
    );

    let cell: HtmlElement = host
        .query_selector(".normal-cell")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    cell.click();
    assert_eq!(seen.length(), 1);
    table.destroy();
}
