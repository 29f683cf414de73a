#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Object, Reflect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

use site_orchestrator_wasm::{abi_version, WasmSite};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(WasmSite::new(JsValue::UNDEFINED, JsValue::NULL).is_ok());
}

#[wasm_bindgen_test]
fn bad_config_is_an_error() {
    let cfg = swb::to_value(&serde_json::json!({ "preloader": { "stages": [] } })).unwrap();
    assert!(WasmSite::new(cfg, JsValue::UNDEFINED).is_err());
}

#[wasm_bindgen_test]
fn step_returns_frame_fields() {
    let mut site = WasmSite::new(JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();
    site.push_event(JsValue::from_str(r#"{"type":"scroll","y":120}"#))
        .expect("json string event");
    let frame = Object::from(site.step(16.0).expect("step"));
    for key in ["epoch", "now_ms", "dt_ms", "changes", "events", "key_outcomes"] {
        assert!(Reflect::has(&frame, &JsValue::from_str(key)).unwrap(), "{key}");
    }
}

#[wasm_bindgen_test]
fn skip_reports_completion_once() {
    let mut site = WasmSite::new(JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();
    let calls: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = calls.clone();
    let cb = Closure::wrap(Box::new(move |reason: JsValue| {
        sink.borrow_mut().push(reason.as_string().unwrap_or_default());
    }) as Box<dyn FnMut(JsValue)>);
    site.on_preloader_complete(cb.as_ref().unchecked_ref::<Function>().clone());

    site.step(2000.0).unwrap();
    site.skip();
    site.step(16.0).unwrap();
    site.step(400.0).unwrap();
    site.step(5000.0).unwrap();
    assert_eq!(*calls.borrow(), vec!["skipped".to_string()]);
    drop(cb);
}

#[wasm_bindgen_test]
fn dispose_then_step_errors() {
    let mut site = WasmSite::new(JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();
    site.dispose().unwrap();
    assert!(site.step(16.0).is_err());
}
