// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![cfg(target_arch = "wasm32")]

use ifc_audit_wasm::{version, AppError};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_version_matches_package() {
    assert_eq!(version(), env!("CARGO_PKG_VERSION"));
}

#[wasm_bindgen_test]
fn test_errors_become_js_errors() {
    let value: JsValue = AppError::MissingElement("alert_box".to_string()).into();
    let error: js_sys::Error = value.into();
    assert_eq!(String::from(error.message()), "Missing page element #alert_box");
}

#[wasm_bindgen_test]
fn test_js_values_become_app_errors() {
    let error = AppError::from(JsValue::from_str("boom"));
    assert!(matches!(error, AppError::Js(ref message) if message == "boom"));
}
