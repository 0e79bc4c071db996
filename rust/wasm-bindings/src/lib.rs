// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Audit WebAssembly front end
//!
//! Mounts the audit viewer on a page holding a file input, a report text
//! field, an alert box, seven category checkboxes and a canvas.

use wasm_bindgen::prelude::*;

mod app;
mod controls;
mod dom;
mod error;
mod renderer;

pub use app::IfcAuditViewer;
pub use error::AppError;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// Get the version of IFC-Audit
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
