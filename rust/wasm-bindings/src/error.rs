// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ifc_audit_viewer::ViewerError;
use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures of the browser front end
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No browser window")]
    NoWindow,

    #[error("Missing page element #{0}")]
    MissingElement(String),

    #[error("Element #{id} is not a {expected}")]
    WrongElement { id: String, expected: &'static str },

    #[error("WebGL2 is not available")]
    NoWebGl,

    #[error("WebGL error: {0}")]
    WebGl(String),

    #[error(transparent)]
    Viewer(#[from] ViewerError),

    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for AppError {
    fn from(value: JsValue) -> Self {
        AppError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<AppError> for JsValue {
    fn from(error: AppError) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}
