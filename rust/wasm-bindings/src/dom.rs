// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Page elements, alert rendering and toasts

use gloo_timers::future::TimeoutFuture;
use ifc_audit_viewer::{AlertPanel, Category, DomIds, Toast};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Window};

use crate::error::{AppError, Result};

/// The elements the viewer binds to, resolved once at start
pub struct Page {
    pub window: Window,
    pub document: Document,
    pub file_input: HtmlInputElement,
    /// Textarea or text input holding the report
    pub report_input: HtmlElement,
    pub alert_box: Element,
    pub canvas: HtmlCanvasElement,
}

impl Page {
    pub fn bind(ids: &DomIds) -> Result<Self> {
        let window = web_sys::window().ok_or(AppError::NoWindow)?;
        let document = window.document().ok_or(AppError::NoWindow)?;
        Ok(Self {
            file_input: typed_element(&document, &ids.file_input, "file input")?,
            report_input: typed_element(&document, &ids.report_input, "text field")?,
            alert_box: element(&document, &ids.alert_box)?,
            canvas: typed_element(&document, &ids.canvas, "canvas")?,
            window,
            document,
        })
    }

    /// The checkbox whose id is the category's symbolic name
    pub fn category_checkbox(&self, category: Category) -> Result<HtmlInputElement> {
        typed_element(&self.document, category.name(), "checkbox")
    }

    pub fn report_text(&self) -> String {
        if let Some(area) = self.report_input.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(input) = self.report_input.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else {
            self.report_input.inner_text()
        }
    }

    pub fn render_alerts(&self, panel: &AlertPanel) {
        self.alert_box.set_inner_html(&panel.to_html());
    }

    /// Window size in CSS pixels and the device pixel ratio
    pub fn window_size(&self) -> (f32, f32, f64) {
        let width = self.window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(1.0);
        let height = self.window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(1.0);
        (width as f32, height as f32, self.window.device_pixel_ratio())
    }

    /// Show a toast at the configured edge and remove it after its duration
    pub fn show_toast(&self, toast: &Toast) -> Result<()> {
        let body = self.document.body().ok_or(AppError::NoWindow)?;
        let element = self.document.create_element("div")?;
        element.set_attribute("role", "status")?;
        element.set_attribute("style", &toast.style())?;
        element.set_text_content(Some(toast.text));

        let on_close = if toast.settings.close {
            let close = self.document.create_element("span")?;
            close.set_text_content(Some("\u{2716}"));
            close.set_attribute("style", "margin-left: 12px; cursor: pointer; opacity: 0.6;")?;
            let target = element.clone();
            let on_close = Closure::<dyn FnMut()>::new(move || target.remove());
            close.add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())?;
            element.append_child(&close)?;
            Some(on_close)
        } else {
            None
        };

        body.append_child(&element)?;

        let duration = toast.settings.duration_ms;
        spawn_local(async move {
            TimeoutFuture::new(duration).await;
            element.remove();
            drop(on_close);
        });
        Ok(())
    }
}

fn element(document: &Document, id: &str) -> Result<Element> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| AppError::MissingElement(id.to_string()))
}

fn typed_element<T: JsCast>(document: &Document, id: &str, expected: &'static str) -> Result<T> {
    element(document, id)?
        .dyn_into::<T>()
        .map_err(|_| AppError::WrongElement {
            id: id.to_string(),
            expected,
        })
}
