// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Browser entry point - binds the page to an [`AuditSession`] and drives
//! the render loop.

use std::cell::RefCell;
use std::rc::Rc;

use ifc_audit_viewer::{AuditSession, Category, ReportOutcome, ViewerConfig, Viewport};
use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Event, HtmlInputElement};

use crate::controls;
use crate::dom::Page;
use crate::error::{AppError, Result};
use crate::renderer::Renderer;

/// Everything the event handlers share
pub struct AppState {
    pub session: AuditSession,
    pub viewport: Viewport,
    pub renderer: Renderer,
}

/// The audit viewer mounted on the page
///
/// ```javascript
/// import init, { IfcAuditViewer } from 'ifc-audit-wasm';
///
/// await init();
/// const viewer = new IfcAuditViewer({ toast: { durationMs: 5000 } });
/// viewer.start();
/// ```
#[wasm_bindgen]
pub struct IfcAuditViewer {
    page: Rc<Page>,
    state: Rc<RefCell<AppState>>,
    started: bool,
}

#[wasm_bindgen]
impl IfcAuditViewer {
    /// Resolve the page elements and create the WebGL2 context
    ///
    /// `config` is an optional partial configuration object; omitted fields
    /// keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<IfcAuditViewer, JsValue> {
        let config: ViewerConfig = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let page = Page::bind(&config.dom)?;
        let (width, height, pixel_ratio) = page.window_size();
        let viewport = Viewport::new(&config.viewport, width, height, pixel_ratio);
        let renderer = Renderer::new(&page.canvas, &config.viewport)?;
        resize_canvas(&page, &viewport);

        Ok(Self {
            page: Rc::new(page),
            state: Rc::new(RefCell::new(AppState {
                session: AuditSession::new(config),
                viewport,
                renderer,
            })),
            started: false,
        })
    }

    /// Attach all listeners and start rendering; later calls do nothing
    pub fn start(&mut self) -> std::result::Result<(), JsValue> {
        if self.started {
            return Ok(());
        }
        bind_file_input(&self.page, &self.state)?;
        bind_report_input(&self.page, &self.state)?;
        bind_checkboxes(&self.page, &self.state)?;
        bind_resize(&self.page, &self.state)?;
        controls::bind(&self.page, self.state.clone())?;
        start_render_loop(self.page.clone(), self.state.clone())?;
        self.started = true;
        tracing::info!("viewer started");
        Ok(())
    }

    /// Load IFC bytes directly, bypassing the file input
    ///
    /// Returns the load summary.
    #[wasm_bindgen(js_name = loadModel)]
    pub fn load_model(&self, data: Vec<u8>) -> std::result::Result<JsValue, JsValue> {
        let mut state = self.state.borrow_mut();
        let summary = state.session.load_model(data).map_err(AppError::from)?;
        Ok(serde_wasm_bindgen::to_value(&summary)?)
    }

    /// Apply report text as if typed into the report field
    ///
    /// Returns the resolved express ids, or `undefined` when a toast was shown
    /// or the report waits for the file read to finish.
    #[wasm_bindgen(js_name = submitReport)]
    pub fn submit_report(&self, text: &str) -> std::result::Result<Option<Vec<u32>>, JsValue> {
        Ok(apply_report(&self.page, &self.state, text)?)
    }

    /// Toggle a category by its symbolic name, e.g. `IFCDOOR`
    #[wasm_bindgen(js_name = setCategoryVisible)]
    pub fn set_category_visible(&self, name: &str, visible: bool) -> std::result::Result<(), JsValue> {
        let category = Category::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown category {}", name)))?;
        self.state.borrow_mut().session.set_category_visible(category, visible);
        Ok(())
    }

    /// Number of alerts currently listed
    #[wasm_bindgen(getter, js_name = alertCount)]
    pub fn alert_count(&self) -> usize {
        self.state.borrow().session.alerts().len()
    }
}

fn resize_canvas(page: &Page, viewport: &Viewport) {
    let (width, height) = viewport.drawing_buffer_size();
    page.canvas.set_width(width);
    page.canvas.set_height(height);
}

fn apply_report(page: &Page, state: &RefCell<AppState>, text: &str) -> Result<Option<Vec<u32>>> {
    let outcome = state.borrow_mut().session.on_report_input(text)?;
    match outcome {
        ReportOutcome::Rejected(toast) => {
            page.show_toast(&toast)?;
            Ok(None)
        }
        ReportOutcome::Deferred => Ok(None),
        ReportOutcome::Highlighted { failures, resolved } => {
            page.render_alerts(state.borrow().session.alerts());
            tracing::info!(failures, resolved = resolved.len(), "report applied");
            Ok(Some(resolved))
        }
    }
}

fn bind_file_input(page: &Rc<Page>, state: &Rc<RefCell<AppState>>) -> Result<()> {
    let listener_page = page.clone();
    let state = state.clone();
    let on_change = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(input) = event.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };

        let generation = state.borrow_mut().session.begin_load();
        let state = state.clone();
        let page = listener_page.clone();
        spawn_local(async move {
            let bytes = match JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => Uint8Array::new(&buffer).to_vec(),
                Err(err) => {
                    tracing::error!(error = %AppError::from(err), "failed to read the selected file");
                    return;
                }
            };
            let loaded = state.borrow_mut().session.finish_load(generation, bytes);
            match loaded {
                Ok(Some(summary)) => tracing::info!(
                    products = summary.products,
                    meshed = summary.meshed,
                    "model loaded"
                ),
                Ok(None) => return,
                Err(err) => tracing::error!(error = %err, "failed to load the selected file"),
            }

            let pending = state.borrow_mut().session.take_pending_report();
            if let Some(text) = pending {
                if let Err(err) = apply_report(&page, &state, &text) {
                    tracing::error!(error = %err, "failed to apply the report");
                }
            }
        });
    });
    page.file_input
        .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    on_change.forget();
    Ok(())
}

fn bind_report_input(page: &Rc<Page>, state: &Rc<RefCell<AppState>>) -> Result<()> {
    let listener_page = page.clone();
    let state = state.clone();
    let on_input = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let text = listener_page.report_text();
        if let Err(err) = apply_report(&listener_page, &state, &text) {
            tracing::error!(error = %err, "failed to apply the report");
        }
    });
    page.report_input
        .add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
    on_input.forget();
    Ok(())
}

/// One listener per category checkbox, bound once; the checkbox state
/// carries over to every model loaded later
fn bind_checkboxes(page: &Rc<Page>, state: &Rc<RefCell<AppState>>) -> Result<()> {
    for category in Category::all() {
        let checkbox = page.category_checkbox(category)?;
        state
            .borrow_mut()
            .session
            .set_category_visible(category, checkbox.checked());

        let state = state.clone();
        let on_change = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(checkbox) = event.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
                return;
            };
            state
                .borrow_mut()
                .session
                .set_category_visible(category, checkbox.checked());
        });
        checkbox.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
        on_change.forget();
    }
    Ok(())
}

fn bind_resize(page: &Rc<Page>, state: &Rc<RefCell<AppState>>) -> Result<()> {
    let listener_page = page.clone();
    let state = state.clone();
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        let (width, height, pixel_ratio) = listener_page.window_size();
        let mut state = state.borrow_mut();
        state.viewport.resize(width, height, pixel_ratio);
        resize_canvas(&listener_page, &state.viewport);
    });
    page.window
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();
    Ok(())
}

fn start_render_loop(page: Rc<Page>, state: Rc<RefCell<AppState>>) -> Result<()> {
    let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = frame.clone();
    let window = page.window.clone();

    *frame.borrow_mut() = Some(Closure::new(move || {
        {
            let mut state = state.borrow_mut();
            let AppState {
                session,
                viewport,
                renderer,
            } = &mut *state;
            viewport.tick();
            if let Err(err) = renderer.render(viewport, session.scene(), session.subsets()) {
                tracing::error!(error = %err, "render failed");
            }
        }
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(err) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                tracing::error!(error = %AppError::from(err), "requestAnimationFrame failed");
            }
        }
    }));

    if let Some(callback) = frame.borrow().as_ref() {
        page.window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    Ok(())
}
