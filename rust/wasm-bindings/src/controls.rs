// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mouse input for the orbit controls: left drag rotates, right drag pans,
//! the wheel dollies.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, MouseEvent, WheelEvent};

use crate::app::AppState;
use crate::dom::Page;
use crate::error::Result;

const ROTATE_BUTTON: i16 = 0;
const PAN_BUTTON: i16 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Rotate { x: i32, y: i32 },
    Pan { x: i32, y: i32 },
}

/// Attach pointer listeners; they live as long as the page
pub fn bind(page: &Page, state: Rc<RefCell<AppState>>) -> Result<()> {
    let drag: Rc<RefCell<Option<Drag>>> = Rc::new(RefCell::new(None));

    {
        let drag = drag.clone();
        let on_down = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let (x, y) = (event.client_x(), event.client_y());
            *drag.borrow_mut() = match event.button() {
                ROTATE_BUTTON => Some(Drag::Rotate { x, y }),
                PAN_BUTTON => Some(Drag::Pan { x, y }),
                _ => None,
            };
        });
        page.canvas
            .add_event_listener_with_callback("mousedown", on_down.as_ref().unchecked_ref())?;
        on_down.forget();
    }

    {
        let drag = drag.clone();
        let state = state.clone();
        let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let mut drag = drag.borrow_mut();
            let Some(current) = *drag else {
                return;
            };
            let (x, y) = (event.client_x(), event.client_y());
            let mut app = state.borrow_mut();
            let viewport = &mut app.viewport;
            *drag = Some(match current {
                Drag::Rotate { x: px, y: py } => {
                    viewport
                        .controls
                        .rotate((x - px) as f32, (y - py) as f32, viewport.height);
                    Drag::Rotate { x, y }
                }
                Drag::Pan { x: px, y: py } => {
                    viewport
                        .controls
                        .pan((x - px) as f32, (y - py) as f32, viewport.height, &viewport.camera);
                    Drag::Pan { x, y }
                }
            });
        });
        page.window
            .add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
        on_move.forget();
    }

    {
        let on_up = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            *drag.borrow_mut() = None;
        });
        page.window
            .add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref())?;
        on_up.forget();
    }

    {
        let on_wheel = Closure::<dyn FnMut(WheelEvent)>::new(move |event: WheelEvent| {
            event.prevent_default();
            state.borrow_mut().viewport.controls.dolly(event.delta_y() as f32);
        });
        page.canvas
            .add_event_listener_with_callback("wheel", on_wheel.as_ref().unchecked_ref())?;
        on_wheel.forget();
    }

    // Right drag pans, so keep the browser menu away
    let on_context_menu = Closure::<dyn FnMut(Event)>::new(|event: Event| event.prevent_default());
    page.canvas
        .add_event_listener_with_callback("contextmenu", on_context_menu.as_ref().unchecked_ref())?;
    on_context_menu.forget();

    Ok(())
}
