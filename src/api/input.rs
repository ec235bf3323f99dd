//! Pointer and touch listeners, normalized to canvas-local logical
//! coordinates and forwarded to the drag constraint.

use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, MouseEvent, TouchEvent};

use super::wasm::GalleryHost;

pub(crate) fn install(host: &Rc<GalleryHost>) {
    let mut listeners = Vec::new();
    let canvas = host.canvas.clone();

    let canvas_for_down = canvas.clone();
    let host_for_down = Rc::clone(host);
    listeners.push(EventListener::new(&canvas, "mousedown", move |event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let (x, y) = mouse_coords(&canvas_for_down, event);
        host_for_down.core.borrow_mut().pointer_down(x, y);
    }));

    let canvas_for_move = canvas.clone();
    let host_for_move = Rc::clone(host);
    listeners.push(EventListener::new(&canvas, "mousemove", move |event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let (x, y) = mouse_coords(&canvas_for_move, event);
        host_for_move.core.borrow_mut().pointer_move(x, y);
    }));

    let host_for_up = Rc::clone(host);
    listeners.push(EventListener::new(&canvas, "mouseup", move |_event| {
        host_for_up.core.borrow_mut().pointer_up();
    }));

    // Touch listeners need passive:false so preventDefault can stop the
    // page from scrolling while a cookie is dragged.
    let canvas_for_start = canvas.clone();
    let host_for_start = Rc::clone(host);
    listeners.push(EventListener::new_with_options(
        &canvas,
        "touchstart",
        touch_options(),
        move |event| {
            let Some((x, y)) = touch_coords(&canvas_for_start, event) else {
                return;
            };
            host_for_start.core.borrow_mut().pointer_down(x, y);
            event.prevent_default();
        },
    ));

    let canvas_for_touch_move = canvas.clone();
    let host_for_touch_move = Rc::clone(host);
    listeners.push(EventListener::new_with_options(
        &canvas,
        "touchmove",
        touch_options(),
        move |event| {
            let Some((x, y)) = touch_coords(&canvas_for_touch_move, event) else {
                return;
            };
            host_for_touch_move.core.borrow_mut().pointer_move(x, y);
            event.prevent_default();
        },
    ));

    let host_for_end = Rc::clone(host);
    listeners.push(EventListener::new_with_options(
        &canvas,
        "touchend",
        touch_options(),
        move |event| {
            host_for_end.core.borrow_mut().pointer_up();
            event.prevent_default();
        },
    ));

    *host.listeners.borrow_mut() = listeners;
}

fn touch_options() -> EventListenerOptions {
    EventListenerOptions {
        phase: EventListenerPhase::Bubble,
        passive: false,
    }
}

fn mouse_coords(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        event.client_x() as f32 - rect.left() as f32,
        event.client_y() as f32 - rect.top() as f32,
    )
}

fn touch_coords(canvas: &HtmlCanvasElement, event: &Event) -> Option<(f32, f32)> {
    let event = event.dyn_ref::<TouchEvent>()?;
    let touch = event.touches().item(0)?;
    let rect = canvas.get_bounding_client_rect();
    Some((
        touch.client_x() as f32 - rect.left() as f32,
        touch.client_y() as f32 - rect.top() as f32,
    ))
}
