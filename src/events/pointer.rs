use crate::dom::DomContainer;
use crate::frame::SharedController;
use glam::Vec2;
use gloo_events::{EventListener, EventListenerOptions};
use sketch_core::{InteractionMode, PointerInput};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
fn client_pos(ev: &web::MouseEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

/// Client-space input against the container's current position; scrolling
/// moves it without a resize.
fn feed(ctl: &SharedController, container: &DomContainer, input: PointerInput) {
    let mut ctl = ctl.borrow_mut();
    ctl.track_origin(container);
    ctl.pointer_event(input);
}

pub fn attach(
    canvas: &web::HtmlCanvasElement,
    container: &DomContainer,
    controller: &SharedController,
) -> Vec<EventListener> {
    let mut listeners = Vec::with_capacity(4);

    {
        let ctl = Rc::clone(controller);
        let container = container.clone();
        listeners.push(EventListener::new(canvas, "pointermove", move |event| {
            let Some(ev) = event.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            feed(&ctl, &container, PointerInput::Move {
                client: client_pos(ev),
            });
        }));
    }

    {
        let ctl = Rc::clone(controller);
        let container = container.clone();
        let target = canvas.clone();
        listeners.push(EventListener::new(canvas, "pointerdown", move |event| {
            let Some(ev) = event.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            // keep receiving moves while dragging outside the canvas
            _ = target.set_pointer_capture(ev.pointer_id());
            feed(&ctl, &container, PointerInput::Down {
                client: client_pos(ev),
                button: ev.button(),
            });
        }));
    }

    {
        let ctl = Rc::clone(controller);
        let container = container.clone();
        let target = canvas.clone();
        listeners.push(EventListener::new(canvas, "pointerup", move |event| {
            let Some(ev) = event.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            _ = target.release_pointer_capture(ev.pointer_id());
            feed(&ctl, &container, PointerInput::Up {
                client: client_pos(ev),
            });
        }));
    }

    {
        let ctl = Rc::clone(controller);
        listeners.push(EventListener::new_with_options(
            canvas,
            "wheel",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(ev) = event.dyn_ref::<web::WheelEvent>() else {
                    return;
                };
                let mut ctl = ctl.borrow_mut();
                let consumed = ctl
                    .sketch()
                    .and_then(|s| s.mode())
                    .is_some_and(InteractionMode::uses_wheel);
                if !consumed {
                    return;
                }
                ev.prevent_default();
                ctl.pointer_event(PointerInput::Wheel {
                    delta_y: ev.delta_y() as f32,
                });
            },
        ));
    }

    listeners
}
