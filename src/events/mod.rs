use crate::dom::DomContainer;
use crate::frame::{RafScheduler, SharedController};
use crate::keymap::ShortcutScope;
use crate::panel::PanelView;
use gloo_events::EventListener;
use sketch_core::DebugPanel;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

mod keyboard;
mod pointer;

/// Shared handles the DOM listeners act on.
#[derive(Clone)]
pub struct EventContext {
    pub controller: SharedController,
    pub panel: Rc<RefCell<DebugPanel>>,
    pub view: Rc<RefCell<PanelView>>,
    pub scheduler: RafScheduler,
    pub storage_key: Option<String>,
}

/// Attach every listener a mounted sketch needs. Dropping the returned
/// listeners detaches them.
pub fn attach(
    document: &web::Document,
    canvas: &web::HtmlCanvasElement,
    host: &web::HtmlElement,
    ctx: EventContext,
) -> Vec<EventListener> {
    let container = DomContainer::new(host.clone());
    let mut listeners = pointer::attach(canvas, &container, &ctx.controller);
    if let Some(resize) = attach_resize(&container, &ctx.controller) {
        listeners.push(resize);
    }

    let scope = Rc::new(ShortcutScope::default());
    listeners.extend(attach_scope(host, &scope));
    listeners.push(keyboard::attach(document, host.clone(), scope, ctx));
    listeners
}

fn attach_resize(container: &DomContainer, controller: &SharedController) -> Option<EventListener> {
    let window = web::window()?;
    let container = container.clone();
    let ctl = Rc::clone(controller);
    controller.borrow_mut().on_resize(move || {
        EventListener::new(&window, "resize", move |_event| {
            _ = ctl.borrow_mut().resize(&container);
        })
    })
}

/// Hover tracking on the host, which also covers the panel inside it.
fn attach_scope(host: &web::HtmlElement, scope: &Rc<ShortcutScope>) -> [EventListener; 2] {
    let enter = {
        let scope = Rc::clone(scope);
        EventListener::new(host, "pointerenter", move |_event| scope.enter())
    };
    let leave = {
        let scope = Rc::clone(scope);
        EventListener::new(host, "pointerleave", move |_event| scope.leave())
    };
    [enter, leave]
}
