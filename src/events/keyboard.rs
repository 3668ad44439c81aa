use super::EventContext;
use crate::keymap::{action_for_key, toggled_mode, KeyAction, ShortcutScope};
use crate::storage::LocalStorage;
use gloo_events::EventListener;
use sketch_core::{restore_camera, save_camera};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Keys typed into form controls belong to the control.
fn targets_form_control(ev: &web::KeyboardEvent) -> bool {
    let Some(el) = ev.target().and_then(|t| t.dyn_into::<web::HtmlElement>().ok()) else {
        return false;
    };
    matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT") || el.is_content_editable()
}

fn focus_inside(ev: &web::KeyboardEvent, host: &web::HtmlElement) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Node>().ok())
        .is_some_and(|node| host.contains(Some(&node)))
}

pub fn attach(
    document: &web::Document,
    host: web::HtmlElement,
    scope: Rc<ShortcutScope>,
    ctx: EventContext,
) -> EventListener {
    EventListener::new(document, "keydown", move |event| {
        let Some(ev) = event.dyn_ref::<web::KeyboardEvent>() else {
            return;
        };
        if ev.ctrl_key() || ev.meta_key() || ev.alt_key() || ev.repeat() {
            return;
        }
        if targets_form_control(ev) || !scope.accepts(focus_inside(ev, &host)) {
            return;
        }
        let Some(action) = action_for_key(&ev.key()) else {
            return;
        };
        ev.prevent_default();
        handle_action(&ctx, action);
    })
}

fn handle_action(ctx: &EventContext, action: KeyAction) {
    match action {
        KeyAction::TogglePlay => toggle_play(ctx),
        KeyAction::TogglePanel => {
            let visible = ctx.panel.borrow_mut().toggle_visible();
            ctx.view.borrow().set_visible(visible);
        }
        KeyAction::ToggleMode(requested) => toggle_mode(ctx, requested),
        KeyAction::SaveCamera => save(ctx),
        KeyAction::LoadCamera => load(ctx),
    }
}

fn toggle_play(ctx: &EventContext) {
    let mut sched = ctx.scheduler.clone();
    let mut ctl = ctx.controller.borrow_mut();
    match ctl.toggle(&mut sched) {
        Ok(playing) => {
            log::info!("[loop] {}", if playing { "playing" } else { "paused" });
            ctx.view.borrow().show_stats(&ctl.stats(), playing);
        }
        Err(e) => log::warn!("[loop] toggle ignored: {}", e),
    }
}

fn toggle_mode(ctx: &EventContext, requested: sketch_core::InteractionMode) {
    let mut ctl = ctx.controller.borrow_mut();
    let Some(current) = ctl.sketch().and_then(|s| s.mode()) else {
        log::debug!("[input] sketch has no interaction modes");
        return;
    };
    let next = toggled_mode(current, requested);
    if next == current {
        return;
    }
    ctl.queue_update(move |sketch| {
        if !sketch.set_mode(next) {
            log::warn!("[input] {} rejected mode {:?}", sketch.name(), next);
        }
    });
    ctl.reset_pointer_smoothing();
}

fn save(ctx: &EventContext) {
    let Some(key) = ctx.storage_key.as_deref() else {
        log::warn!("[persist] no storageKey configured; save skipped");
        return;
    };
    let ctl = ctx.controller.borrow();
    let Some(camera) = ctl.sketch().and_then(|s| s.camera()) else {
        return;
    };
    let result = LocalStorage::open().and_then(|mut store| save_camera(&mut store, key, &camera.borrow()));
    if let Err(e) = result {
        log::error!("[persist] save failed: {}", e);
    }
}

fn load(ctx: &EventContext) {
    let Some(key) = ctx.storage_key.as_deref() else {
        log::warn!("[persist] no storageKey configured; load skipped");
        return;
    };
    let mut ctl = ctx.controller.borrow_mut();
    let Some(camera) = ctl.sketch().and_then(|s| s.camera()) else {
        return;
    };
    // Restore into a copy; the live camera changes at the start of the next frame.
    let mut restored = camera.get();
    let result = LocalStorage::open().and_then(|store| restore_camera(&store, key, &mut restored));
    match result {
        Ok(Some(_)) => ctl.queue_update(move |sketch| {
            _ = camera.replace(restored);
            sketch.on_camera_restored();
        }),
        Ok(None) => log::info!("[persist] nothing saved under '{}'", key),
        Err(e) => log::error!("[persist] load failed: {}", e),
    }
}
