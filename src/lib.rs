#![cfg(target_arch = "wasm32")]
use anyhow::anyhow;
use gloo_events::EventListener;
use sketch_core::constants::DEFAULT_HEADER_OFFSET;
use sketch_core::{DebugPanel, SketchController, SketchOptions, ViewportSize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod frame;
mod keymap;
mod panel;
mod render;
mod sketches;
mod storage;

use dom::{DomContainer, MountConfig};
use events::EventContext;
use frame::{FrameLoop, SharedController};
use panel::PanelView;
use render::GpuContext;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!(
        "sketchbook ready; sketches: {}",
        sketches::names().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

/// Names accepted by [`mount`].
#[wasm_bindgen]
pub fn sketches() -> js_sys::Array {
    sketches::names().map(JsValue::from_str).collect()
}

/// Mount the named sketch into `config.dom` and start its loop.
///
/// `config` is `{ dom, storageKey?, headerOffset? }`.
#[wasm_bindgen]
pub async fn mount(name: String, config: JsValue) -> Result<SketchHandle, JsValue> {
    mount_sketch(&name, &config)
        .await
        .map_err(|e| JsValue::from_str(&format!("mount '{name}': {e:#}")))
}

struct Mounted {
    controller: SharedController,
    frame_loop: FrameLoop,
    listeners: Vec<EventListener>,
    view: Rc<RefCell<PanelView>>,
    canvas: web::HtmlCanvasElement,
}

/// Owner of one mounted sketch. Everything the mount created is released
/// by `stop`, which also runs when the handle is freed.
#[wasm_bindgen]
pub struct SketchHandle {
    name: String,
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl SketchHandle {
    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.name.clone()
    }

    pub fn stop(&mut self) {
        let Some(m) = self.mounted.take() else {
            return;
        };
        m.frame_loop.cancel();
        m.controller.borrow_mut().stop();
        drop(m.listeners);
        m.view.borrow_mut().remove();
        m.canvas.remove();
        log::info!("[mount] '{}' stopped", self.name);
    }

    pub fn play(&mut self) -> Result<(), JsValue> {
        let m = self
            .mounted
            .as_ref()
            .ok_or_else(|| JsValue::from_str("sketch is stopped"))?;
        let mut sched = m.frame_loop.scheduler();
        m.controller
            .borrow_mut()
            .play(&mut sched)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn pause(&self) {
        if let Some(m) = &self.mounted {
            m.controller.borrow_mut().pause();
        }
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.mounted
            .as_ref()
            .map(|m| m.controller.borrow().is_playing())
            .unwrap_or(false)
    }
}

impl Drop for SketchHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn mount_sketch(name: &str, config: &JsValue) -> anyhow::Result<SketchHandle> {
    let build = sketches::lookup(name).ok_or_else(|| {
        anyhow!(
            "unknown sketch (available: {})",
            sketches::names().collect::<Vec<_>>().join(", ")
        )
    })?;
    let config = MountConfig::from_js(config)?;
    let document = dom::window_document().ok_or_else(|| anyhow!("no document"))?;
    let header_offset = config.header_offset.unwrap_or(DEFAULT_HEADER_OFFSET);
    let canvas = dom::create_canvas(&document, &config.dom, header_offset)?;

    let mounted = async {
        let container = DomContainer::new(config.dom.clone());
        // backing store sized before the surface is first configured
        let (w, h) = ViewportSize::from_container(&container, header_offset).backing_size();
        canvas.set_width(w.max(1));
        canvas.set_height(h.max(1));

        let gpu = GpuContext::new(canvas.clone()).await?;
        let mut sketch = build(gpu)?;
        let panel = Rc::new(RefCell::new(DebugPanel::new(sketch.name())));
        sketch.build_panel(&mut panel.borrow_mut());

        let options = SketchOptions {
            header_offset,
            ..SketchOptions::default()
        };
        let controller: SharedController =
            Rc::new(RefCell::new(SketchController::new(sketch, options)));
        let viewport = controller.borrow_mut().configure(&container);
        log::info!(
            "[viewport] {}x{} @{} (header {}px)",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio,
            header_offset
        );

        let view = Rc::new(RefCell::new(PanelView::mount(
            &document,
            &config.dom,
            &panel,
            header_offset,
        )?));
        let frame_loop = FrameLoop::new(Rc::clone(&controller), Rc::clone(&panel), Rc::clone(&view));
        let listeners = events::attach(
            &document,
            &canvas,
            &config.dom,
            EventContext {
                controller: Rc::clone(&controller),
                panel,
                view: Rc::clone(&view),
                scheduler: frame_loop.scheduler(),
                storage_key: config.storage_key.clone(),
            },
        );
        controller
            .borrow_mut()
            .start(&mut frame_loop.scheduler())
            .map_err(|e| anyhow!("{e}"))?;
        Ok::<_, anyhow::Error>(Mounted {
            controller,
            frame_loop,
            listeners,
            view,
            canvas: canvas.clone(),
        })
    }
    .await;

    match mounted {
        Ok(mounted) => {
            log::info!("[mount] '{}' started", name);
            Ok(SketchHandle {
                name: name.to_string(),
                mounted: Some(mounted),
            })
        }
        Err(e) => {
            canvas.remove();
            Err(e)
        }
    }
}
