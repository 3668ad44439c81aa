use crate::panel::PanelView;
use crate::sketches::WebSketch;
use sketch_core::{DebugPanel, FrameScheduler, SketchController};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type SharedController = Rc<RefCell<SketchController<Box<dyn WebSketch>>>>;

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// `requestAnimationFrame` behind the controller's scheduler trait.
///
/// The tick closure lives in a shared slot; emptying the slot (see
/// [`FrameLoop::cancel`]) is what ends the chain for good.
#[derive(Clone)]
pub struct RafScheduler {
    slot: TickSlot,
    handle: Rc<Cell<Option<i32>>>,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) {
        let Some(w) = web::window() else {
            return;
        };
        let slot = self.slot.borrow();
        let Some(tick) = slot.as_ref() else {
            log::debug!("[loop] frame requested after cancel, ignored");
            return;
        };
        match w.request_animation_frame(tick.as_ref().unchecked_ref()) {
            Ok(id) => self.handle.set(Some(id)),
            Err(e) => log::error!("[loop] requestAnimationFrame failed: {:?}", e),
        }
    }
}

pub struct FrameLoop {
    scheduler: RafScheduler,
}

impl FrameLoop {
    pub fn new(
        controller: SharedController,
        panel: Rc<RefCell<DebugPanel>>,
        view: Rc<RefCell<PanelView>>,
    ) -> Self {
        let scheduler = RafScheduler {
            slot: Rc::new(RefCell::new(None)),
            handle: Rc::new(Cell::new(None)),
        };
        let mut sched = scheduler.clone();
        *scheduler.slot.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            sched.handle.set(None);
            let (stats, playing) = {
                let mut ctl = controller.borrow_mut();
                ctl.frame(&mut sched);
                (ctl.stats(), ctl.is_playing())
            };
            let report = panel.borrow_mut().sync();
            let mut view = view.borrow_mut();
            if !report.is_empty() {
                view.apply(&report);
            }
            view.show_stats(&stats, playing);
        }) as Box<dyn FnMut()>));
        Self { scheduler }
    }

    pub fn scheduler(&self) -> RafScheduler {
        self.scheduler.clone()
    }

    /// Cancel any pending callback and drop the tick closure, releasing
    /// everything it captured.
    pub fn cancel(&self) {
        if let Some(id) = self.scheduler.handle.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
        _ = self.scheduler.slot.borrow_mut().take();
    }
}
