use crate::render::GpuContext;
use sketch_core::{Camera, DebugPanel, InteractionMode, Observed, Sketch};

mod particles;
mod waves;

/// A sketch the web front-end can mount: scene content plus the hooks the
/// keyboard shortcuts and the debug panel need.
pub trait WebSketch: Sketch {
    fn name(&self) -> &'static str;

    /// Register this sketch's controls.
    fn build_panel(&mut self, panel: &mut DebugPanel);

    fn mode(&self) -> Option<InteractionMode> {
        None
    }

    /// Switch interaction mode. Returns false when the sketch has no such mode.
    fn set_mode(&mut self, _mode: InteractionMode) -> bool {
        false
    }

    /// Camera shared with the panel and the save/load shortcuts.
    fn camera(&self) -> Option<Observed<Camera>> {
        None
    }

    /// Called after a persisted camera was written into [`WebSketch::camera`].
    fn on_camera_restored(&mut self) {}
}

pub type SketchConstructor = fn(GpuContext) -> anyhow::Result<Box<dyn WebSketch>>;

pub static SKETCHES: &[(&str, SketchConstructor)] = &[
    ("waves", waves::build),
    ("particles", particles::build),
];

pub fn lookup(name: &str) -> Option<SketchConstructor> {
    SKETCHES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ctor)| *ctor)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    SKETCHES.iter().map(|(n, _)| *n)
}
