//! Platform-free model of a debug panel: folders and bound controls.
//!
//! The DOM front-end renders this model and forwards edits through
//! [`DebugPanel::set`]. Once per frame it calls [`DebugPanel::sync`], which
//! pulls fresh values for controls whose targets changed elsewhere and
//! detaches controls whose targets are gone.

use crate::binding::{
    BindValue, Binding, BindingError, ControlKind, ControlValue, ErasedBinding, Lens,
    NumberRange, OnChange,
};
use crate::observed::Observed;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FolderId(pub u32);

/// Builder for per-control options.
pub struct ControlOptions<T, V> {
    label: Option<String>,
    folder: Option<FolderId>,
    range: Option<NumberRange>,
    on_change: Option<OnChange<T, V>>,
}

impl<T, V> Default for ControlOptions<T, V> {
    fn default() -> Self {
        Self {
            label: None,
            folder: None,
            range: None,
            on_change: None,
        }
    }
}

impl<T, V> ControlOptions<T, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn folder(mut self, folder: FolderId) -> Self {
        self.folder = Some(folder);
        self
    }

    /// Called with the target after each panel edit that changed it.
    pub fn on_change(mut self, f: impl Fn(&mut T, V) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }
}

impl<T> ControlOptions<T, f32> {
    pub fn range(mut self, min: f32, max: f32) -> Self {
        let step = self.range.and_then(|r| r.step);
        let mut r = NumberRange::new(min, max);
        r.step = step;
        self.range = Some(r);
        self
    }

    pub fn step(mut self, step: f32) -> Self {
        self.range = Some(self.range.unwrap_or_default().with_step(step));
        self
    }
}

pub type NumberOptions<T> = ControlOptions<T, f32>;

pub struct Control {
    handle: BindingHandle,
    label: String,
    folder: Option<FolderId>,
    value: ControlValue,
    binding: Box<dyn ErasedBinding>,
}

impl Control {
    #[inline]
    pub fn handle(&self) -> BindingHandle {
        self.handle
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn folder(&self) -> Option<FolderId> {
        self.folder
    }

    /// Value as last displayed.
    #[inline]
    pub fn value(&self) -> ControlValue {
        self.value
    }

    #[inline]
    pub fn kind(&self) -> ControlKind {
        self.binding.kind()
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        self.binding.path()
    }
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("handle", &self.handle)
            .field("label", &self.label)
            .field("path", &self.path())
            .field("value", &self.value)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
}

/// Outcome of one [`DebugPanel::sync`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    pub updated: Vec<(BindingHandle, ControlValue)>,
    pub detached: Vec<BindingHandle>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.detached.is_empty()
    }
}

pub struct DebugPanel {
    title: String,
    visible: bool,
    folders: Vec<Folder>,
    controls: Vec<Control>,
    next_handle: u32,
    next_folder: u32,
}

impl DebugPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            visible: true,
            folders: Vec::new(),
            controls: Vec::new(),
            next_handle: 1,
            next_folder: 1,
        }
    }

    pub fn add_folder(&mut self, name: impl Into<String>) -> FolderId {
        let id = FolderId(self.next_folder);
        self.next_folder += 1;
        self.folders.push(Folder {
            id,
            name: name.into(),
        });
        id
    }

    /// Bind a field of `target` to a new control.
    pub fn bind<T: 'static, V: BindValue>(
        &mut self,
        target: &Observed<T>,
        lens: Lens<T, V>,
        options: ControlOptions<T, V>,
    ) -> BindingHandle {
        let handle = BindingHandle(self.next_handle);
        self.next_handle += 1;
        let value = (lens.get)(&target.borrow()).to_control();
        let binding = Binding::new(target, lens, options.range, options.on_change);
        let label = options.label.unwrap_or_else(|| lens.path.to_string());
        log::debug!("[panel] bind #{} '{}' -> {}", handle.0, label, lens.path);
        self.controls.push(Control {
            handle,
            label,
            folder: options.folder,
            value,
            binding: Box::new(binding),
        });
        handle
    }

    pub fn bind_number<T: 'static>(
        &mut self,
        target: &Observed<T>,
        lens: Lens<T, f32>,
        options: NumberOptions<T>,
    ) -> BindingHandle {
        self.bind(target, lens, options)
    }

    pub fn bind_color<T: 'static>(
        &mut self,
        target: &Observed<T>,
        lens: Lens<T, [f32; 3]>,
        options: ControlOptions<T, [f32; 3]>,
    ) -> BindingHandle {
        self.bind(target, lens, options)
    }

    pub fn bind_toggle<T: 'static>(
        &mut self,
        target: &Observed<T>,
        lens: Lens<T, bool>,
        options: ControlOptions<T, bool>,
    ) -> BindingHandle {
        self.bind(target, lens, options)
    }

    fn index_of(&self, handle: BindingHandle) -> Result<usize, BindingError> {
        self.controls
            .iter()
            .position(|c| c.handle == handle)
            .ok_or(BindingError::UnknownHandle(handle.0))
    }

    /// Apply a panel edit. Returns the value stored on the target after
    /// clamping and step snapping.
    pub fn set(
        &mut self,
        handle: BindingHandle,
        value: ControlValue,
    ) -> Result<ControlValue, BindingError> {
        let idx = self.index_of(handle)?;
        let control = &mut self.controls[idx];
        let stored = control.binding.write(value)?;
        control.value = stored;
        Ok(stored)
    }

    /// Explicitly pull the target's value into the control.
    pub fn refresh(&mut self, handle: BindingHandle) -> Result<ControlValue, BindingError> {
        let idx = self.index_of(handle)?;
        let control = &mut self.controls[idx];
        let value = control.binding.read()?;
        control.binding.take_changed();
        control.value = value;
        Ok(value)
    }

    /// Pull values for every control whose target published a change and
    /// detach controls whose target was dropped.
    pub fn sync(&mut self) -> SyncReport {
        let mut report = SyncReport::default();
        self.controls.retain_mut(|control| {
            if !control.binding.is_alive() {
                log::warn!(
                    "[panel] detaching '{}': target dropped",
                    control.label
                );
                report.detached.push(control.handle);
                return false;
            }
            if control.binding.take_changed() {
                if let Ok(value) = control.binding.read() {
                    if value != control.value {
                        control.value = value;
                        report.updated.push((control.handle, value));
                    }
                }
            }
            true
        });
        report
    }

    pub fn value(&self, handle: BindingHandle) -> Option<ControlValue> {
        self.control(handle).map(Control::value)
    }

    pub fn control(&self, handle: BindingHandle) -> Option<&Control> {
        self.controls.iter().find(|c| c.handle == handle)
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Controls in `folder`, or the top-level ones for `None`.
    pub fn controls_in(&self, folder: Option<FolderId>) -> impl Iterator<Item = &Control> {
        self.controls.iter().filter(move |c| c.folder == folder)
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Drop every control and folder.
    pub fn clear(&mut self) {
        self.controls.clear();
        self.folders.clear();
    }
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self::new("Controls")
    }
}
