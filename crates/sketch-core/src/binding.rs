//! Two-way channels between panel controls and fields of observed targets.
//!
//! A binding never owns its target. It holds a [`WeakObserved`] plus a
//! [`Lens`] naming the field, and a [`Watch`] raised whenever anything
//! mutates the target through the observed cell.

use crate::observed::{Observed, Watch, WeakObserved};
use thiserror::Error;

/// Named accessor pair for one field of `T`.
pub struct Lens<T, V> {
    pub path: &'static str,
    pub get: fn(&T) -> V,
    pub set: fn(&mut T, V),
}

impl<T, V> Clone for Lens<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Lens<T, V> {}

impl<T, V> Lens<T, V> {
    pub const fn new(path: &'static str, get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        Self { path, get, set }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Color([f32; 3]),
    Toggle(bool),
}

impl ControlValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ControlValue::Number(_) => "number",
            ControlValue::Color(_) => "color",
            ControlValue::Toggle(_) => "toggle",
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match *self {
            ControlValue::Number(v) => Some(v),
            _ => None,
        }
    }
}

/// Inclusive numeric range with an optional step grid anchored at `min`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberRange {
    pub min: f32,
    pub max: f32,
    pub step: Option<f32>,
}

impl Default for NumberRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl NumberRange {
    pub fn new(min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            step: None,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            min: f32::NEG_INFINITY,
            max: f32::INFINITY,
            step: None,
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = (step.is_finite() && step > 0.0).then_some(step);
        self
    }

    /// Clamp into range, then snap onto the step grid. A value already on
    /// the grid (within float noise) is returned unchanged so it is stored
    /// exactly as given.
    pub fn snap(&self, value: f32) -> f32 {
        let v = value.clamp(self.min, self.max);
        let Some(step) = self.step else {
            return v;
        };
        let base = if self.min.is_finite() { self.min } else { 0.0 };
        let snapped = base + ((v - base) / step).round() * step;
        if (snapped - v).abs() <= step * 1e-4 {
            v
        } else {
            snapped.clamp(self.min, self.max)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlKind {
    Number(NumberRange),
    Color,
    Toggle,
}

#[derive(Debug, Error, PartialEq)]
pub enum BindingError {
    #[error("binding target for '{path}' was dropped")]
    TargetDropped { path: &'static str },
    #[error("'{path}' expects a {expected} value, got {got}")]
    TypeMismatch {
        path: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    #[error("no control with handle {0}")]
    UnknownHandle(u32),
    #[error("'{path}' rejects non-finite value {value}")]
    NotFinite { path: &'static str, value: f32 },
}

/// Types a control can edit.
pub trait BindValue: Copy + PartialEq + 'static {
    const TYPE_NAME: &'static str;

    fn kind(range: Option<NumberRange>) -> ControlKind;
    fn to_control(self) -> ControlValue;
    fn from_control(value: ControlValue) -> Option<Self>;
}

impl BindValue for f32 {
    const TYPE_NAME: &'static str = "number";

    fn kind(range: Option<NumberRange>) -> ControlKind {
        ControlKind::Number(range.unwrap_or_default())
    }

    fn to_control(self) -> ControlValue {
        ControlValue::Number(self)
    }

    fn from_control(value: ControlValue) -> Option<Self> {
        value.as_number()
    }
}

impl BindValue for [f32; 3] {
    const TYPE_NAME: &'static str = "color";

    fn kind(_: Option<NumberRange>) -> ControlKind {
        ControlKind::Color
    }

    fn to_control(self) -> ControlValue {
        ControlValue::Color(self)
    }

    fn from_control(value: ControlValue) -> Option<Self> {
        match value {
            ControlValue::Color(c) => Some(c),
            _ => None,
        }
    }
}

impl BindValue for bool {
    const TYPE_NAME: &'static str = "toggle";

    fn kind(_: Option<NumberRange>) -> ControlKind {
        ControlKind::Toggle
    }

    fn to_control(self) -> ControlValue {
        ControlValue::Toggle(self)
    }

    fn from_control(value: ControlValue) -> Option<Self> {
        match value {
            ControlValue::Toggle(b) => Some(b),
            _ => None,
        }
    }
}

pub type OnChange<T, V> = Box<dyn Fn(&mut T, V)>;

/// Type-erased view used by the panel.
pub trait ErasedBinding {
    fn path(&self) -> &'static str;
    fn kind(&self) -> ControlKind;
    fn is_alive(&self) -> bool;
    /// Current target value.
    fn read(&self) -> Result<ControlValue, BindingError>;
    /// Panel-initiated edit; returns the value actually stored.
    fn write(&self, value: ControlValue) -> Result<ControlValue, BindingError>;
    /// Whether the target changed since the last call.
    fn take_changed(&self) -> bool;
}

pub struct Binding<T, V: BindValue> {
    target: WeakObserved<T>,
    lens: Lens<T, V>,
    kind: ControlKind,
    watch: Watch,
    on_change: Option<OnChange<T, V>>,
}

impl<T, V: BindValue> Binding<T, V> {
    pub fn new(
        target: &Observed<T>,
        lens: Lens<T, V>,
        range: Option<NumberRange>,
        on_change: Option<OnChange<T, V>>,
    ) -> Self {
        Self {
            target: target.downgrade(),
            lens,
            kind: V::kind(range),
            watch: target.watch(),
            on_change,
        }
    }

    fn upgrade(&self) -> Result<Observed<T>, BindingError> {
        self.target.upgrade().ok_or(BindingError::TargetDropped {
            path: self.lens.path,
        })
    }

    fn coerce(&self, value: ControlValue) -> Result<V, BindingError> {
        let path = self.lens.path;
        if let ControlKind::Number(range) = self.kind {
            let n = value.as_number().ok_or(BindingError::TypeMismatch {
                path,
                expected: V::TYPE_NAME,
                got: value.type_name(),
            })?;
            if !n.is_finite() {
                return Err(BindingError::NotFinite { path, value: n });
            }
            return V::from_control(ControlValue::Number(range.snap(n))).ok_or(
                BindingError::TypeMismatch {
                    path,
                    expected: V::TYPE_NAME,
                    got: value.type_name(),
                },
            );
        }
        let value = match value {
            ControlValue::Color(c) => ControlValue::Color(c.map(|x| {
                if x.is_finite() {
                    x.clamp(0.0, 1.0)
                } else {
                    0.0
                }
            })),
            other => other,
        };
        V::from_control(value).ok_or(BindingError::TypeMismatch {
            path,
            expected: V::TYPE_NAME,
            got: value.type_name(),
        })
    }
}

impl<T: 'static, V: BindValue> ErasedBinding for Binding<T, V> {
    fn path(&self) -> &'static str {
        self.lens.path
    }

    fn kind(&self) -> ControlKind {
        self.kind
    }

    fn is_alive(&self) -> bool {
        self.target.is_alive()
    }

    fn read(&self) -> Result<ControlValue, BindingError> {
        let target = self.upgrade()?;
        let value = (self.lens.get)(&target.borrow());
        Ok(value.to_control())
    }

    fn write(&self, value: ControlValue) -> Result<ControlValue, BindingError> {
        let target = self.upgrade()?;
        let v = self.coerce(value)?;
        let lens = self.lens;
        let on_change = self.on_change.as_ref();
        target.modify_if(|t| {
            if (lens.get)(t) == v {
                return false;
            }
            (lens.set)(t, v);
            if let Some(cb) = on_change {
                cb(t, v);
            }
            true
        });
        // Our own write needs no pull on the next sync.
        self.watch.take();
        let stored = (lens.get)(&target.borrow());
        Ok(stored.to_control())
    }

    fn take_changed(&self) -> bool {
        self.watch.take()
    }
}
