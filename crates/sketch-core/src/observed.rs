//! Shared, change-publishing cells for state that debug controls bind to.
//!
//! Every mutation through [`Observed::modify`] raises the flag of each live
//! [`Watch`], so readers learn about external changes without being told to
//! refresh. Watches are pull-based flags rather than callbacks; a
//! notification never re-enters the code that caused it.

use smallvec::SmallVec;
use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

struct Inner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    watchers: RefCell<SmallVec<[Weak<Cell<bool>>; 4]>>,
}

impl<T> Inner<T> {
    fn publish(&self) {
        self.version.set(self.version.get().wrapping_add(1));
        self.watchers.borrow_mut().retain(|w| match w.upgrade() {
            Some(flag) => {
                flag.set(true);
                true
            }
            None => false,
        });
    }
}

pub struct Observed<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Observed<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                version: Cell::new(0),
                watchers: RefCell::new(SmallVec::new()),
            }),
        }
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.value.borrow()
    }

    /// Mutate and publish.
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        self.inner.publish();
        out
    }

    /// Mutate, publishing only when `f` reports a change.
    pub fn modify_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        if changed {
            self.inner.publish();
        }
        changed
    }

    pub fn replace(&self, value: T) -> T {
        self.modify(|v| std::mem::replace(v, value))
    }

    /// Number of publishes so far.
    #[inline]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Subscribe to future changes.
    pub fn watch(&self) -> Watch {
        let flag = Rc::new(Cell::new(false));
        self.inner.watchers.borrow_mut().push(Rc::downgrade(&flag));
        Watch { flag }
    }

    pub fn downgrade(&self) -> WeakObserved<T> {
        WeakObserved {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: Clone> Observed<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: Default> Default for Observed<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observed")
            .field("value", &self.inner.value)
            .field("version", &self.inner.version.get())
            .finish()
    }
}

/// Non-owning handle; bindings hold these so they never keep a target alive.
pub struct WeakObserved<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Clone for WeakObserved<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> WeakObserved<T> {
    pub fn upgrade(&self) -> Option<Observed<T>> {
        self.inner.upgrade().map(|inner| Observed { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// Change flag raised on every publish of the watched cell.
#[derive(Debug)]
pub struct Watch {
    flag: Rc<Cell<bool>>,
}

impl Watch {
    /// Returns and clears the pending flag.
    pub fn take(&self) -> bool {
        self.flag.replace(false)
    }

    pub fn is_pending(&self) -> bool {
        self.flag.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_raises_every_watch_once() {
        let cell = Observed::new(1.0_f32);
        let a = cell.watch();
        let b = cell.watch();
        cell.modify(|v| *v = 2.0);
        assert!(a.take());
        assert!(!a.take());
        assert!(b.is_pending());
        assert_eq!(cell.version(), 1);
    }

    #[test]
    fn modify_if_skips_unchanged() {
        let cell = Observed::new(0_u32);
        let w = cell.watch();
        assert!(!cell.modify_if(|_| false));
        assert!(!w.is_pending());
        assert!(cell.modify_if(|v| {
            *v += 1;
            true
        }));
        assert!(w.take());
    }

    #[test]
    fn dropped_watches_are_pruned_and_weak_handles_expire() {
        let cell = Observed::new(String::from("a"));
        let weak = cell.downgrade();
        drop(cell.watch());
        cell.replace("b".into());
        assert_eq!(weak.upgrade().map(|c| c.get()), Some("b".to_string()));
        drop(cell);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }
}
