//! Ownership and teardown primitives
//!
//! Every stateful object in the layout engine aggregates the resources it
//! creates (event subscriptions, emitters, child objects) and releases them
//! exactly once. Release is always explicit: dropping a handle does NOT
//! dispose it, so a subscription stays live until someone calls `dispose()`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A resource that can be released
///
/// Implementations must tolerate being disposed more than once; every call
/// after the first is a no-op.
pub trait Disposable {
    fn dispose(&self);
}

impl<T: Disposable + ?Sized> Disposable for Rc<T> {
    fn dispose(&self) {
        (**self).dispose();
    }
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
    fn dispose(&self) {
        (**self).dispose();
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle returned when subscribing to an event
///
/// Disposing it unregisters exactly one listener. Idempotent.
pub struct Subscription {
    release: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Create a subscription that runs `release` on first dispose
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: RefCell::new(Some(Box::new(release))),
        }
    }

    /// A subscription with nothing to release
    pub fn empty() -> Self {
        Self {
            release: RefCell::new(None),
        }
    }

    /// Whether this handle still has something to release
    pub fn is_live(&self) -> bool {
        self.release.borrow().is_some()
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        // Take before calling so a release that re-enters sees an empty slot
        let release = self.release.borrow_mut().take();
        if let Some(release) = release {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.is_live())
            .finish()
    }
}

// ============================================================================
// CompositeDisposable
// ============================================================================

/// Aggregates owned resources and releases them together
///
/// Resources are released in registration order. Nothing in this crate
/// depends on that order; a call site that does must say so.
#[derive(Default)]
pub struct CompositeDisposable {
    items: RefCell<Vec<Box<dyn Disposable>>>,
    disposed: Cell<bool>,
}

impl CompositeDisposable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register ownership of a resource
    ///
    /// A composite that is already disposed releases the resource immediately.
    pub fn add(&self, item: impl Disposable + 'static) {
        if self.disposed.get() {
            item.dispose();
            return;
        }
        self.items.borrow_mut().push(Box::new(item));
    }

    /// Register ownership of several resources at once
    pub fn add_all(&self, items: impl IntoIterator<Item = Box<dyn Disposable>>) {
        for item in items {
            self.add(item);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Number of resources currently held
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Disposable for CompositeDisposable {
    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let items = std::mem::take(&mut *self.items.borrow_mut());
        for item in items {
            item.dispose();
        }
    }
}

// ============================================================================
// MutableDisposable
// ============================================================================

/// A single replaceable resource slot
///
/// Setting a new value disposes the previous one first, so the slot never
/// holds two live resources.
#[derive(Default)]
pub struct MutableDisposable {
    value: RefCell<Option<Box<dyn Disposable>>>,
    disposed: Cell<bool>,
}

impl MutableDisposable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held resource, disposing the old one before adopting `value`
    pub fn set(&self, value: impl Disposable + 'static) {
        self.set_value(Some(Box::new(value)));
    }

    /// Release the held resource without adopting a new one
    pub fn clear(&self) {
        self.set_value(None);
    }

    pub fn set_value(&self, value: Option<Box<dyn Disposable>>) {
        let previous = self.value.borrow_mut().take();
        if let Some(previous) = previous {
            previous.dispose();
        }

        if self.disposed.get() {
            if let Some(value) = value {
                value.dispose();
            }
            return;
        }
        *self.value.borrow_mut() = value;
    }

    pub fn has_value(&self) -> bool {
        self.value.borrow().is_some()
    }
}

impl Disposable for MutableDisposable {
    fn dispose(&self) {
        self.disposed.set(true);
        self.clear();
    }
}
