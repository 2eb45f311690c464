//! Typed publish-subscribe primitive
//!
//! An [`Emitter`] is owned by the object that fires it; an [`Event`] is the
//! subscribe-only view handed out to listeners. Dispatch is synchronous, in
//! subscription order, with no queuing. A listener that fires another event
//! runs that nested dispatch to completion before the outer one resumes.
//!
//! Emitters created with `replay: true` remember the last fired value and
//! hand it to every new subscriber at subscribe time.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::lifecycle::{Disposable, Subscription};

type Listener<T> = Rc<dyn Fn(&T)>;

/// Construction options for an [`Emitter`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitterOptions {
    /// Late subscribers receive the most recently fired value immediately
    pub replay: bool,
}

struct EmitterInner<T> {
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_listener_id: Cell<u64>,
    last: RefCell<Option<T>>,
    options: EmitterOptions,
    disposed: Cell<bool>,
}

impl<T> EmitterInner<T> {
    fn is_registered(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|(lid, _)| *lid == id)
    }

    fn remove(&self, id: u64) {
        // Drop the listener outside the borrow; its captures may re-enter
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            listeners
                .iter()
                .position(|(lid, _)| *lid == id)
                .map(|index| listeners.remove(index))
        };
        drop(removed);
    }
}

/// The firing side of an event stream
pub struct Emitter<T> {
    inner: Rc<EmitterInner<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Emitter<T> {
    pub fn new() -> Self {
        Self::with_options(EmitterOptions::default())
    }

    /// Emitter whose late subscribers receive the last fired value
    pub fn replay() -> Self {
        Self::with_options(EmitterOptions { replay: true })
    }

    pub fn with_options(options: EmitterOptions) -> Self {
        Self {
            inner: Rc::new(EmitterInner {
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                last: RefCell::new(None),
                options,
                disposed: Cell::new(false),
            }),
        }
    }

    /// Subscribe-only view of this emitter
    pub fn event(&self) -> Event<T> {
        Event {
            inner: self.inner.clone(),
        }
    }

    /// Invoke every currently subscribed listener with `value`
    ///
    /// Listeners removed by an earlier listener during the same dispatch are
    /// skipped. Firing a disposed emitter does nothing.
    pub fn fire(&self, value: T) {
        if self.inner.disposed.get() {
            return;
        }
        if self.inner.options.replay {
            *self.inner.last.borrow_mut() = Some(value.clone());
        }

        let snapshot: Vec<(u64, Listener<T>)> = self.inner.listeners.borrow().clone();
        tracing::trace!(listeners = snapshot.len(), "dispatching event");
        for (id, listener) in snapshot {
            if self.inner.disposed.get() {
                break;
            }
            if !self.inner.is_registered(id) {
                continue;
            }
            listener(&value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn has_listeners(&self) -> bool {
        self.listener_count() > 0
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl<T> Disposable for Emitter<T> {
    fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let listeners = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        let last = self.inner.last.borrow_mut().take();
        drop(listeners);
        drop(last);
    }
}

/// The subscribing side of an event stream
pub struct Event<T> {
    inner: Rc<EmitterInner<T>>,
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Event<T> {
    /// Register `listener`; dispose the returned handle to unregister it
    ///
    /// On a replay stream that has fired at least once, the listener is
    /// called with the last value before this returns.
    #[must_use = "dispose the subscription or hand it to a CompositeDisposable"]
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        if self.inner.disposed.get() {
            return Subscription::empty();
        }

        let listener: Listener<T> = Rc::new(listener);
        if self.inner.options.replay {
            let last = self.inner.last.borrow().clone();
            if let Some(last) = last {
                listener(&last);
            }
        }

        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, listener));

        let weak: Weak<EmitterInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove(id);
            }
        })
    }
}
