#![forbid(unsafe_code)]

//! Listener bookkeeping and the RAII [`Subscription`] guard.
//!
//! # Invariants
//!
//! 1. Listeners are invoked in registration order.
//! 2. Dropping (or explicitly unsubscribing) a [`Subscription`] removes
//!    exactly the listener it was created for, before the next notification
//!    cycle starts.
//! 3. A listener subscribed during a notification is first called in the
//!    next cycle. A listener unsubscribed during a notification is skipped
//!    for the rest of the current cycle if it has not been reached yet.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub(crate) type Listener<T> = Rc<dyn Fn(&[T])>;

/// Ordered set of listeners keyed by a monotonically increasing id.
pub(crate) struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

impl<T> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, listener: Listener<T>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(lid, _)| *lid != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.entries.borrow().iter().any(|(lid, _)| *lid == id)
    }

    /// Clone the current listener list so callbacks run without any borrow
    /// held. Callers must re-check [`contains`](Self::contains) before each
    /// call.
    pub(crate) fn snapshot(&self) -> Vec<(u64, Listener<T>)> {
        self.entries
            .borrow()
            .iter()
            .map(|(id, l)| (*id, Rc::clone(l)))
            .collect()
    }
}

/// RAII guard for a store listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    /// Whether the listener is still registered through this guard.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
