//! Single-threaded signal/handler registry.
//!
//! Toolkit objects expose their events as [`Signal`]s. Connecting a handler
//! returns a [`Subscription`]; dropping the subscription disconnects the
//! handler again. Handlers run synchronously on the GUI thread in the order
//! they were connected.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

/// Whether a handler consumed a signal or let the default action run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The event was handled; later handlers and the default action are skipped.
    Stop,
    /// Continue with the next handler, then the default action.
    Proceed,
}

/// Identifies one connected handler within a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

type Handler<A, R> = Rc<dyn Fn(&A) -> R>;

struct Slots<A, R> {
    next_id: u64,
    handlers: Vec<(HandlerId, Handler<A, R>)>,
}

trait Detach {
    fn detach(&self, id: HandlerId) -> bool;
    fn contains(&self, id: HandlerId) -> bool;
}

impl<A, R> Detach for RefCell<Slots<A, R>> {
    fn detach(&self, id: HandlerId) -> bool {
        // The removed closure is dropped after the borrow ends: it may own
        // subscriptions of its own.
        let removed = {
            let mut slots = self.borrow_mut();
            slots
                .handlers
                .iter()
                .position(|(h, _)| *h == id)
                .map(|pos| slots.handlers.remove(pos))
        };
        removed.is_some()
    }

    fn contains(&self, id: HandlerId) -> bool {
        self.borrow().handlers.iter().any(|(h, _)| *h == id)
    }
}

/// A named event source with handlers taking `&A` and returning `R`.
pub struct Signal<A, R = ()> {
    name: &'static str,
    slots: Rc<RefCell<Slots<A, R>>>,
}

impl<A: 'static, R: 'static> Signal<A, R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Rc::new(RefCell::new(Slots { next_id: 1, handlers: Vec::new() })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers `handler`; it stays connected while the returned
    /// subscription is alive (or forever, after [`Subscription::forget`]).
    pub fn connect<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&A) -> R + 'static,
    {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = HandlerId(slots.next_id);
            slots.next_id += 1;
            slots.handlers.push((id, Rc::new(handler)));
            id
        };
        trace!(signal = self.name, handler = id.0, "handler connected");

        let weak: Weak<dyn Detach> = Rc::downgrade(&self.slots) as Weak<dyn Detach>;
        Subscription {
            id,
            signal: self.name,
            slots: Some(weak),
        }
    }

    pub fn handler_count(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    /// Disconnects every handler, as a widget does when it is destroyed.
    pub fn clear(&self) {
        let dropped = std::mem::take(&mut self.slots.borrow_mut().handlers);
        if !dropped.is_empty() {
            trace!(signal = self.name, count = dropped.len(), "handlers cleared");
        }
        drop(dropped);
    }

    /// Snapshot of the current handlers, so handlers may connect or
    /// disconnect while the signal is being emitted.
    fn snapshot(&self) -> Vec<(HandlerId, Handler<A, R>)> {
        self.slots
            .borrow()
            .handlers
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect()
    }

    fn still_connected(&self, id: HandlerId) -> bool {
        self.slots.contains(id)
    }
}

impl<A: 'static> Signal<A, ()> {
    /// Runs every connected handler.
    pub fn emit(&self, args: &A) {
        trace!(signal = self.name, "emit");
        for (id, handler) in self.snapshot() {
            if self.still_connected(id) {
                handler(args);
            }
        }
    }
}

impl<A: 'static> Signal<A, Propagation> {
    /// Runs handlers until one returns [`Propagation::Stop`].
    pub fn emit(&self, args: &A) -> Propagation {
        trace!(signal = self.name, "emit");
        for (id, handler) in self.snapshot() {
            if self.still_connected(id) && handler(args) == Propagation::Stop {
                return Propagation::Stop;
            }
        }
        Propagation::Proceed
    }
}

impl<A, R> fmt::Debug for Signal<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("handlers", &self.slots.borrow().handlers.len())
            .finish()
    }
}

/// Disposable registration of a signal handler.
#[must_use = "dropping a Subscription disconnects its handler"]
pub struct Subscription {
    id: HandlerId,
    signal: &'static str,
    slots: Option<Weak<dyn Detach>>,
}

impl Subscription {
    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn signal_name(&self) -> &'static str {
        self.signal
    }

    /// False once disconnected, or once the owning signal was cleared or dropped.
    pub fn is_connected(&self) -> bool {
        self.slots
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|slots| slots.contains(self.id))
            .unwrap_or(false)
    }

    pub fn disconnect(mut self) {
        self.detach();
    }

    /// Leaves the handler connected for as long as the signal exists.
    pub fn forget(mut self) {
        self.slots = None;
    }

    fn detach(&mut self) {
        if let Some(slots) = self.slots.take().and_then(|w| w.upgrade()) {
            if slots.detach(self.id) {
                trace!(signal = self.signal, handler = self.id.0, "handler disconnected");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("signal", &self.signal)
            .finish()
    }
}
