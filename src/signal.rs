//! Synchronous observer lists and the replay-latest value signal.
//!
//! Everything here is single threaded. Notification runs on the caller's stack
//! and has finished by the time the outermost `notify`/`set` returns.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::{Rc, Weak},
};

type Handler<A, R> = Rc<RefCell<dyn FnMut(&A) -> R>>;

struct Slots<A, R> {
    next_id: u64,
    handlers: Vec<(u64, Handler<A, R>)>,
}

/// An ordered list of handlers notified synchronously, in subscription order.
///
/// `R` is what each handler reports back; the culture registry uses it to
/// collect lookup failures from its units.
///
/// A `notify` issued from inside a handler is queued and delivered to every
/// handler once the current round finishes, still before the outermost
/// `notify` returns. Events therefore reach each handler in the order they
/// were raised and no handler is ever re-entered.
pub struct Observers<A, R = ()> {
    slots: Rc<RefCell<Slots<A, R>>>,
    pending: RefCell<VecDeque<A>>,
    delivering: Cell<bool>,
}

impl<A: Clone + 'static, R: 'static> Observers<A, R> {
    pub fn new() -> Self {
        Observers {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
            })),
            pending: RefCell::new(VecDeque::new()),
            delivering: Cell::new(false),
        }
    }

    /// Registers `handler` until the returned guard is dropped.
    pub fn subscribe(&self, handler: impl FnMut(&A) -> R + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            let handler: Handler<A, R> = Rc::new(RefCell::new(handler));
            slots.handlers.push((id, handler));
            id
        };

        let weak: Weak<RefCell<Slots<A, R>>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.borrow_mut().handlers.retain(|(slot, _)| *slot != id);
            }
        })
    }

    /// Calls every handler with `arg` and returns what they reported.
    ///
    /// Each round snapshots the handler list, so handlers may subscribe or
    /// unsubscribe while being notified. A nested call only queues its event
    /// and returns nothing; the results of queued rounds are returned by the
    /// outermost call.
    pub fn notify(&self, arg: &A) -> Vec<R> {
        self.pending.borrow_mut().push_back(arg.clone());
        if self.delivering.get() {
            tracing::trace!(
                queued = self.pending.borrow().len(),
                "queued nested notification"
            );
            return Vec::new();
        }

        let _delivering = DeliveringGuard::enter(&self.delivering);
        let mut results = Vec::new();
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(arg) = next else {
                break;
            };
            let snapshot: Vec<(u64, Handler<A, R>)> = self.slots.borrow().handlers.clone();
            for (id, handler) in snapshot {
                if self.is_subscribed(id) {
                    results.push((&mut *handler.borrow_mut())(&arg));
                }
            }
        }
        results
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every handler. Outstanding guards become no-ops.
    pub fn clear(&self) {
        self.slots.borrow_mut().handlers.clear();
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.slots.borrow().handlers.iter().any(|(slot, _)| *slot == id)
    }
}

impl<A: Clone + 'static, R: 'static> Default for Observers<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the delivering flag even if a handler panics.
struct DeliveringGuard<'a>(&'a Cell<bool>);

impl<'a> DeliveringGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        DeliveringGuard(flag)
    }
}

impl Drop for DeliveringGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<A, R> fmt::Debug for Observers<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.slots.borrow().handlers.len())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

/// A value cell that replays its latest value to every new subscriber.
pub struct ValueSignal<T> {
    current: RefCell<T>,
    observers: Observers<T>,
}

impl<T: Clone + 'static> ValueSignal<T> {
    pub fn new(initial: T) -> Self {
        ValueSignal {
            current: RefCell::new(initial),
            observers: Observers::new(),
        }
    }

    pub fn get(&self) -> T {
        self.current.borrow().clone()
    }

    /// Stores `value`, then notifies every subscriber with it.
    pub fn set(&self, value: T) {
        *self.current.borrow_mut() = value.clone();
        self.observers.notify(&value);
    }

    /// Delivers the current value to `handler` immediately, then every later one.
    pub fn subscribe(&self, mut handler: impl FnMut(&T) + 'static) -> Subscription {
        let current = self.get();
        handler(&current);
        self.observers.subscribe(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    pub fn clear_subscribers(&self) {
        self.observers.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSignal")
            .field("current", &self.current.borrow())
            .field("observers", &self.observers)
            .finish()
    }
}

/// Keeps a handler registered. Dropping the guard unregisters it.
#[must_use = "dropping a Subscription unsubscribes its handler immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Subscription {
            release: Some(Box::new(release)),
        }
    }

    /// Unregisters the handler now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    /// Leaves the handler registered for as long as its source lives.
    pub fn detach(mut self) {
        self.release = None;
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
