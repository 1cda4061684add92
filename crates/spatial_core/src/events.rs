//! Event sources with scoped listeners
//!
//! The page-level listeners (scroll, resize, pointer moves) are registered
//! through an [`EventSource`]. Subscribing returns a [`Subscription`]; dropping
//! it removes the listener, so a component cannot leave a handler behind on the
//! window after it unmounts.

use crate::subscription::Subscription;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Unique identifier for a listener
    pub struct ListenerId;
}

type Listener<E> = Box<dyn FnMut(&E)>;

struct ListenerEntry<E> {
    seq: u64,
    /// `None` while the listener is running
    listener: Option<Listener<E>>,
}

struct ListenerSet<E> {
    listeners: SlotMap<ListenerId, ListenerEntry<E>>,
    next_seq: u64,
}

/// A set of listeners for one kind of event
pub struct EventSource<E: 'static> {
    inner: Rc<RefCell<ListenerSet<E>>>,
}

impl<E: 'static> EventSource<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenerSet {
                listeners: SlotMap::with_key(),
                next_seq: 0,
            })),
        }
    }

    /// Add a listener; it stays registered until the subscription drops
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let id = {
            let mut set = self.inner.borrow_mut();
            let seq = set.next_seq;
            set.next_seq += 1;
            set.listeners.insert(ListenerEntry {
                seq,
                listener: Some(Box::new(listener)),
            })
        };

        let weak: Weak<RefCell<ListenerSet<E>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let removed = inner.borrow_mut().listeners.remove(id);
                drop(removed);
            }
        })
    }

    /// Deliver `event` to every listener in subscription order
    ///
    /// Listeners may subscribe or unsubscribe (themselves or others) while the
    /// event is being delivered. A listener removed during delivery is skipped;
    /// one added during delivery first hears the next event.
    pub fn emit(&self, event: &E) -> usize {
        let ids: SmallVec<[(u64, ListenerId); 8]> = {
            let set = self.inner.borrow();
            let mut ids: SmallVec<[(u64, ListenerId); 8]> = set
                .listeners
                .iter()
                .filter(|(_, entry)| entry.listener.is_some())
                .map(|(id, entry)| (entry.seq, id))
                .collect();
            ids.sort_unstable_by_key(|(seq, _)| *seq);
            ids
        };

        let mut delivered = 0;
        for (_, id) in ids {
            let taken = self
                .inner
                .borrow_mut()
                .listeners
                .get_mut(id)
                .and_then(|entry| entry.listener.take());
            let Some(mut listener) = taken else {
                continue;
            };

            listener(event);
            delivered += 1;

            let mut set = self.inner.borrow_mut();
            if let Some(entry) = set.listeners.get_mut(id) {
                entry.listener = Some(listener);
            } else {
                drop(set);
                drop(listener);
            }
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl<E: 'static> Default for EventSource<E> {
    fn default() -> Self {
        Self::new()
    }
}
