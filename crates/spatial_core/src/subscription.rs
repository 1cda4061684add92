//! Scoped subscriptions
//!
//! Every listener or scheduled callback registered on behalf of a component is
//! paired with a [`Subscription`]. The subscription owns the matching
//! unregistration and runs it exactly once: on [`Subscription::dispose`] or when
//! the subscription is dropped, whichever comes first. Holding subscriptions in a
//! component field (usually a [`DisposeBag`]) ties their lifetime to the
//! component's, so tearing the component down on any path releases them.

use smallvec::SmallVec;

/// Handle that unregisters a listener or scheduled callback when dropped
#[must_use = "dropping a Subscription immediately unregisters it"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription that runs `dispose` on release
    pub fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription with nothing to release
    ///
    /// Returned when the registration target no longer exists.
    pub fn empty() -> Self {
        Self { dispose: None }
    }

    /// Whether the release has not run yet
    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }

    /// Release now instead of waiting for drop
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// A set of subscriptions released together, newest first
#[derive(Debug, Default)]
pub struct DisposeBag {
    subscriptions: SmallVec<[Subscription; 4]>,
}

impl DisposeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a subscription
    pub fn add(&mut self, subscription: Subscription) {
        if subscription.is_active() {
            self.subscriptions.push(subscription);
        }
    }

    /// Builder-style [`add`](Self::add)
    pub fn with(mut self, subscription: Subscription) -> Self {
        self.add(subscription);
        self
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release every held subscription in reverse registration order
    pub fn clear(&mut self) {
        while let Some(subscription) = self.subscriptions.pop() {
            subscription.dispose();
        }
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Extend<Subscription> for DisposeBag {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        for subscription in iter {
            self.add(subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = Subscription::new(move || c.set(c.get() + 1));
        assert!(sub.is_active());

        sub.dispose();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let count = Rc::new(Cell::new(0));
        {
            let c = Rc::clone(&count);
            let _sub = Subscription::new(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_release_on_early_return() {
        fn mount_then_bail(count: Rc<Cell<u32>>) -> Option<()> {
            let c = Rc::clone(&count);
            let _sub = Subscription::new(move || c.set(c.get() + 1));
            let target: Option<()> = None;
            target?;
            Some(())
        }

        let count = Rc::new(Cell::new(0));
        assert!(mount_then_bail(Rc::clone(&count)).is_none());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_bag_releases_newest_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bag = DisposeBag::new();
        for i in 0..3 {
            let o = Rc::clone(&order);
            bag.add(Subscription::new(move || o.borrow_mut().push(i)));
        }
        bag.add(Subscription::empty());
        assert_eq!(bag.len(), 3);

        drop(bag);
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }
}
