//! Observable value holder (mutate-then-notify).
//!
//! A [`Store`] owns one value. Writers replace or modify it as a whole and every
//! subscriber is notified afterwards. Because the value is swapped in a single
//! step, related fields that live in the same value (a page of items and its
//! total count, a token and its user) are never observed half-updated.
//!
//! ## Usage Pattern
//!
//! ```ignore
//! let store = Store::new(0u32);
//! let mut rx = store.subscribe();
//!
//! store.set(7);
//! assert!(rx.has_changed().unwrap());
//! assert_eq!(*rx.borrow_and_update(), 7);
//! ```

use std::sync::Arc;

use tokio::sync::watch;

/// Subscriber handle returned by [`Store::subscribe`].
pub use tokio::sync::watch::Receiver;

/// Shared, cloneable observable value.
///
/// Clones share the same underlying value; a write through any clone notifies
/// subscribers of all of them.
#[derive(Debug)]
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Store<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Read the current value through a closure without cloning it.
    ///
    /// The closure must not write to the same store.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Replace the value and notify subscribers. Returns the previous value.
    pub fn set(&self, value: T) -> T {
        self.tx.send_replace(value)
    }

    /// Modify the value in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Modify the value in place; subscribers are notified only when `f`
    /// returns `true`.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Subscribe to changes. The receiver starts with the current value marked
    /// as seen.
    pub fn subscribe(&self) -> Receiver<T> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Store<T> {
    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
