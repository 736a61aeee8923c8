//! Most-recent-value broadcast.
//!
//! An [`Observable`] always holds a value: it is created with one and every
//! [`Observer`] sees it immediately on subscription. Later updates overwrite
//! it; slow observers skip intermediate values and only see the latest.
//!
//! # Example
//!
//! ```
//! use roster::Observable;
//!
//! let count = Observable::new(0);
//! let observer = count.subscribe();
//! assert_eq!(observer.current(), 0);
//!
//! count.set(3);
//! assert_eq!(observer.current(), 3);
//! ```

use tokio::sync::watch;

/// Owner side of a most-recent-value broadcast.
#[derive(Debug)]
pub struct Observable<T> {
    sender: watch::Sender<T>,
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            sender: watch::Sender::new(initial),
        }
    }

    /// Replace the value and notify observers.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Mutate in place under the lock. Observers are notified only when
    /// `modify` returns `true`.
    pub fn modify<F>(&self, modify: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        self.sender.send_if_modified(modify)
    }

    /// Read the current value under the lock.
    ///
    /// The closure must not call back into this observable.
    pub fn read<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> Observer<T> {
        Observer {
            receiver: self.sender.subscribe(),
        }
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

/// Subscriber side of an [`Observable`].
#[derive(Debug, Clone)]
pub struct Observer<T> {
    receiver: watch::Receiver<T>,
}

impl<T: Clone> Observer<T> {
    /// The latest published value.
    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Wait for the next value this observer has not seen yet.
    ///
    /// Returns `None` once the [`Observable`] is dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}
