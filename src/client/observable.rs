use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, Weak};

use super::lock;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slot<T> {
    value: T,
    next_id: u64,
    listeners: BTreeMap<u64, Listener<T>>,
}

/// A shared value with change notification.
///
/// Subscribers are called once with the current value when they subscribe,
/// then after every change. Listeners run after the internal lock is
/// released, so they may read or write the same observable.
///
/// Clones share the value and the subscriber list.
pub struct Observable<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = lock(&self.slot);
        f.debug_struct("Observable")
            .field("value", &slot.value)
            .field("subscribers", &slot.listeners.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value,
                next_id: 0,
                listeners: BTreeMap::new(),
            })),
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.slot).value.clone()
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        let Ok(()) = self.try_update(|_| Ok::<_, Infallible>(value));
    }

    /// Replace the value with `f(current)` and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let Ok(()) = self.try_update(|current| Ok::<_, Infallible>(f(current)));
    }

    /// Compute the next value from the current one, or abort.
    ///
    /// `f` runs under the lock, so side effects it performs (such as
    /// persisting the new value) are ordered with the value change. On `Err`
    /// the value is unchanged and nobody is notified.
    ///
    /// Listeners are called after the lock is released. Concurrent updates
    /// from several threads may therefore deliver notifications out of order,
    /// and a listener's last-seen value can lag [`get`](Self::get). Updates
    /// from a single thread are always delivered in order.
    pub fn try_update<E>(&self, f: impl FnOnce(&T) -> Result<T, E>) -> Result<(), E> {
        let (value, listeners) = {
            let mut slot = lock(&self.slot);
            let next = f(&slot.value)?;
            slot.value = next.clone();
            let listeners: Vec<Listener<T>> = slot.listeners.values().cloned().collect();
            (next, listeners)
        };

        for listener in listeners {
            listener(&value);
        }
        Ok(())
    }

    /// Register `listener`. It is called immediately with the current value.
    ///
    /// The listener stays registered until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription<T> {
        let listener: Listener<T> = Arc::new(listener);
        let (id, current) = {
            let mut slot = lock(&self.slot);
            let id = slot.next_id;
            slot.next_id += 1;
            slot.listeners.insert(id, listener.clone());
            (id, slot.value.clone())
        };

        listener(&current);

        Subscription {
            id,
            slot: Arc::downgrade(&self.slot),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.slot).listeners.len()
    }
}

/// Handle returned by [`Observable::subscribe`]; unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription<T> {
    id: u64,
    slot: Weak<Mutex<Slot<T>>>,
}

impl<T> Subscription<T> {
    /// Stop receiving notifications.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.upgrade() {
            lock(&slot).listeners.remove(&self.id);
        }
    }
}
