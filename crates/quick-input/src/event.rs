//! Event emitters and disposable subscriptions.
//!
//! Listeners are invoked outside the registry lock so a listener may
//! subscribe, dispose or fire again without deadlocking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// A resource released exactly once; further calls are no-ops.
pub trait Disposable: Send + Sync {
    fn dispose(&self);
}

impl Disposable for tokio::task::AbortHandle {
    fn dispose(&self) {
        self.abort();
    }
}

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct ListenerRegistry<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
}

/// Multi-listener event source.
pub struct Emitter<E> {
    registry: Arc<Mutex<ListenerRegistry<E>>>,
}

impl<E: 'static> Emitter<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(ListenerRegistry {
                next_id: 1,
                entries: Vec::new(),
            })),
        }
    }

    /// Registers a listener; it stays registered until the returned
    /// subscription is disposed or dropped.
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(listener)));
            id
        };
        let registry: Weak<Mutex<ListenerRegistry<E>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Invokes every listener registered at the time of the call, in
    /// registration order.
    pub fn fire(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .registry
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Drops all listeners.
    pub fn clear(&self) {
        self.registry.lock().entries.clear();
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered listener. Disposing (or dropping) it unregisters
/// the listener.
#[must_use = "dropping a subscription unregisters its listener"]
pub struct Subscription {
    release: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self {
            release: Mutex::new(None),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.release.lock().is_none()
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        let release = self.release.lock().take();
        if let Some(release) = release {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Collection of disposables released together.
///
/// Anything added after the store was disposed is disposed immediately.
#[derive(Default)]
pub struct DisposableStore {
    items: Mutex<Vec<Box<dyn Disposable>>>,
    disposed: AtomicBool,
}

impl DisposableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, item: impl Disposable + 'static) {
        if self.disposed.load(Ordering::Acquire) {
            item.dispose();
            return;
        }
        self.items.lock().push(Box::new(item));
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Disposable for DisposableStore {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let items = std::mem::take(&mut *self.items.lock());
        for item in items {
            item.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counter(Arc<AtomicUsize>);

    impl Disposable for Counter {
        fn dispose(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let emitter = Emitter::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = emitter.subscribe({
            let seen = Arc::clone(&seen);
            move |value| seen.lock().push(("first", *value))
        });
        let second = emitter.subscribe({
            let seen = Arc::clone(&seen);
            move |value| seen.lock().push(("second", *value))
        });

        emitter.fire(&7);
        assert_eq!(seen.lock().as_slice(), [("first", 7), ("second", 7)]);

        first.dispose();
        emitter.fire(&8);
        assert_eq!(seen.lock().last(), Some(&("second", 8)));
        assert_eq!(emitter.registry.lock().entries.len(), 1);
        drop(second);
        assert_eq!(emitter.registry.lock().entries.len(), 0);
    }

    #[test]
    fn disposing_twice_is_a_no_op() {
        let emitter = Emitter::<()>::new();
        let subscription = emitter.subscribe(|_| {});
        subscription.dispose();
        subscription.dispose();
        assert!(subscription.is_disposed());
        assert_eq!(emitter.registry.lock().entries.len(), 0);
    }

    #[test]
    fn listener_may_unsubscribe_itself_while_firing() {
        let emitter = Arc::new(Emitter::<()>::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let hits = Arc::new(AtomicUsize::new(0));
        let subscription = emitter.subscribe({
            let slot = Arc::clone(&slot);
            let hits = Arc::clone(&hits);
            move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
                if let Some(own) = slot.lock().take() {
                    own.dispose();
                }
            }
        });
        *slot.lock() = Some(subscription);

        emitter.fire(&());
        emitter.fire(&());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn store_disposes_members_exactly_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let store = DisposableStore::new();
        store.add(Counter(Arc::clone(&count)));
        store.add(Counter(Arc::clone(&count)));

        store.dispose();
        store.dispose();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(store.is_empty());

        store.add(Counter(Arc::clone(&count)));
        assert_eq!(
            count.load(Ordering::SeqCst),
            3,
            "late additions are disposed immediately"
        );
    }
}
