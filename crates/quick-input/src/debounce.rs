//! Trailing-edge debouncer.
//!
//! Every [`Debouncer::trigger`] restarts the quiet interval; once it elapses
//! without a newer value, the latest value is delivered. Deliveries happen on
//! the tokio runtime the debouncer was triggered from; outside a runtime a
//! value waits for [`Debouncer::flush`].

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{trace, warn};

use crate::event::Disposable;

type Deliver<V> = Box<dyn Fn(V) + Send + Sync>;

struct PendingValue<V> {
    value: Option<V>,
    ticket: u64,
    timer: Option<AbortHandle>,
    disposed: bool,
}

struct DebouncerInner<V> {
    delay: Duration,
    pending: Mutex<PendingValue<V>>,
    deliver: Deliver<V>,
}

impl<V> DebouncerInner<V> {
    fn deliver_if_current(&self, ticket: u64) {
        let value = {
            let mut pending = self.pending.lock();
            if pending.disposed || pending.ticket != ticket {
                return;
            }
            pending.timer = None;
            pending.value.take()
        };
        if let Some(value) = value {
            (self.deliver)(value);
        }
    }
}

/// Delivers only the most recent value after a quiet interval.
pub struct Debouncer<V> {
    inner: Arc<DebouncerInner<V>>,
}

impl<V> Clone for Debouncer<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Send + 'static> Debouncer<V> {
    pub fn new(delay: Duration, deliver: impl Fn(V) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(DebouncerInner {
                delay,
                pending: Mutex::new(PendingValue {
                    value: None,
                    ticket: 0,
                    timer: None,
                    disposed: false,
                }),
                deliver: Box::new(deliver),
            }),
        }
    }

    /// Records `value` as the latest and restarts the quiet interval.
    pub fn trigger(&self, value: V) {
        let mut pending = self.inner.pending.lock();
        if pending.disposed {
            return;
        }
        if pending.value.is_some() {
            trace!("debounce: collapsing superseded value");
        }
        pending.value = Some(value);
        pending.ticket += 1;
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        let ticket = pending.ticket;
        let delay = self.inner.delay;
        let inner: Weak<DebouncerInner<V>> = Arc::downgrade(&self.inner);
        let Ok(runtime) = Handle::try_current() else {
            warn!("debounce: no tokio runtime, value held until flushed");
            return;
        };
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = inner.upgrade() {
                inner.deliver_if_current(ticket);
            }
        });
        pending.timer = Some(task.abort_handle());
    }

    /// Delivers a pending value now instead of waiting for the interval.
    pub fn flush(&self) {
        let value = {
            let mut pending = self.inner.pending.lock();
            if pending.disposed {
                return;
            }
            if let Some(timer) = pending.timer.take() {
                timer.abort();
            }
            pending.ticket += 1;
            pending.value.take()
        };
        if let Some(value) = value {
            (self.inner.deliver)(value);
        }
    }
}

impl<V: Send + 'static> Disposable for Debouncer<V> {
    fn dispose(&self) {
        let mut pending = self.inner.pending.lock();
        if pending.disposed {
            return;
        }
        pending.disposed = true;
        pending.value = None;
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(delay_ms: u64) -> (Debouncer<&'static str>, Arc<Mutex<Vec<&'static str>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), {
            let seen = Arc::clone(&seen);
            move |value| seen.lock().push(value)
        });
        (debouncer, seen)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_delivers_only_the_last_value() {
        let (debouncer, seen) = recording(100);
        for value in ["v1", "v2", "v3", "v4", "v5"] {
            debouncer.trigger(value);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(seen.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(seen.lock().as_slice(), ["v5"]);
        assert!(debouncer.inner.pending.lock().value.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_values_are_each_delivered() {
        let (debouncer, seen) = recording(100);
        for value in ["a", "b", "c"] {
            debouncer.trigger(value);
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        assert_eq!(seen.lock().as_slice(), ["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_delivers_immediately_and_cancels_the_timer() {
        let (debouncer, seen) = recording(100);
        debouncer.trigger("now");
        debouncer.flush();
        assert_eq!(seen.lock().as_slice(), ["now"]);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn trigger_outside_a_runtime_waits_for_flush() {
        let (debouncer, seen) = recording(100);
        debouncer.trigger("first");
        debouncer.trigger("second");
        assert!(seen.lock().is_empty());
        debouncer.flush();
        assert_eq!(seen.lock().as_slice(), ["second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_drops_pending_values() {
        let (debouncer, seen) = recording(100);
        debouncer.trigger("lost");
        debouncer.dispose();
        debouncer.dispose();
        debouncer.trigger("ignored");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(seen.lock().is_empty());
    }
}
