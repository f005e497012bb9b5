//! Cooperative cancellation signal.
//!
//! Cancelling never interrupts work already dispatched; listeners decide
//! what to suppress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::event::{Disposable, Emitter, Subscription};

struct TokenState {
    cancelled: watch::Sender<bool>,
    listeners: Emitter<()>,
}

/// Read side of a cancellation signal. Cheap to clone.
#[derive(Clone, Default)]
pub struct CancellationToken {
    state: Option<Arc<TokenState>>,
}

impl CancellationToken {
    /// A token that is never cancelled.
    pub fn none() -> Self {
        Self { state: None }
    }

    pub fn is_cancellation_requested(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|state| *state.cancelled.borrow())
    }

    /// Runs `listener` once when cancellation is requested. If the token is
    /// already cancelled the listener runs immediately.
    pub fn on_cancellation_requested(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        let Some(state) = &self.state else {
            return Subscription::empty();
        };
        if *state.cancelled.borrow() {
            listener();
            return Subscription::empty();
        }
        let fired = Arc::new(AtomicBool::new(false));
        let run = Arc::new(move || {
            if !fired.swap(true, Ordering::SeqCst) {
                listener();
            }
        });
        let subscription = state.listeners.subscribe({
            let run = Arc::clone(&run);
            move |_| run()
        });
        // A cancel racing the registration may have fired before the
        // listener was in place.
        if *state.cancelled.borrow() {
            subscription.dispose();
            run();
        }
        subscription
    }

    /// Completes once cancellation is requested; never completes for
    /// [`CancellationToken::none`].
    pub async fn cancelled(&self) {
        let Some(state) = &self.state else {
            std::future::pending::<()>().await;
            return;
        };
        let mut receiver = state.cancelled.subscribe();
        // The sender lives in `state`, so the channel cannot close here.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancellation_requested())
            .finish()
    }
}

/// Write side of a cancellation signal.
pub struct CancellationTokenSource {
    state: Arc<TokenState>,
}

impl CancellationTokenSource {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            state: Arc::new(TokenState {
                cancelled,
                listeners: Emitter::new(),
            }),
        }
    }

    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            state: Some(Arc::clone(&self.state)),
        }
    }

    /// Requests cancellation. Only the first call notifies listeners.
    pub fn cancel(&self) {
        if self.state.cancelled.send_replace(true) {
            return;
        }
        self.state.listeners.fire(&());
        self.state.listeners.clear();
    }

    pub fn is_cancellation_requested(&self) -> bool {
        *self.state.cancelled.borrow()
    }
}

impl Default for CancellationTokenSource {
    fn default() -> Self {
        Self::new()
    }
}
