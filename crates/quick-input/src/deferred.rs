//! Exactly-once result handles.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::oneshot;

use crate::cancellation::CancellationToken;
use crate::error::QuickInputError;

/// Outcome of a quick input session: `Ok(None)` means the user dismissed it.
pub type Settlement<R> = Result<Option<R>, QuickInputError>;

/// Creates a connected settler/promise pair.
pub fn deferred<R: Send + 'static>() -> (Settler<R>, ResultPromise<R>) {
    let (sender, receiver) = oneshot::channel();
    let promise = ResultPromise {
        inner: receiver
            .map(|received| received.unwrap_or(Err(QuickInputError::Dropped)))
            .boxed(),
    };
    (
        Settler {
            sender: Some(sender),
        },
        promise,
    )
}

/// Settling side of a [`ResultPromise`]. Only the first settlement counts.
pub struct Settler<R> {
    sender: Option<oneshot::Sender<Settlement<R>>>,
}

impl<R> Settler<R> {
    /// Returns `false` if the promise had already been settled.
    pub fn settle(&mut self, outcome: Settlement<R>) -> bool {
        let Some(sender) = self.sender.take() else {
            return false;
        };
        // A dropped promise only means nobody is listening anymore.
        let _ = sender.send(outcome);
        true
    }

    pub fn resolve(&mut self, value: Option<R>) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(&mut self, error: QuickInputError) -> bool {
        self.settle(Err(error))
    }

    pub fn is_settled(&self) -> bool {
        self.sender.is_none()
    }
}

/// Awaitable result of a quick input session.
#[must_use = "a result promise does nothing unless awaited"]
pub struct ResultPromise<R> {
    inner: BoxFuture<'static, Settlement<R>>,
}

impl<R: Send + 'static> ResultPromise<R> {
    /// Transforms the settled value, keeping dismissal and errors intact.
    pub fn map<U>(self, f: impl FnOnce(R) -> U + Send + 'static) -> ResultPromise<U> {
        ResultPromise {
            inner: self
                .inner
                .map(|settled| settled.map(|value| value.map(f)))
                .boxed(),
        }
    }
}

impl<R> Future for ResultPromise<R> {
    type Output = Settlement<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<R> std::fmt::Debug for ResultPromise<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultPromise").finish_non_exhaustive()
    }
}

/// Sleeps for `duration` unless `token` is cancelled first, in which case it
/// fails with [`QuickInputError::Canceled`].
pub async fn timeout(duration: Duration, token: &CancellationToken) -> Result<(), QuickInputError> {
    tokio::select! {
        () = tokio::time::sleep(duration) => Ok(()),
        () = token.cancelled() => Err(QuickInputError::Canceled),
    }
}
