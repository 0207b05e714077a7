//! Deferred computations.
//!
//! A [`Deferred`] wraps a shared future that settles exactly once, either
//! fulfilled with a value or rejected with a reason. Any number of handles
//! may await it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_channel::oneshot;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use pin_project::pin_project;

use super::{ErrorObject, Value};

/// `Ok` when fulfilled, `Err` carrying the rejection reason otherwise.
pub type Settlement = Result<Value, Value>;

#[derive(Clone)]
pub struct Deferred(Arc<DeferredInner>);

struct DeferredInner {
    settlement: Shared<BoxFuture<'static, Settlement>>,
}

heap_handle!(Deferred);

impl Deferred {
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Settlement> + Send + 'static,
    {
        Self(Arc::new(DeferredInner {
            settlement: future.boxed().shared(),
        }))
    }

    pub fn resolved(value: Value) -> Self {
        Self::from_future(futures_util::future::ready(Ok(value)))
    }

    pub fn rejected(reason: Value) -> Self {
        Self::from_future(futures_util::future::ready(Err(reason)))
    }

    /// An unsettled deferred plus the handle that settles it. Dropping the
    /// resolver unused rejects the deferred.
    pub fn pending() -> (Resolver, Deferred) {
        let (sender, receiver) = oneshot::channel::<Settlement>();
        let deferred = Self::from_future(receiver.map(|received| {
            received.unwrap_or_else(|oneshot::Canceled| {
                Err(Value::Error(ErrorObject::generic(
                    "deferred computation abandoned",
                )))
            })
        }));
        (Resolver { sender }, deferred)
    }

    /// Wait for the outcome.
    pub async fn settled(&self) -> Settlement {
        self.0.settlement.clone().await
    }

    /// The outcome, if some handle has already observed it.
    pub fn peek(&self) -> Option<Settlement> {
        self.0.settlement.peek().cloned()
    }

    /// A distinct deferred that settles with the same outcome as this one.
    pub(crate) fn derive(&self) -> Deferred {
        Self::from_future(Derived {
            source: self.0.settlement.clone(),
        })
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.peek() {
            None => "pending",
            Some(Ok(_)) => "fulfilled",
            Some(Err(_)) => "rejected",
        };
        f.debug_tuple("Deferred").field(&state).finish()
    }
}

#[pin_project]
struct Derived<F> {
    #[pin]
    source: F,
}

impl<F> Future for Derived<F>
where
    F: Future<Output = Settlement>,
{
    type Output = Settlement;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Settlement> {
        let this = self.project();
        let settlement = std::task::ready!(this.source.poll(cx));
        log::trace!(
            "derived deferred settled ({})",
            if settlement.is_ok() { "fulfilled" } else { "rejected" }
        );
        Poll::Ready(settlement)
    }
}

/// Settles the paired [`Deferred`]. Consumed on use.
pub struct Resolver {
    sender: oneshot::Sender<Settlement>,
}

impl Resolver {
    pub fn resolve(self, value: Value) {
        self.settle(Ok(value));
    }

    pub fn reject(self, reason: Value) {
        self.settle(Err(reason));
    }

    fn settle(self, settlement: Settlement) {
        if self.sender.send(settlement).is_err() {
            log::debug!("deferred dropped before it was settled");
        }
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver { .. }")
    }
}
