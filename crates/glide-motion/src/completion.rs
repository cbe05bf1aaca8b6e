//! Completion signals and the signal-versus-timer race.
//!
//! A [`Completion`] is an awaitable, cloneable handle that settles at most
//! once. It is produced together with a [`Resolver`]; resolving (or dropping)
//! the resolver settles every clone of the completion.
//!
//! [`race_timeout`] settles on whichever of a completion source or a timer
//! finishes first and drops the other, and [`Registration`] disposes of a
//! listener registration when it goes out of scope. Together they replace the
//! "listener plus fallback timer, clear whichever lost" pattern.

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::channel::oneshot;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

/// How a raced completion settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The completion source fired first.
    Signalled,
    /// The fallback timer elapsed first.
    TimedOut,
}

#[derive(Clone)]
enum Settled {
    Ready,
    Flag(Arc<AtomicBool>),
    All(Vec<Completion>),
}

/// Awaitable signal that an asynchronous effect has finished.
#[derive(Clone)]
pub struct Completion {
    inner: Shared<BoxFuture<'static, ()>>,
    settled: Settled,
}

/// Settles the [`Completion`] it was created with.
///
/// Dropping a resolver without calling [`Resolver::resolve`] also settles it,
/// so a completion can never hang because its producer went away.
pub struct Resolver {
    tx: Option<oneshot::Sender<()>>,
    settled: Arc<AtomicBool>,
}

impl Completion {
    /// Create an unsettled completion and the resolver that settles it.
    pub fn channel() -> (Resolver, Completion) {
        let (tx, rx) = oneshot::channel::<()>();
        let settled = Arc::new(AtomicBool::new(false));
        let completion = Completion {
            inner: rx.map(|_| ()).boxed().shared(),
            settled: Settled::Flag(Arc::clone(&settled)),
        };
        (
            Resolver {
                tx: Some(tx),
                settled,
            },
            completion,
        )
    }

    /// A completion that is already settled.
    pub fn resolved() -> Self {
        Completion {
            inner: futures::future::ready(()).boxed().shared(),
            settled: Settled::Ready,
        }
    }

    /// A completion that settles once every member has settled.
    pub fn all<I>(completions: I) -> Self
    where
        I: IntoIterator<Item = Completion>,
    {
        let members: Vec<Completion> = completions.into_iter().collect();
        let joined = futures::future::join_all(members.clone()).map(|_| ());
        Completion {
            inner: joined.boxed().shared(),
            settled: Settled::All(members),
        }
    }

    /// Whether the completion has settled.
    pub fn is_resolved(&self) -> bool {
        match &self.settled {
            Settled::Ready => true,
            Settled::Flag(flag) => flag.load(Ordering::Acquire),
            Settled::All(members) => members.iter().all(Completion::is_resolved),
        }
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.inner.poll_unpin(cx)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl Resolver {
    /// Settle the completion.
    pub fn resolve(mut self) {
        self.settle();
    }

    fn settle(&mut self) {
        if let Some(tx) = self.tx.take() {
            self.settled.store(true, Ordering::Release);
            let _ = tx.send(());
        }
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        self.settle();
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("settled", &self.settled.load(Ordering::Acquire))
            .finish()
    }
}

/// Wait for `signal` or `timeout`, whichever comes first.
///
/// The losing side is dropped before this returns: an unfired signal future
/// is discarded and an unelapsed timer is cancelled.
pub async fn race_timeout<F>(signal: F, timeout: Duration) -> Settlement
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = signal => Settlement::Signalled,
        _ = tokio::time::sleep(timeout) => Settlement::TimedOut,
    }
}

/// Disposes of a registration (listener, subscription) when dropped.
pub struct Registration {
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Registration {
    pub fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Dispose now instead of at drop.
    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("live", &self.dispose.is_some())
            .finish()
    }
}
