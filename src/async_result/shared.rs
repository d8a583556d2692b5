//! Memoized, multi-consumer `AsyncResult`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::Shared;

use super::{AsyncResult, IntoAsyncResult};

/// A clonable handle to an `AsyncResult` whose outcome is computed once.
///
/// Created by [`AsyncResult::share`]. The underlying computation is driven
/// by whichever clone is polled first; once it settles, the outcome is
/// stored and every clone, including clones made afterwards, observes an
/// identical copy of it.
///
/// # Examples
///
/// ```rust
/// use fallible::AsyncResult;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let shared = AsyncResult::<u32, String>::new(async { Ok(7) }).share();
/// let first = shared.clone();
///
/// assert_eq!(first.await, Ok(7));
/// assert_eq!(shared.peek(), Some(&Ok(7)));
/// assert_eq!(shared.await, Ok(7));
/// # });
/// ```
#[must_use = "a SharedAsyncResult does nothing unless awaited"]
pub struct SharedAsyncResult<T, E> {
    inner: Shared<AsyncResult<T, E>>,
}

impl<T: Clone, E: Clone> AsyncResult<T, E> {
    /// Converts this handle into one that can be cloned and awaited any
    /// number of times.
    ///
    /// The computation still runs only once; the settled outcome is
    /// memoized and cloned out to each consumer.
    pub fn share(self) -> SharedAsyncResult<T, E> {
        SharedAsyncResult {
            inner: FutureExt::shared(self),
        }
    }
}

impl<T: Clone, E: Clone> SharedAsyncResult<T, E> {
    /// Returns the settled outcome, or `None` while it is still pending.
    pub fn peek(&self) -> Option<&Result<T, E>> {
        self.inner.peek()
    }

    /// Returns `true` once the outcome is known.
    pub fn is_settled(&self) -> bool {
        self.peek().is_some()
    }
}

impl<T, E> SharedAsyncResult<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Returns an `AsyncResult` resolving to the memoized outcome, to keep
    /// composing with the combinators.
    ///
    /// Already-settled handles produce a settled `AsyncResult`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::ok_async;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let shared = ok_async::<i32, String>(20).share();
    /// let doubled = shared.to_async().map(|n| n * 2);
    /// assert_eq!(doubled.await, Ok(40));
    /// assert_eq!(shared.await, Ok(20));
    /// # });
    /// ```
    pub fn to_async(&self) -> AsyncResult<T, E> {
        match self.peek() {
            Some(result) => AsyncResult::from_result(result.clone()),
            None => AsyncResult::new(self.inner.clone()),
        }
    }
}

impl<T, E> IntoAsyncResult<T, E> for SharedAsyncResult<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn into_async_result(self) -> AsyncResult<T, E> {
        self.to_async()
    }
}

impl<T: Clone, E: Clone> Future for SharedAsyncResult<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(context)
    }
}

impl<T, E> Clone for SharedAsyncResult<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone, E: Clone> fmt::Debug for SharedAsyncResult<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_settled() {
            "<settled>"
        } else {
            "<pending>"
        };
        write!(formatter, "SharedAsyncResult({state})")
    }
}
