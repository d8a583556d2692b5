//! `AsyncResult` - a deferred computation that settles to a `Result`.
//!
//! `AsyncResult<T, E>` is a future of `Result<T, E>` that carries the
//! combinator algebra of `Result` into asynchronous code. Every operation
//! on `Result` has a counterpart here that applies once the underlying
//! computation settles:
//!
//! | `Result`            | `AsyncResult`                    |
//! |---------------------|----------------------------------|
//! | `map`               | `map`                            |
//! | `map_err`           | `map_err`                        |
//! | `and_then`          | `and_then` (flattens)            |
//! | `or_else`           | `or_else` (flattens)             |
//! | `unwrap`            | `unwrap().await`                 |
//! | `unwrap_or`         | `unwrap_or(default).await`       |
//! | `unwrap_or_else`    | `unwrap_or_else(f).await`        |
//! | `fold`              | `fold(on_ok, on_err).await`      |
//! | `is_ok` / `is_err`  | `is_ok().await` / `is_err().await` |
//!
//! # impl `Future`
//!
//! `AsyncResult` implements `Future<Output = Result<T, E>>` via
//! `pin_project_lite`, so it can be awaited directly or handed to
//! `tokio::join!`, `futures::join!`, `select!` and any other combinator of
//! the async ecosystem:
//!
//! ```rust
//! use fallible::{AsyncResult, ok_async};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let result = ok_async::<i32, String>(41).map(|n| n + 1).await;
//! assert_eq!(result, Ok(42));
//! # });
//! ```
//!
//! # Evaluation Semantics
//!
//! ## Settled Values: Immediate Evaluation
//!
//! A settled `AsyncResult` (from [`AsyncResult::from_result`], [`ok_async`],
//! [`err_async`]) already knows its outcome. Combinators applied to it run
//! their callback immediately, at composition time, and return another
//! settled value without allocating.
//!
//! ## Pending Values: Deferred Evaluation
//!
//! Futures are lazy. An `AsyncResult` built from a future does no work
//! until it is first polled; combinators attach continuations that run in
//! attachment order once the predecessor settles. Use
//! [`AsyncResult::spawn`] when the computation must start immediately and
//! run to completion even if the handle is never observed.
//!
//! ## Single Consumption
//!
//! Awaiting takes the `AsyncResult` by value, so its outcome is observed
//! once. [`AsyncResult::share`] turns it into a [`SharedAsyncResult`] whose
//! clones all observe the same memoized outcome.
//!
//! # Error Capture
//!
//! [`AsyncResult::from_future`], [`try_catch_async`] and
//! [`AsyncResult::spawn`] capture panics of the underlying computation as
//! `Err(Panic)`. Callbacks passed to combinators are not guarded; a panic
//! inside them surfaces from `.await`.

mod combine;
mod shared;

pub use combine::{CombineAsync, combine_async, combine_async_all};
pub use shared::SharedAsyncResult;

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::FusedFuture;
use pin_project_lite::pin_project;

use crate::capture::{Panic, capture, try_catch};

/// Message carried by the `Panic` of a spawned task that was cancelled.
const CANCELLED_MESSAGE: &str = "task was cancelled before it settled";

// =============================================================================
// AsyncResult Struct Definition
// =============================================================================

pin_project! {
    /// A deferred computation whose eventual outcome is a `Result<T, E>`.
    ///
    /// # Type Parameters
    ///
    /// - `T`: The success payload.
    /// - `E`: The failure payload.
    ///
    /// # Monad Laws
    ///
    /// 1. **Left Identity**: `ok_async(a).and_then(f) == f(a)`
    /// 2. **Right Identity**: `m.and_then(ok_async) == m`
    /// 3. **Associativity**: `m.and_then(f).and_then(g) == m.and_then(|x| f(x).and_then(g))`
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use fallible::AsyncResult;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let config = AsyncResult::new(async { tokio::fs::read_to_string("app.toml").await })
    ///         .map(|text| text.lines().count())
    ///         .map_err(|error| error.to_string());
    ///     println!("{:?}", config.await);
    /// }
    /// ```
    #[must_use = "an AsyncResult does nothing unless awaited"]
    pub struct AsyncResult<T, E> {
        #[pin]
        state: AsyncResultState<T, E>,
    }
}

pin_project! {
    /// Internal state machine for `AsyncResult`.
    ///
    /// - `Settled` -> `Consumed` (outcome yielded on first poll)
    /// - `Pending` -> `Consumed` (once the inner future completes)
    #[project = AsyncResultStateProj]
    enum AsyncResultState<T, E> {
        /// The outcome is already known.
        Settled {
            result: Option<Result<T, E>>,
        },
        /// The outcome is produced by a boxed future.
        Pending {
            #[pin]
            future: Pin<Box<dyn Future<Output = Result<T, E>> + Send>>,
        },
        /// The outcome has been yielded.
        Consumed,
    }
}

impl<T, E> Future for AsyncResult<T, E> {
    type Output = Result<T, E>;

    /// Polls the `AsyncResult` towards settlement.
    ///
    /// - `Settled`: Returns the outcome immediately on first poll.
    /// - `Pending`: Polls the inner future until it completes.
    /// - `Consumed`: Panics, the outcome was already yielded.
    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        match this.state.as_mut().project() {
            AsyncResultStateProj::Settled { result } => {
                // INVARIANT: Settled is replaced by Consumed as soon as the outcome is taken
                let outcome = result.take().expect(
                    "AsyncResult internal error: settled outcome was already taken. \
                     This indicates the AsyncResult was polled after completion.",
                );
                this.state.set(AsyncResultState::Consumed);
                Poll::Ready(outcome)
            }
            AsyncResultStateProj::Pending { future } => match future.poll(context) {
                Poll::Ready(outcome) => {
                    this.state.set(AsyncResultState::Consumed);
                    Poll::Ready(outcome)
                }
                Poll::Pending => Poll::Pending,
            },
            AsyncResultStateProj::Consumed => {
                panic!("AsyncResult polled after completion; use `share()` to observe an outcome more than once")
            }
        }
    }
}

impl<T, E> FusedFuture for AsyncResult<T, E> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, AsyncResultState::Consumed)
    }
}

// =============================================================================
// Construction
// =============================================================================

impl<T, E> AsyncResult<T, E> {
    /// Lifts a future that already yields a `Result`.
    ///
    /// The future is not polled until the `AsyncResult` is. A panic while
    /// polling is not captured; use [`from_future`](Self::from_future) for
    /// that.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::AsyncResult;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let parsed = AsyncResult::new(async { "12".parse::<u8>() });
    /// assert_eq!(parsed.await, Ok(12));
    /// # });
    /// ```
    pub fn new<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            state: AsyncResultState::Pending {
                future: Box::pin(future),
            },
        }
    }

    /// Lifts an already-known `Result` into a settled `AsyncResult`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::AsyncResult;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let settled = AsyncResult::<i32, String>::from_result(Ok(3));
    /// assert_eq!(settled.await, Ok(3));
    /// # });
    /// ```
    pub const fn from_result(result: Result<T, E>) -> Self {
        Self {
            state: AsyncResultState::Settled {
                result: Some(result),
            },
        }
    }

    /// Creates a settled `AsyncResult` holding `Ok(value)`.
    pub const fn ok(value: T) -> Self {
        Self::from_result(Ok(value))
    }

    /// Creates a settled `AsyncResult` holding `Err(error)`.
    pub const fn err(error: E) -> Self {
        Self::from_result(Err(error))
    }

    /// Returns `true` if the outcome is already known and not yet consumed.
    pub const fn is_settled(&self) -> bool {
        matches!(self.state, AsyncResultState::Settled { result: Some(_) })
    }
}

impl<T: Send + 'static> AsyncResult<T, Panic> {
    /// Lifts a future that may panic.
    ///
    /// Settles to `Ok(value)` when the future completes, or to
    /// `Err(Panic)` when polling it panics. The panic never propagates past
    /// this boundary.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::AsyncResult;
    ///
    /// async fn flaky() -> i32 {
    ///     panic!("connection reset")
    /// }
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let result = AsyncResult::from_future(flaky()).await;
    /// assert_eq!(result.unwrap_err().message(), "connection reset");
    /// # });
    /// ```
    pub fn from_future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::new(
            AssertUnwindSafe(future)
                .catch_unwind()
                .map(|outcome| outcome.map_err(capture)),
        )
    }

    /// Starts `future` on the current tokio runtime right away.
    ///
    /// The task runs to completion even if the returned handle is dropped
    /// without being awaited. A panic inside the task settles to
    /// `Err(Panic)`; a task cancelled by runtime shutdown settles to
    /// `Err(Panic)` with the message `task was cancelled before it settled`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use fallible::AsyncResult;
    ///
    /// let upload = AsyncResult::spawn(async move { client.upload(bytes).await });
    /// // The upload is already running here.
    /// let receipt = upload.await;
    /// ```
    pub fn spawn<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        Self::new(async move {
            handle.await.map_err(|join_error| match join_error.try_into_panic() {
                Ok(payload) => capture(payload),
                Err(join_error) => {
                    tracing::warn!(
                        target: "fallible::capture",
                        error = %join_error,
                        "spawned computation was cancelled"
                    );
                    Panic::new(CANCELLED_MESSAGE)
                }
            })
        })
    }
}

impl<T: Send + 'static, E: Send + 'static> AsyncResult<T, E> {
    /// Lifts a future that may panic, mapping a captured panic with
    /// `map_error`.
    ///
    /// `map_error` runs outside the capture boundary; a panic inside it
    /// surfaces from `.await`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::AsyncResult;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let result = AsyncResult::from_future_with(async { 5 }, |panic| panic.to_string());
    /// assert_eq!(result.await, Ok(5));
    /// # });
    /// ```
    pub fn from_future_with<Fut, M>(future: Fut, map_error: M) -> Self
    where
        Fut: Future<Output = T> + Send + 'static,
        M: FnOnce(Panic) -> E + Send + 'static,
    {
        AsyncResult::from_future(future).map_err(map_error)
    }

    /// Like [`spawn`](AsyncResult::spawn), mapping a captured panic with
    /// `map_error`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn_with<Fut, M>(future: Fut, map_error: M) -> Self
    where
        Fut: Future<Output = T> + Send + 'static,
        M: FnOnce(Panic) -> E + Send + 'static,
    {
        AsyncResult::spawn(future).map_err(map_error)
    }
}

/// Creates a settled `AsyncResult` holding `Ok(value)`.
///
/// # Examples
///
/// ```rust
/// use fallible::ok_async;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// assert_eq!(ok_async::<_, String>(1).await, Ok(1));
/// # });
/// ```
pub const fn ok_async<T, E>(value: T) -> AsyncResult<T, E> {
    AsyncResult::ok(value)
}

/// Creates a settled `AsyncResult` holding `Err(error)`.
///
/// # Examples
///
/// ```rust
/// use fallible::err_async;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// assert_eq!(err_async::<i32, _>("x").await, Err("x"));
/// # });
/// ```
pub const fn err_async<T, E>(error: E) -> AsyncResult<T, E> {
    AsyncResult::err(error)
}

/// Invokes `compute` and lifts the future it returns, capturing panics.
///
/// `compute` is called immediately. A panic raised while calling it, or
/// while polling the returned future, settles to `Err(Panic)`.
///
/// # Examples
///
/// ```rust
/// use fallible::try_catch_async;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let result = try_catch_async(|| async { 2 * 21 }).await;
/// assert_eq!(result.ok(), Some(42));
/// # });
/// ```
pub fn try_catch_async<T, F, Fut>(compute: F) -> AsyncResult<T, Panic>
where
    T: Send + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    match try_catch(compute) {
        Ok(future) => AsyncResult::from_future(future),
        Err(panic) => AsyncResult::err(panic),
    }
}

/// Invokes `compute` and lifts the future it returns, mapping a captured
/// panic with `map_error`.
///
/// `map_error` runs outside the capture boundary: if it panics, the panic
/// propagates (at call time when `compute` itself panicked, otherwise from
/// `.await`).
///
/// # Examples
///
/// ```rust
/// use fallible::try_catch_async_with;
///
/// async fn fetch() -> String {
///     panic!("timeout")
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let result = try_catch_async_with(fetch, |panic| panic.message().to_uppercase()).await;
/// assert_eq!(result, Err("TIMEOUT".to_string()));
/// # });
/// ```
pub fn try_catch_async_with<T, E, F, Fut, M>(compute: F, map_error: M) -> AsyncResult<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    M: FnOnce(Panic) -> E + Send + 'static,
{
    try_catch_async(compute).map_err(map_error)
}

// =============================================================================
// Flattening
// =============================================================================

/// Values that can continue an `AsyncResult` chain.
///
/// `and_then` and `or_else` accept continuations returning any
/// `IntoAsyncResult`, so a continuation may answer with an immediate
/// `Result` or with a further deferred computation; both are flattened into
/// one `AsyncResult`.
pub trait IntoAsyncResult<T, E> {
    /// Converts `self` into an `AsyncResult`.
    fn into_async_result(self) -> AsyncResult<T, E>;
}

impl<T, E> IntoAsyncResult<T, E> for Result<T, E> {
    #[inline]
    fn into_async_result(self) -> AsyncResult<T, E> {
        AsyncResult::from_result(self)
    }
}

impl<T, E> IntoAsyncResult<T, E> for AsyncResult<T, E> {
    #[inline]
    fn into_async_result(self) -> AsyncResult<T, E> {
        self
    }
}

impl<T, E> From<Result<T, E>> for AsyncResult<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self::from_result(result)
    }
}

// =============================================================================
// Combinators
// =============================================================================

impl<T: Send + 'static, E: Send + 'static> AsyncResult<T, E> {
    /// Transforms the success payload once settled.
    ///
    /// An `Err` passes through untouched and `function` is not invoked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::{err_async, ok_async};
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// assert_eq!(ok_async::<i32, String>(21).map(|n| n * 2).await, Ok(42));
    /// assert_eq!(err_async::<i32, _>("e").map(|n| n * 2).await, Err("e"));
    /// # });
    /// ```
    pub fn map<U, F>(self, function: F) -> AsyncResult<U, E>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        match self {
            Self {
                state: AsyncResultState::Settled {
                    result: Some(result),
                },
            } => AsyncResult::from_result(result.map(function)),
            other => AsyncResult::new(async move { other.await.map(function) }),
        }
    }

    /// Transforms the failure payload once settled.
    ///
    /// An `Ok` passes through untouched and `function` is not invoked.
    pub fn map_err<G, F>(self, function: F) -> AsyncResult<T, G>
    where
        F: FnOnce(E) -> G + Send + 'static,
        G: Send + 'static,
    {
        match self {
            Self {
                state: AsyncResultState::Settled {
                    result: Some(result),
                },
            } => AsyncResult::from_result(result.map_err(function)),
            other => AsyncResult::new(async move { other.await.map_err(function) }),
        }
    }

    /// Chains a fallible continuation on the success payload.
    ///
    /// `function` may return a `Result` or another `AsyncResult`; either
    /// way the chain stays one level deep. An `Err` short-circuits without
    /// invoking `function`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::{AsyncResult, ok_async};
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let immediate = ok_async::<i32, String>(2).and_then(|n| Ok(n + 1));
    /// assert_eq!(immediate.await, Ok(3));
    ///
    /// let deferred = ok_async::<i32, String>(2)
    ///     .and_then(|n| AsyncResult::new(async move { Ok::<_, String>(n * 10) }));
    /// assert_eq!(deferred.await, Ok(20));
    /// # });
    /// ```
    pub fn and_then<U, R, F>(self, function: F) -> AsyncResult<U, E>
    where
        F: FnOnce(T) -> R + Send + 'static,
        R: IntoAsyncResult<U, E>,
        U: Send + 'static,
    {
        match self {
            Self {
                state: AsyncResultState::Settled {
                    result: Some(result),
                },
            } => match result {
                Ok(value) => function(value).into_async_result(),
                Err(error) => AsyncResult::err(error),
            },
            other => AsyncResult::new(async move {
                match other.await {
                    Ok(value) => {
                        let next = function(value).into_async_result();
                        next.await
                    }
                    Err(error) => Err(error),
                }
            }),
        }
    }

    /// Chains a recovery continuation on the failure payload.
    ///
    /// The dual of [`and_then`](Self::and_then): an `Ok` short-circuits
    /// without invoking `function`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::err_async;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let recovered = err_async::<i32, &str>("missing").or_else(|_| Ok::<_, String>(0));
    /// assert_eq!(recovered.await, Ok(0));
    /// # });
    /// ```
    pub fn or_else<G, R, F>(self, function: F) -> AsyncResult<T, G>
    where
        F: FnOnce(E) -> R + Send + 'static,
        R: IntoAsyncResult<T, G>,
        G: Send + 'static,
    {
        match self {
            Self {
                state: AsyncResultState::Settled {
                    result: Some(result),
                },
            } => match result {
                Ok(value) => AsyncResult::ok(value),
                Err(error) => function(error).into_async_result(),
            },
            other => AsyncResult::new(async move {
                match other.await {
                    Ok(value) => Ok(value),
                    Err(error) => {
                        let next = function(error).into_async_result();
                        next.await
                    }
                }
            }),
        }
    }

    /// Calls `function` with a reference to the success payload, if any.
    pub fn inspect<F>(self, function: F) -> Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.map(|value| {
            function(&value);
            value
        })
    }

    /// Calls `function` with a reference to the failure payload, if any.
    pub fn inspect_err<F>(self, function: F) -> Self
    where
        F: FnOnce(&E) + Send + 'static,
    {
        self.map_err(|error| {
            function(&error);
            error
        })
    }
}

// =============================================================================
// Terminal Operations
// =============================================================================

impl<T, E> AsyncResult<T, E> {
    /// Waits for settlement and returns `true` for `Ok`.
    pub async fn is_ok(self) -> bool {
        self.await.is_ok()
    }

    /// Waits for settlement and returns `true` for `Err`.
    pub async fn is_err(self) -> bool {
        self.await.is_err()
    }

    /// Waits for settlement and returns the success payload.
    ///
    /// # Panics
    ///
    /// Panics if the outcome is `Err`, with a message embedding the payload.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::ok_async;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// assert_eq!(ok_async::<_, String>("ready").unwrap().await, "ready");
    /// # });
    /// ```
    pub async fn unwrap(self) -> T
    where
        E: fmt::Debug,
    {
        self.await.unwrap()
    }

    /// Waits for settlement and returns the success payload or `default`.
    pub async fn unwrap_or(self, default: T) -> T {
        self.await.unwrap_or(default)
    }

    /// Waits for settlement and returns the success payload or
    /// `function(error)`.
    pub async fn unwrap_or_else<F>(self, function: F) -> T
    where
        F: FnOnce(E) -> T,
    {
        self.await.unwrap_or_else(function)
    }

    /// Waits for settlement and invokes exactly one of the handlers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::err_async;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let status = err_async::<u16, &str>("refused")
    ///     .fold(|code| format!("HTTP {code}"), |error| format!("error: {error}"))
    ///     .await;
    /// assert_eq!(status, "error: refused");
    /// # });
    /// ```
    pub async fn fold<U, F, G>(self, on_ok: F, on_err: G) -> U
    where
        F: FnOnce(T) -> U,
        G: FnOnce(E) -> U,
    {
        match self.await {
            Ok(value) => on_ok(value),
            Err(error) => on_err(error),
        }
    }
}

impl<T, E> fmt::Debug for AsyncResult<T, E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            AsyncResultState::Settled { result: Some(_) } => "<settled>",
            AsyncResultState::Settled { result: None } | AsyncResultState::Consumed => "<consumed>",
            AsyncResultState::Pending { .. } => "<pending>",
        };
        write!(formatter, "AsyncResult({state})")
    }
}
