//! Extensions to the standard `Result` type.
//!
//! The tagged success/failure value of this crate *is* `core::result::Result`.
//! It already provides the bulk of the algebra (`is_ok`, `is_err`, `map`,
//! `map_err`, `and_then`, `or_else`, `unwrap`, `unwrap_or`, `unwrap_or_else`);
//! this module adds what is missing:
//!
//! - [`ok`] / [`err`]: constructors usable in point-free position.
//! - [`ResultExt::fold`]: exhaustive handling of both channels.
//! - [`ResultExt::into_async`]: lifting into an already-settled
//!   [`AsyncResult`](crate::AsyncResult).
//!
//! # Laws
//!
//! ```text
//! ok(v).map(f)        == ok(f(v))
//! err(e).map(f)       == err(e)
//! ok(v).and_then(f)   == f(v)
//! err(e).and_then(f)  == err(e)
//! err(e).map_err(f)   == err(f(e))
//! ok(v).map_err(f)    == ok(v)
//! ```
//!
//! # Examples
//!
//! ```rust
//! use fallible::{ResultExt, err, ok};
//!
//! let doubled = ok::<i32, String>(21).and_then(|n| ok(n * 2));
//! assert_eq!(doubled, Ok(42));
//!
//! let message = err::<i32, _>("disk full").fold(
//!     |value| format!("wrote {value} bytes"),
//!     |error| format!("failed: {error}"),
//! );
//! assert_eq!(message, "failed: disk full");
//! ```

#[cfg(feature = "async")]
use crate::async_result::AsyncResult;

/// Wraps `value` in `Ok`.
///
/// Equivalent to `Ok(value)`, but usable as a function value, e.g.
/// `.and_then(ok)`.
///
/// # Examples
///
/// ```rust
/// use fallible::ok;
///
/// let result = ok::<_, String>(42);
/// assert!(result.is_ok());
/// assert_eq!(result.unwrap(), 42);
/// ```
#[inline]
pub const fn ok<T, E>(value: T) -> Result<T, E> {
    Ok(value)
}

/// Wraps `error` in `Err`.
///
/// # Examples
///
/// ```rust
/// use fallible::err;
///
/// let result = err::<i32, _>("boom");
/// assert!(result.is_err());
/// assert_eq!(result.unwrap_or(0), 0);
/// ```
#[inline]
pub const fn err<T, E>(error: E) -> Result<T, E> {
    Err(error)
}

/// Operations on `Result` that the standard library does not provide.
pub trait ResultExt<T, E>: Sized {
    /// Invokes exactly one of the handlers and returns its value.
    ///
    /// `on_ok` receives the success payload, `on_err` the failure payload.
    /// Both handlers must produce the same type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::{ResultExt, ok};
    ///
    /// let length = ok::<_, String>("hello").fold(|s| s.len(), |e| e.len());
    /// assert_eq!(length, 5);
    /// ```
    fn fold<U, F, G>(self, on_ok: F, on_err: G) -> U
    where
        F: FnOnce(T) -> U,
        G: FnOnce(E) -> U;

    /// Lifts this result into an `AsyncResult` that is already settled.
    ///
    /// Awaiting the returned value never suspends.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::{ResultExt, ok};
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let lifted = ok::<_, String>(7).into_async().map(|n| n + 1);
    /// assert_eq!(lifted.await, Ok(8));
    /// # });
    /// ```
    #[cfg(feature = "async")]
    fn into_async(self) -> AsyncResult<T, E>
    where
        T: Send + 'static,
        E: Send + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    #[inline]
    fn fold<U, F, G>(self, on_ok: F, on_err: G) -> U
    where
        F: FnOnce(T) -> U,
        G: FnOnce(E) -> U,
    {
        match self {
            Ok(value) => on_ok(value),
            Err(error) => on_err(error),
        }
    }

    #[cfg(feature = "async")]
    #[inline]
    fn into_async(self) -> AsyncResult<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        AsyncResult::from_result(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_constructs_ok_variant() {
        let result = ok::<i32, String>(42);
        assert!(result.is_ok());
        assert!(!result.is_err());
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn test_err_constructs_err_variant() {
        let result = err::<i32, &str>("boom");
        assert!(result.is_err());
        assert!(!result.is_ok());
        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn test_fold_invokes_ok_handler_only() {
        let mut err_called = false;
        let value = ok::<i32, String>(10).fold(
            |n| n * 3,
            |_| {
                err_called = true;
                0
            },
        );
        assert_eq!(value, 30);
        assert!(!err_called);
    }

    #[test]
    fn test_fold_invokes_err_handler_only() {
        let mut ok_called = false;
        let value = err::<i32, &str>("bad").fold(
            |_| {
                ok_called = true;
                String::new()
            },
            |error| error.to_uppercase(),
        );
        assert_eq!(value, "BAD");
        assert!(!ok_called);
    }

    #[test]
    fn test_constructors_are_point_free() {
        let chained: Result<i32, String> = ok(1).and_then(ok).map(|n| n + 1);
        assert_eq!(chained, Ok(2));

        let recovered: Result<i32, String> = err("x".to_string()).or_else(err);
        assert_eq!(recovered, Err("x".to_string()));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_into_async_preserves_outcome() {
        assert_eq!(ok::<i32, String>(5).into_async().await, Ok(5));
        assert_eq!(
            err::<i32, String>("e".to_string()).into_async().await,
            Err("e".to_string())
        );
    }
}
