//! Capturing panics at a lifting boundary.
//!
//! A panic is Rust's abrupt failure: `panic!`, a failed `unwrap`, an
//! out-of-bounds index. [`try_catch`] runs a computation and converts such a
//! failure into an `Err` carrying the captured [`Panic`], so it never unwinds
//! past the boundary. [`try_catch_with`] additionally maps the captured panic
//! into a caller-chosen error type.
//!
//! Only these lifting constructors (and their async counterparts) capture.
//! Callbacks passed to `map`, `and_then` and friends are not guarded: a panic
//! inside them propagates as usual.
//!
//! The process panic hook still runs before the panic is captured, so the
//! default hook prints the message to stderr.
//!
//! # Examples
//!
//! ```rust
//! use fallible::{try_catch, try_catch_with};
//!
//! let captured = try_catch(|| -> i32 { panic!("boom") });
//! assert_eq!(captured.unwrap_err().message(), "boom");
//!
//! let mapped = try_catch_with(|| -> i32 { panic!("boom") }, |panic| panic.message().len());
//! assert_eq!(mapped, Err(4));
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::Arc;

use parking_lot::Mutex;

/// Message reported for payloads that are neither `&str` nor `String`.
const OPAQUE_PAYLOAD_MESSAGE: &str = "Box<dyn Any>";

/// The payload of a captured panic.
///
/// Keeps a textual message extracted from the payload and the original
/// payload itself, which can be inspected with [`downcast`](Self::downcast)
/// or re-raised with [`resume`](Self::resume).
///
/// `Panic` is `Clone + Send + Sync`, so an `AsyncResult<T, Panic>` can be
/// shared. Clones share one payload slot: the first clone to call
/// [`into_payload`](Self::into_payload) or [`resume`](Self::resume) takes
/// the original payload, later ones fall back to the message as a `String`
/// payload.
///
/// # Examples
///
/// ```rust
/// use fallible::Panic;
///
/// let panic = Panic::new("task exploded");
/// assert_eq!(panic.message(), "task exploded");
/// assert_eq!(panic.to_string(), "panicked: task exploded");
/// ```
#[derive(Clone, thiserror::Error)]
#[error("panicked: {message}")]
pub struct Panic {
    message: String,
    payload: Arc<Mutex<Option<Box<dyn Any + Send>>>>,
}

impl Panic {
    /// Creates a `Panic` whose payload is the given message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with_payload(message.clone(), Box::new(message))
    }

    /// Wraps a payload obtained from `catch_unwind` or a panicked task.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| OPAQUE_PAYLOAD_MESSAGE.to_string());
        Self::with_payload(message, payload)
    }

    fn with_payload(message: String, payload: Box<dyn Any + Send>) -> Self {
        Self {
            message,
            payload: Arc::new(Mutex::new(Some(payload))),
        }
    }

    /// Returns the panic message.
    ///
    /// Payloads that are not strings report `"Box<dyn Any>"`, matching the
    /// standard panic hook.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the original payload is still held and is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.payload
            .lock()
            .as_ref()
            .is_some_and(|payload| payload.is::<T>())
    }

    /// Returns a copy of the original payload if it is still held and is a `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fallible::try_catch;
    ///
    /// let panic = try_catch(|| -> i32 { std::panic::panic_any(404_u16) }).unwrap_err();
    /// assert_eq!(panic.downcast::<u16>(), Some(404));
    /// assert_eq!(panic.downcast::<String>(), None);
    /// ```
    pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
        self.payload
            .lock()
            .as_ref()
            .and_then(|payload| payload.downcast_ref::<T>())
            .cloned()
    }

    /// Consumes the `Panic`, returning the original payload.
    ///
    /// If a clone already took it, returns the message as a `String` payload.
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        let taken = self.payload.lock().take();
        taken.unwrap_or_else(|| Box::new(self.message))
    }

    /// Resumes unwinding with the original payload.
    pub fn resume(self) -> ! {
        resume_unwind(self.into_payload())
    }
}

impl fmt::Debug for Panic {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Panic")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Panic: Clone, Send, Sync, std::error::Error);

pub(crate) fn capture(payload: Box<dyn Any + Send>) -> Panic {
    let panic = Panic::from_payload(payload);
    tracing::debug!(
        target: "fallible::capture",
        panic_message = panic.message(),
        "captured panic at lifting boundary"
    );
    panic
}

/// Runs `compute`, converting a panic into `Err(Panic)`.
///
/// # Examples
///
/// ```rust
/// use fallible::try_catch;
///
/// assert_eq!(try_catch(|| 1 + 1).ok(), Some(2));
///
/// let values: Vec<i32> = Vec::new();
/// assert!(try_catch(|| values[3]).is_err());
/// ```
pub fn try_catch<T, F>(compute: F) -> Result<T, Panic>
where
    F: FnOnce() -> T,
{
    catch_unwind(AssertUnwindSafe(compute)).map_err(capture)
}

/// Runs `compute`, converting a panic into `Err(map_error(panic))`.
///
/// `map_error` runs outside the capture boundary: if it panics, that panic
/// propagates to the caller.
///
/// # Examples
///
/// ```rust
/// use fallible::try_catch_with;
///
/// #[derive(Debug, PartialEq)]
/// enum ConfigError {
///     Crashed(String),
/// }
///
/// let result = try_catch_with(
///     || -> u16 { panic!("bad port") },
///     |panic| ConfigError::Crashed(panic.message().to_string()),
/// );
/// assert_eq!(result, Err(ConfigError::Crashed("bad port".to_string())));
/// ```
pub fn try_catch_with<T, E, F, M>(compute: F, map_error: M) -> Result<T, E>
where
    F: FnOnce() -> T,
    M: FnOnce(Panic) -> E,
{
    try_catch(compute).map_err(map_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_catch_returns_ok_on_normal_completion() {
        let result = try_catch(|| "value".to_string());
        assert_eq!(result.ok(), Some("value".to_string()));
    }

    #[test]
    fn test_try_catch_captures_static_str_payload() {
        let result = try_catch(|| -> i32 { panic!("boom") });
        assert_eq!(result.unwrap_err().message(), "boom");
    }

    #[test]
    fn test_try_catch_captures_formatted_payload() {
        let code = 7;
        let result = try_catch(|| -> i32 { panic!("exit code {code}") });
        let panic = result.unwrap_err();
        assert_eq!(panic.message(), "exit code 7");
        assert_eq!(panic.downcast::<String>(), Some("exit code 7".to_string()));
    }

    #[test]
    fn test_try_catch_captures_opaque_payload() {
        let result = try_catch(|| -> i32 { std::panic::panic_any(404_u16) });
        let panic = result.unwrap_err();
        assert_eq!(panic.message(), "Box<dyn Any>");
        assert_eq!(panic.downcast::<u16>(), Some(404));
        assert!(panic.is::<u16>());
        assert!(!panic.is::<String>());
    }

    #[test]
    fn test_try_catch_with_applies_mapper() {
        let result = try_catch_with(|| -> i32 { panic!("boom") }, |panic| {
            format!("mapped: {}", panic.message())
        });
        assert_eq!(result, Err("mapped: boom".to_string()));
    }

    #[test]
    fn test_try_catch_with_skips_mapper_on_success() {
        let mut mapper_called = false;
        let result = try_catch_with(
            || 3,
            |_| {
                mapper_called = true;
                "unused"
            },
        );
        assert_eq!(result, Ok(3));
        assert!(!mapper_called);
    }

    #[test]
    #[should_panic(expected = "mapper failed")]
    fn test_try_catch_with_propagates_mapper_panic() {
        let _ = try_catch_with(|| -> i32 { panic!("boom") }, |_| -> String {
            panic!("mapper failed")
        });
    }

    #[test]
    fn test_panic_display_and_debug() {
        let panic = Panic::new("oops");
        assert_eq!(format!("{panic}"), "panicked: oops");
        let debug = format!("{panic:?}");
        assert!(debug.contains("Panic"));
        assert!(debug.contains("oops"));
    }

    #[test]
    fn test_panic_resume_reraises_original_payload() {
        let outer = try_catch(|| -> i32 { Panic::new("inner").resume() });
        assert_eq!(outer.unwrap_err().message(), "inner");
    }

    #[test]
    fn test_panic_into_payload_returns_original() {
        let payload = Panic::new("payload").into_payload();
        assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("payload"));
    }

    #[test]
    fn test_panic_clones_share_message_and_payload() {
        let panic = try_catch(|| -> i32 { std::panic::panic_any(7_u8) }).unwrap_err();
        let clone = panic.clone();
        assert_eq!(clone.message(), panic.message());
        assert_eq!(clone.downcast::<u8>(), Some(7));
    }

    #[test]
    fn test_panic_payload_is_taken_once_across_clones() {
        let panic = try_catch(|| -> i32 { std::panic::panic_any(7_u8) }).unwrap_err();
        let clone = panic.clone();

        let original = panic.into_payload();
        assert_eq!(original.downcast_ref::<u8>(), Some(&7));

        assert!(!clone.is::<u8>());
        let fallback = clone.into_payload();
        assert_eq!(fallback.downcast_ref::<String>().map(String::as_str), Some("Box<dyn Any>"));
    }
}
