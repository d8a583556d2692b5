//! # fallible
//!
//! Explicit, panic-free error handling for Rust: combinators over
//! [`Result`], a deferred [`AsyncResult`] that plugs into the same algebra,
//! and order-preserving aggregation of independent fallible computations.
//!
//! ## Overview
//!
//! - **Result**: the standard [`Result`] plus [`ResultExt`] (`fold`,
//!   `into_async`) and the point-free constructors [`ok`] / [`err`].
//! - **Capture**: [`try_catch`] and [`try_catch_with`] turn a panicking
//!   computation into an `Err` carrying the captured [`Panic`].
//! - **`AsyncResult`**: a future that settles to a `Result`, with `map`,
//!   `and_then`, `or_else`, ... mirroring the synchronous API. It can be
//!   awaited directly.
//! - **Aggregation**: [`combine`] / [`combine_async`] over tuples, and
//!   [`combine_all`] / [`combine_async_all`] over iterators. The leftmost
//!   failure always wins.
//!
//! ## Feature Flags
//!
//! - `async` (default): [`AsyncResult`], [`SharedAsyncResult`] and the async
//!   aggregation operators.
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use fallible::prelude::*;
//!
//! let parsed = try_catch(|| "42".parse::<i32>().unwrap())
//!     .map(|n| n * 2)
//!     .map_err(|panic| panic.message().to_string());
//! assert_eq!(parsed, Ok(84));
//!
//! let both = combine((ok::<_, String>(1), ok::<_, String>("a")));
//! assert_eq!(both, Ok((1, "a")));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use fallible::prelude::*;
/// ```
pub mod prelude {
    pub use crate::capture::{Panic, try_catch, try_catch_with};
    pub use crate::combine::{Combine, combine, combine_all};
    pub use crate::result::{ResultExt, err, ok};

    #[cfg(feature = "async")]
    pub use crate::async_result::{
        AsyncResult, CombineAsync, IntoAsyncResult, SharedAsyncResult, combine_async,
        combine_async_all, err_async, ok_async, try_catch_async, try_catch_async_with,
    };
}

pub mod capture;
pub mod combine;
pub mod result;

#[cfg(feature = "async")]
pub mod async_result;

pub use capture::{Panic, try_catch, try_catch_with};
pub use combine::{Combine, combine, combine_all};
pub use result::{ResultExt, err, ok};

#[cfg(feature = "async")]
pub use async_result::{
    AsyncResult, CombineAsync, IntoAsyncResult, SharedAsyncResult, combine_async,
    combine_async_all, err_async, ok_async, try_catch_async, try_catch_async_with,
};
