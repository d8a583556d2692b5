//! Aggregation of independent `Result`s.
//!
//! [`combine`] reduces an ordered collection of results to a single result:
//! `Ok` of every success value in position order, or the first `Err` from
//! the left. The leftmost failure always wins; failures are never compared.
//!
//! Two shapes are supported:
//!
//! - Tuples of arity 0 to 12, where every element may carry a different
//!   success type but all share the error type `E`. The empty tuple combines
//!   to `Ok(())`: an aggregation of zero obligations trivially succeeds.
//! - Homogeneous collections via [`combine_all`] (any iterator) or a
//!   `Vec<Result<T, E>>` passed to [`combine`].
//!
//! # Examples
//!
//! ```rust
//! use fallible::{combine, combine_all, err, ok};
//!
//! let port = ok::<u16, String>(8080);
//! let host = ok::<&str, String>("localhost");
//! assert_eq!(combine((port, host)), Ok((8080, "localhost")));
//!
//! let failed = combine((ok::<i32, _>(1), err::<i32, _>("x"), err::<i32, _>("y")));
//! assert_eq!(failed, Err("x"));
//!
//! let all: Result<Vec<i32>, String> = combine_all(vec![ok(1), ok(2), ok(3)]);
//! assert_eq!(all, Ok(vec![1, 2, 3]));
//! ```

/// Collections of results that can be reduced to one result.
///
/// Implemented for tuples of `Result<_, E>` up to arity 12 and for
/// `Vec<Result<T, E>>`.
pub trait Combine<E> {
    /// The aggregate success value.
    type Output;

    /// Reduces the collection, returning the leftmost `Err` if any.
    ///
    /// # Errors
    ///
    /// Returns the first failure in position order.
    fn combine(self) -> Result<Self::Output, E>;
}

/// Reduces an ordered collection of results to a single result.
///
/// See [`Combine`] for the supported shapes.
///
/// # Errors
///
/// Returns the first failure in position order.
///
/// # Examples
///
/// ```rust
/// use fallible::combine;
///
/// let empty: Result<(), String> = combine(());
/// assert_eq!(empty, Ok(()));
/// ```
#[inline]
pub fn combine<C, E>(results: C) -> Result<C::Output, E>
where
    C: Combine<E>,
{
    results.combine()
}

/// Reduces an iterator of results to a result of a `Vec`.
///
/// Elements are pulled in order and pulling stops at the first `Err`, so
/// the remaining elements of a lazy iterator are never evaluated. An empty
/// iterator yields `Ok(vec![])`.
///
/// # Errors
///
/// Returns the first failure in iteration order.
///
/// # Examples
///
/// ```rust
/// use fallible::combine_all;
///
/// let mut evaluated = Vec::new();
/// let result = combine_all((0..5).map(|index| {
///     evaluated.push(index);
///     if index == 2 { Err(format!("item {index} failed")) } else { Ok(index) }
/// }));
/// assert_eq!(result, Err("item 2 failed".to_string()));
/// assert_eq!(evaluated, vec![0, 1, 2]);
/// ```
pub fn combine_all<I, T, E>(results: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    results.into_iter().collect()
}

impl<E> Combine<E> for () {
    type Output = ();

    #[inline]
    fn combine(self) -> Result<Self::Output, E> {
        Ok(())
    }
}

impl<T, E> Combine<E> for Vec<Result<T, E>> {
    type Output = Vec<T>;

    #[inline]
    fn combine(self) -> Result<Self::Output, E> {
        combine_all(self)
    }
}

macro_rules! impl_combine_for_tuple {
    ($($value:ident : $type:ident),+) => {
        impl<$($type,)+ E> Combine<E> for ($(Result<$type, E>,)+) {
            type Output = ($($type,)+);

            #[inline]
            fn combine(self) -> Result<Self::Output, E> {
                let ($($value,)+) = self;
                // Tuple fields evaluate left to right, so `?` yields the leftmost `Err`.
                Ok(($($value?,)+))
            }
        }
    };
}

impl_combine_for_tuple!(a: A);
impl_combine_for_tuple!(a: A, b: B);
impl_combine_for_tuple!(a: A, b: B, c: C);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D, f: F);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I, j: J);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I, j: J, k: K);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I, j: J, k: K, l: L);
impl_combine_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I, j: J, k: K, l: L, m: M);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{err, ok};

    #[test]
    fn test_combine_empty_tuple_is_ok() {
        let result: Result<(), String> = combine(());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_combine_single_element() {
        assert_eq!(combine((ok::<i32, String>(1),)), Ok((1,)));
        assert_eq!(combine((err::<i32, &str>("e"),)), Err("e"));
    }

    #[test]
    fn test_combine_heterogeneous_success_types() {
        let result = combine((ok::<i32, String>(1), ok("a"), ok(2.5_f64)));
        assert_eq!(result, Ok((1, "a", 2.5)));
    }

    #[test]
    fn test_combine_leftmost_failure_wins() {
        let result = combine((ok::<i32, &str>(1), err::<&str, _>("x"), err::<bool, _>("y")));
        assert_eq!(result, Err("x"));
    }

    #[test]
    fn test_combine_failure_in_last_position() {
        let result = combine((ok::<i32, &str>(1), ok(2), err::<i32, _>("last")));
        assert_eq!(result, Err("last"));
    }

    #[test]
    fn test_combine_maximum_arity() {
        let result = combine((
            ok::<u8, ()>(1),
            ok(2),
            ok(3),
            ok(4),
            ok(5),
            ok(6),
            ok(7),
            ok(8),
            ok(9),
            ok(10),
            ok(11),
            ok(12),
        ));
        assert_eq!(result, Ok((1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12)));
    }

    #[test]
    fn test_combine_vec_preserves_order() {
        let results: Vec<Result<i32, String>> = vec![ok(3), ok(1), ok(2)];
        assert_eq!(combine(results), Ok(vec![3, 1, 2]));
    }

    #[test]
    fn test_combine_vec_leftmost_failure() {
        let results: Vec<Result<i32, &str>> = vec![ok(1), err("first"), ok(3), err("second")];
        assert_eq!(combine(results), Err("first"));
    }

    #[test]
    fn test_combine_all_empty_iterator() {
        let result: Result<Vec<i32>, String> = combine_all(std::iter::empty());
        assert_eq!(result, Ok(Vec::new()));
    }

    #[test]
    fn test_combine_all_stops_pulling_after_failure() {
        let mut pulled = 0;
        let result: Result<Vec<i32>, &str> = combine_all((0..10).map(|index| {
            pulled += 1;
            if index == 3 { Err("stop") } else { Ok(index) }
        }));
        assert_eq!(result, Err("stop"));
        assert_eq!(pulled, 4);
    }
}
