//! Concurrent aggregation of `AsyncResult`s.

use futures::future::join_all;

use super::AsyncResult;
use crate::combine::{Combine, combine_all};

/// Collections of `AsyncResult`s that can be reduced to one `AsyncResult`.
///
/// All elements are driven concurrently; none waits for its predecessor to
/// settle before it starts. Once every element has settled, the outcomes
/// are reduced exactly like [`Combine`]: `Ok` of the success values in
/// position order, or the failure with the lowest position. Which element
/// failed first in wall-clock time does not matter.
///
/// Implemented for tuples of `AsyncResult<_, E>` up to arity 12 and for
/// `Vec<AsyncResult<T, E>>`.
pub trait CombineAsync<E> {
    /// The aggregate success value.
    type Output;

    /// Drives every element concurrently and reduces the settled outcomes.
    fn combine_async(self) -> AsyncResult<Self::Output, E>;
}

/// Drives an ordered collection of `AsyncResult`s concurrently and reduces
/// their outcomes, leftmost failure first.
///
/// # Examples
///
/// ```rust
/// use fallible::{AsyncResult, combine_async, err_async, ok_async};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let user = ok_async::<&str, String>("ada");
/// let roles = AsyncResult::new(async { Ok::<_, String>(vec!["admin"]) });
/// assert_eq!(combine_async((user, roles)).await, Ok(("ada", vec!["admin"])));
///
/// let failed = combine_async((
///     ok_async::<i32, &str>(1),
///     err_async::<i32, _>("x"),
///     err_async::<i32, _>("y"),
/// ));
/// assert_eq!(failed.await, Err("x"));
/// # });
/// ```
#[inline]
pub fn combine_async<C, E>(results: C) -> AsyncResult<C::Output, E>
where
    C: CombineAsync<E>,
{
    results.combine_async()
}

/// Drives every `AsyncResult` of an iterator concurrently and reduces the
/// settled outcomes to a `Vec`.
///
/// The iterator is drained up front, so every computation is started. An
/// empty iterator settles to `Ok(vec![])`.
///
/// # Examples
///
/// ```rust
/// use fallible::{AsyncResult, combine_async_all};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let lengths = ["a", "bb", "ccc"]
///     .into_iter()
///     .map(|word| AsyncResult::new(async move { Ok::<_, String>(word.len()) }));
/// assert_eq!(combine_async_all(lengths).await, Ok(vec![1, 2, 3]));
/// # });
/// ```
pub fn combine_async_all<I, T, E>(results: I) -> AsyncResult<Vec<T>, E>
where
    I: IntoIterator<Item = AsyncResult<T, E>>,
    T: Send + 'static,
    E: Send + 'static,
{
    let pending: Vec<AsyncResult<T, E>> = results.into_iter().collect();
    if pending.is_empty() {
        return AsyncResult::ok(Vec::new());
    }
    AsyncResult::new(async move { combine_all(join_all(pending).await) })
}

impl<E: Send + 'static> CombineAsync<E> for () {
    type Output = ();

    #[inline]
    fn combine_async(self) -> AsyncResult<Self::Output, E> {
        AsyncResult::ok(())
    }
}

impl<T: Send + 'static, E: Send + 'static> CombineAsync<E> for Vec<AsyncResult<T, E>> {
    type Output = Vec<T>;

    #[inline]
    fn combine_async(self) -> AsyncResult<Self::Output, E> {
        combine_async_all(self)
    }
}

impl<A: Send + 'static, E: Send + 'static> CombineAsync<E> for (AsyncResult<A, E>,) {
    type Output = (A,);

    #[inline]
    fn combine_async(self) -> AsyncResult<Self::Output, E> {
        self.0.map(|value| (value,))
    }
}

macro_rules! impl_combine_async_for_tuple {
    ($($value:ident : $type:ident),+) => {
        impl<$($type: Send + 'static,)+ E: Send + 'static> CombineAsync<E>
            for ($(AsyncResult<$type, E>,)+)
        {
            type Output = ($($type,)+);

            fn combine_async(self) -> AsyncResult<Self::Output, E> {
                let ($($value,)+) = self;
                AsyncResult::new(async move {
                    let settled = futures::join!($($value),+);
                    settled.combine()
                })
            }
        }
    };
}

impl_combine_async_for_tuple!(a: A, b: B);
impl_combine_async_for_tuple!(a: A, b: B, c: C);
impl_combine_async_for_tuple!(a: A, b: B, c: C, d: D);
impl_combine_async_for_tuple!(a: A, b: B, c: C, d: D, f: F);
impl_combine_async_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G);
impl_combine_async_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H);
impl_combine_async_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I);
impl_combine_async_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I, j: J);
impl_combine_async_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I, j: J, k: K);
impl_combine_async_for_tuple!(a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I, j: J, k: K, l: L);
impl_combine_async_for_tuple!(
    a: A, b: B, c: C, d: D, f: F, g: G, h: H, i: I, j: J, k: K, l: L, m: M
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_result::{err_async, ok_async};
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    fn delayed<T: Send + 'static, E: Send + 'static>(
        milliseconds: u64,
        result: Result<T, E>,
    ) -> AsyncResult<T, E> {
        AsyncResult::new(async move {
            sleep(Duration::from_millis(milliseconds)).await;
            result
        })
    }

    #[tokio::test]
    async fn test_combine_async_empty_tuple() {
        let combined: AsyncResult<(), String> = combine_async(());
        assert!(combined.is_settled());
        assert_eq!(combined.await, Ok(()));
    }

    #[tokio::test]
    async fn test_combine_async_single_element() {
        assert_eq!(combine_async((ok_async::<i32, ()>(1),)).await, Ok((1,)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_combine_async_runs_concurrently() {
        let start = Instant::now();
        let combined = combine_async((
            delayed::<_, String>(100, Ok(1)),
            delayed(50, Ok("two")),
            delayed(10, Ok(3_u8)),
        ))
        .await;

        assert_eq!(combined, Ok((1, "two", 3)));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(160));
    }

    #[tokio::test(start_paused = true)]
    async fn test_combine_async_reports_lowest_position_failure() {
        let combined = combine_async((
            delayed::<i32, &str>(10, Ok(1)),
            delayed::<i32, &str>(80, Err("x")),
            delayed::<i32, &str>(5, Err("y")),
        ))
        .await;
        assert_eq!(combined, Err("x"));
    }

    #[tokio::test]
    async fn test_combine_async_settled_elements() {
        let combined = combine_async((
            ok_async::<i32, &str>(1),
            err_async::<i32, &str>("x"),
            err_async::<i32, &str>("y"),
        ));
        assert_eq!(combined.await, Err("x"));
    }

    #[tokio::test]
    async fn test_combine_async_all_empty() {
        let combined = combine_async_all(Vec::<AsyncResult<i32, String>>::new());
        assert!(combined.is_settled());
        assert_eq!(combined.await, Ok(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_combine_async_all_preserves_order() {
        let combined = combine_async_all(vec![
            delayed::<u64, ()>(30, Ok(30)),
            delayed(10, Ok(10)),
            delayed(20, Ok(20)),
        ]);
        assert_eq!(combined.await, Ok(vec![30, 10, 20]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_combine_async_vec_leftmost_failure() {
        let results: Vec<AsyncResult<i32, &str>> = vec![
            delayed(5, Ok(0)),
            delayed(40, Err("first")),
            delayed(1, Err("second")),
        ];
        assert_eq!(combine_async(results).await, Err("first"));
    }
}
