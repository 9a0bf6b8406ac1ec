//! Shared thread pool for parallel work.
//!
//! Campaign trials run concurrently and each attack parallelizes its
//! per-sample predictions inside the same pool. Without the `parallel`
//! feature everything runs on the calling thread.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use rayon::ThreadPool;

#[cfg(feature = "parallel")]
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
static THREAD_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

/// Get or initialize the shared thread pool.
///
/// The pool uses one thread per logical CPU and 8 MB stacks, since big
/// integer ladders nest inside parallel trials. Returns `None` if the pool
/// could not be built, in which case rayon's global pool is used.
#[cfg(feature = "parallel")]
pub fn get_thread_pool() -> Option<&'static ThreadPool> {
    THREAD_POOL
        .get_or_init(|| {
            rayon::ThreadPoolBuilder::new()
                .stack_size(8 * 1024 * 1024)
                .thread_name(|i| format!("rsa-lab-{}", i))
                .build()
                .map_err(|e| tracing::warn!(error = %e, "falling back to the global rayon pool"))
                .ok()
        })
        .as_ref()
}

/// Execute an operation inside the shared thread pool.
#[cfg(feature = "parallel")]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match get_thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Execute an operation on the calling thread.
#[cfg(not(feature = "parallel"))]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R,
{
    op()
}

/// Map `f` over `items`, preserving order.
#[cfg(feature = "parallel")]
pub(crate) fn map_ordered<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    install(|| items.par_iter().map(f).collect())
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_ordered<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    F: Fn(&T) -> U,
{
    items.iter().map(f).collect()
}
