//! The fork-join contract used to run the header's two independent VRF
//! verifications in parallel (spec.md §5, §9 "model as a fork-join scope
//! parameterized over a task executor"). The executor is abstract so a
//! deterministic single-threaded replay path and a thread-pooled one share
//! the same call site; grounded in the teacher's `rayon_manager.rs` use of
//! a dedicated rayon thread pool for compute-bound work.

use std::sync::Arc;

/// A task executor capable of running two closures and waiting for both.
pub trait Executor: Send + Sync {
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send;
}

/// Runs both closures on the calling thread, in order. Used for replay and
/// for the `tiny` profile, where spinning up a thread pool costs more than
/// it saves.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncExecutor;

impl Executor for SyncExecutor {
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        (a(), b())
    }
}

/// Runs both closures on a rayon thread pool, as `rayon::join` does.
#[derive(Clone)]
pub struct RayonExecutor {
    pool: Arc<rayon::ThreadPool>,
}

impl RayonExecutor {
    pub fn new(pool: Arc<rayon::ThreadPool>) -> Self {
        RayonExecutor { pool }
    }
}

impl Executor for RayonExecutor {
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        self.pool.install(|| rayon::join(a, b))
    }
}

/// Runs two fallible tasks under `executor` and resolves to the first
/// error encountered in call order, or both successes (spec.md §5
/// "wait for all, first-error-fail"). Used by Safrole header validation to
/// run seal verification and entropy-source verification side by side.
pub fn join_results<E, F1, F2, T1, T2, Err>(executor: &E, first: F1, second: F2) -> Result<(T1, T2), Err>
where
    E: Executor,
    F1: FnOnce() -> Result<T1, Err> + Send,
    F2: FnOnce() -> Result<T2, Err> + Send,
    T1: Send,
    T2: Send,
    Err: Send,
{
    let (r1, r2) = executor.join(first, second);
    let t1 = r1?;
    let t2 = r2?;
    Ok((t1, t2))
}
