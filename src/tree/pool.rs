//! Bounded worker pool for the build phase.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Total admission weight per root traversal.
pub const CAPACITY: usize = 64;

/// Weight one spawned child expansion holds while it runs.
pub const TASK_WEIGHT: usize = 2;

/// Stack size of each walker thread. Every nesting level adds a `visit`,
/// `fan_out` and `rayon::scope` frame, so the rayon default runs out well
/// before `PATH_MAX` depth.
pub const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Weighted, non-blocking admission counter.
#[derive(Debug)]
pub struct Admission {
    capacity: usize,
    in_use: AtomicUsize,
}

impl Admission {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: AtomicUsize::new(0),
        }
    }

    /// Take `weight` units if they are free right now. Never blocks.
    pub fn try_acquire(&self, weight: usize) -> Option<Permit<'_>> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let next = used.checked_add(weight)?;
                (next <= self.capacity).then_some(next)
            })
            .ok()
            .map(|_| Permit {
                admission: self,
                weight,
            })
    }

    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }
}

/// Units held by one task; returned on drop.
#[derive(Debug)]
pub struct Permit<'a> {
    admission: &'a Admission,
    weight: usize,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.admission
            .in_use
            .fetch_sub(self.weight, Ordering::AcqRel);
    }
}

/// A rayon pool plus the admission counter that gates spawning into it.
pub struct WorkerPool {
    pub(crate) pool: rayon::ThreadPool,
    pub(crate) admission: Admission,
}

impl WorkerPool {
    /// Build a pool with `workers` threads (0 picks rayon's default).
    pub fn new(workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("arbor-walk-{i}"))
            .stack_size(WORKER_STACK_SIZE)
            .build()?;
        Ok(Self {
            pool,
            admission: Admission::new(CAPACITY),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .field("admission", &self.admission)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_is_bounded() {
        let admission = Admission::new(4);
        let a = admission.try_acquire(TASK_WEIGHT).unwrap();
        let b = admission.try_acquire(TASK_WEIGHT).unwrap();
        assert_eq!(admission.in_use(), 4);
        assert!(admission.try_acquire(TASK_WEIGHT).is_none());

        drop(a);
        assert_eq!(admission.in_use(), 2);
        let c = admission.try_acquire(TASK_WEIGHT);
        assert!(c.is_some());
        drop(b);
        drop(c);
        assert_eq!(admission.in_use(), 0);
    }

    #[test]
    fn test_oversized_request_fails() {
        let admission = Admission::new(CAPACITY);
        assert!(admission.try_acquire(CAPACITY + 1).is_none());
        assert_eq!(admission.in_use(), 0);
    }

    #[test]
    fn test_pool_threads() {
        let pool = WorkerPool::new(2).unwrap();
        assert_eq!(pool.threads(), 2);
    }
}
