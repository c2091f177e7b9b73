use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Outstanding jobs of one pass.
#[derive(Debug)]
pub struct JobCounter {
    total: usize,
    remaining: AtomicUsize,
    completed: AtomicBool,
}

impl JobCounter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            remaining: AtomicUsize::new(total),
            completed: AtomicBool::new(false),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Records one finished job. Returns `true` for the call that took the
    /// counter to zero; extra calls saturate at zero.
    pub fn finish_one(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map(|previous| previous == 1)
            .unwrap_or(false)
    }

    /// `true` exactly once, and only when no job is outstanding.
    pub fn try_complete(&self) -> bool {
        self.remaining() == 0
            && self
                .completed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    pub fn guard(&self) -> JobGuard<'_> {
        JobGuard {
            counter: self,
            finished: false,
        }
    }
}

/// Decrements its counter exactly once: on `finish` or when dropped.
pub struct JobGuard<'a> {
    counter: &'a JobCounter,
    finished: bool,
}

impl JobGuard<'_> {
    pub fn finish(mut self) -> bool {
        self.finished = true;
        self.counter.finish_one()
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.counter.finish_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_zero_jobs_complete_immediately() {
        let counter = JobCounter::new(0);
        assert!(counter.try_complete());
        assert!(!counter.try_complete());
    }

    #[test]
    fn test_finish_one_reports_last_job() {
        let counter = JobCounter::new(2);
        assert!(!counter.try_complete());
        assert!(!counter.finish_one());
        assert!(counter.finish_one());
        assert!(!counter.finish_one());
        assert_eq!(counter.remaining(), 0);
        assert!(counter.try_complete());
        assert!(!counter.try_complete());
    }

    #[test]
    fn test_guard_decrements_once() {
        let counter = JobCounter::new(2);
        {
            let _guard = counter.guard();
        }
        assert_eq!(counter.remaining(), 1);
        assert!(counter.guard().finish());
        assert_eq!(counter.remaining(), 0);
    }

    #[test]
    fn test_concurrent_decrements_fire_once() {
        let counter = Arc::new(JobCounter::new(64));
        let handles: Vec<_> = (0..64)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || counter.finish_one())
            })
            .collect();

        let fired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|last| *last)
            .count();

        assert_eq!(fired, 1);
        assert!(counter.try_complete());
    }
}
