/// Cancellable deferred callbacks on a logical clock
///
/// Timestamps are `Duration`s measured from an epoch the host picks (game
/// start, scene load). The owner advances time explicitly by calling
/// `pop_due`, so tests and single-threaded game loops control exactly when
/// deferred work runs. No OS timers, no background threads.
use std::time::Duration;

/// Handle to a scheduled entry, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Entry<T> {
    id: u64,
    deadline: Duration,
    payload: T,
}

/// Ordered queue of deferred payloads with idempotent cancellation
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Entry<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Queue `payload` to become due once logical time reaches `deadline`
    pub fn schedule(&mut self, deadline: Duration, payload: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Entry {
            id,
            deadline,
            payload,
        });
        TimerHandle(id)
    }

    /// Remove a scheduled entry. No-op if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|e| e.id != handle.0);
    }

    /// Whether the entry behind `handle` is still queued
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|e| e.id == handle.0)
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|e| e.deadline).min()
    }

    /// Remove and return every payload whose deadline is at or before `now`,
    /// in deadline order
    pub fn pop_due(&mut self, now: Duration) -> Vec<T> {
        let mut due: Vec<Entry<T>> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].deadline <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        // Ties keep insertion order via the monotonically increasing id
        due.sort_by_key(|e| (e.deadline, e.id));
        due.into_iter().map(|e| e.payload).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn test_pop_due_respects_deadline() {
        let mut sched = Scheduler::new();
        sched.schedule(secs(1.0), "a");
        sched.schedule(secs(2.0), "b");

        assert!(sched.pop_due(secs(0.5)).is_empty());
        assert_eq!(sched.pop_due(secs(1.0)), vec!["a"]);
        assert_eq!(sched.pop_due(secs(5.0)), vec!["b"]);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn test_pop_due_deadline_order() {
        let mut sched = Scheduler::new();
        sched.schedule(secs(3.0), "late");
        sched.schedule(secs(1.0), "early");
        sched.schedule(secs(2.0), "mid");

        assert_eq!(sched.pop_due(secs(10.0)), vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_cancel_removes_entry() {
        let mut sched = Scheduler::new();
        let keep = sched.schedule(secs(1.0), "keep");
        let drop = sched.schedule(secs(1.0), "drop");

        sched.cancel(drop);
        assert!(sched.is_scheduled(keep));
        assert!(!sched.is_scheduled(drop));
        assert_eq!(sched.pop_due(secs(1.0)), vec!["keep"]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut sched = Scheduler::new();
        let handle = sched.schedule(secs(1.0), ());

        sched.cancel(handle);
        sched.cancel(handle);
        assert_eq!(sched.pending_count(), 0);

        // Cancelling after the entry fired is also a no-op
        let handle = sched.schedule(secs(1.0), ());
        assert_eq!(sched.pop_due(secs(1.0)).len(), 1);
        sched.cancel(handle);
    }

    #[test]
    fn test_next_deadline() {
        let mut sched = Scheduler::new();
        assert_eq!(sched.next_deadline(), None);

        sched.schedule(secs(2.0), ());
        sched.schedule(secs(1.0), ());
        assert_eq!(sched.next_deadline(), Some(secs(1.0)));
    }

    #[test]
    fn test_handles_stay_unique_across_reuse() {
        let mut sched = Scheduler::new();
        let first = sched.schedule(secs(1.0), "first");
        sched.pop_due(secs(1.0));

        let second = sched.schedule(secs(2.0), "second");
        assert_ne!(first, second);

        // A stale handle must not cancel a newer entry
        sched.cancel(first);
        assert!(sched.is_scheduled(second));
    }
}
