//! Discrete-event queue standing in for browser timers
//!
//! Jobs are ordered by scheduled time, then by insertion order, so two jobs
//! due at the same instant run in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Deferred work owned by the game controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Spawner clock firing
    SpawnTick,
    /// Round clock firing (1 s)
    TimerTick,
    /// Target lifetime elapsed
    Expire { generation: u32, target_id: u32 },
    /// Cosmetic removal after hit/expiry
    Remove { generation: u32, target_id: u32 },
    /// Preview clock firing
    PreviewSpawn,
    /// Preview target lifetime elapsed
    PreviewFade { target_id: u32 },
    /// Preview target fade-out done
    PreviewRemove { target_id: u32 },
}

impl Job {
    /// Periodic round clocks (cancelled on end/quit)
    pub fn is_round_clock(&self) -> bool {
        matches!(self, Job::SpawnTick | Job::TimerTick)
    }

    pub fn is_preview(&self) -> bool {
        matches!(
            self,
            Job::PreviewSpawn | Job::PreviewFade { .. } | Job::PreviewRemove { .. }
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    at: f64,
    seq: u64,
    job: Job,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap, earliest entry must surface first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time-ordered job queue
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `job` to run at `at` (ms)
    pub fn schedule(&mut self, at: f64, job: Job) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { at, seq, job });
    }

    /// Pop the earliest job due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, Job)> {
        if self.queue.peek()?.at > now {
            return None;
        }
        self.queue.pop().map(|e| (e.at, e.job))
    }

    /// Drop every queued job matching `pred`
    pub fn cancel(&mut self, pred: impl Fn(&Job) -> bool) {
        self.queue.retain(|e| !pred(&e.job));
    }

    /// Time of the next queued job
    pub fn next_at(&self) -> Option<f64> {
        self.queue.peek().map(|e| e.at)
    }

    pub fn contains(&self, pred: impl Fn(&Job) -> bool) -> bool {
        self.queue.iter().any(|e| pred(&e.job))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_time_order() {
        let mut s = Scheduler::new();
        s.schedule(300.0, Job::TimerTick);
        s.schedule(100.0, Job::SpawnTick);
        s.schedule(200.0, Job::PreviewSpawn);

        assert_eq!(s.next_at(), Some(100.0));
        assert_eq!(s.pop_due(1000.0), Some((100.0, Job::SpawnTick)));
        assert_eq!(s.pop_due(1000.0), Some((200.0, Job::PreviewSpawn)));
        assert_eq!(s.pop_due(1000.0), Some((300.0, Job::TimerTick)));
        assert_eq!(s.pop_due(1000.0), None);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule(50.0, Job::TimerTick);
        s.schedule(50.0, Job::SpawnTick);
        assert_eq!(s.pop_due(50.0).map(|(_, j)| j), Some(Job::TimerTick));
        assert_eq!(s.pop_due(50.0).map(|(_, j)| j), Some(Job::SpawnTick));
    }

    #[test]
    fn test_not_due_yet() {
        let mut s = Scheduler::new();
        s.schedule(500.0, Job::SpawnTick);
        assert_eq!(s.pop_due(499.9), None);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_cancel_round_clocks() {
        let mut s = Scheduler::new();
        s.schedule(10.0, Job::SpawnTick);
        s.schedule(20.0, Job::TimerTick);
        s.schedule(
            30.0,
            Job::Expire {
                generation: 1,
                target_id: 4,
            },
        );
        s.cancel(Job::is_round_clock);
        assert_eq!(s.len(), 1);
        assert!(!s.contains(Job::is_round_clock));
        assert!(s.contains(|j| matches!(j, Job::Expire { target_id: 4, .. })));
    }
}
