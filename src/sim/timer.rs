//! Guarded one-shot timers on the simulation clock
//!
//! Deferred work (preview reveal, win announcement, loss check) is queued as
//! a [`TimerTask`] value. The session re-checks its own state when a task
//! comes due, so a task made irrelevant by a phase change simply does nothing.

use std::time::Duration;

/// Deferred work the session knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Show the next-piece preview, unless a newer drop re-hid it
    RevealPreview { generation: u32 },
    /// Enter `Won` after the top-tier merge
    AnnounceWin,
    /// Debounced loss evaluation
    CheckLoss,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Duration,
    seq: u64,
    task: TimerTask,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run once `delay` after `now`
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: TimerTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due: now + delay,
            seq,
            task,
        });
    }

    /// Remove and return every task due at or before `now`, earliest first
    /// (ties keep scheduling order)
    pub fn take_due(&mut self, now: Duration) -> Vec<TimerTask> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due <= now {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.due, s.seq));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn is_pending(&self, task: TimerTask) -> bool {
        self.pending.iter().any(|s| s.task == task)
    }

    /// Pending copies of `task`
    pub fn count(&self, task: TimerTask) -> usize {
        self.pending.iter().filter(|s| s.task == task).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
