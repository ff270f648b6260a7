use std::time::Duration;

/// Every kind of deferred callback a session can have pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    TimerSample,
    CountdownTick,
    BotStep,
    ErrorPulseEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry {
    id: TaskId,
    kind: TaskKind,
    due: Duration,
    period: Option<Duration>,
}

/// A due task handed back by [`Scheduler::pop_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub due: Duration,
}

/// Cancellable one-shot and repeating tasks on a single logical thread.
///
/// Tasks are plain data; the owner pulls due tasks and dispatches them. A
/// cancelled task is removed immediately, so it can never be handed back.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, kind: TaskKind, due: Duration) -> TaskId {
        self.insert(kind, due, None)
    }

    /// First fires at `first_due`, then every `period` until cancelled.
    pub fn schedule_repeating(
        &mut self,
        kind: TaskKind,
        first_due: Duration,
        period: Duration,
    ) -> TaskId {
        // a zero period would make pop_due spin forever
        let period = period.max(Duration::from_millis(1));
        self.insert(kind, first_due, Some(period))
    }

    fn insert(&mut self, kind: TaskKind, due: Duration, period: Option<Duration>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            due,
            period,
        });
        id
    }

    /// Returns whether the task was still pending. Cancelling twice is fine.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Takes the earliest task due at or before `now`. Ties go to the task
    /// scheduled first. Repeating tasks are re-armed before being returned.
    pub fn pop_due(&mut self, now: Duration) -> Option<DueTask> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(idx, _)| idx)?;

        let entry = &mut self.entries[idx];
        let task = DueTask {
            id: entry.id,
            kind: entry.kind,
            due: entry.due,
        };
        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.remove(idx);
            }
        }
        Some(task)
    }
}
