// scheduler.rs
//! Cooperative fixed-interval dispatcher.
//!
//! Each entry remembers when it is next due. When it fires, the next due time
//! is computed from the tick time, not from the previous due time, so periods
//! stretch under load but an entry never fires twice within one period.

/// Milliseconds since boot.
pub type Millis = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskId(usize);

type Action<C> = Box<dyn FnMut(&C, Millis) + Send>;

pub struct ScheduleEntry<C> {
    pub name: &'static str,
    pub period: Millis,
    due_at: Millis,
    fired: u64,
    action: Action<C>,
}

impl<C> ScheduleEntry<C> {
    pub fn due_at(&self) -> Millis {
        self.due_at
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }
}

pub struct Scheduler<C> {
    entries: Vec<ScheduleEntry<C>>,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a periodic action. First due one period after boot.
    /// Entries fire in registration order when due on the same tick.
    pub fn every<F>(&mut self, name: &'static str, period: Millis, action: F) -> TaskId
    where
        F: FnMut(&C, Millis) + Send + 'static,
    {
        self.entries.push(ScheduleEntry {
            name,
            period,
            due_at: period,
            fired: 0,
            action: Box::new(action),
        });
        TaskId(self.entries.len() - 1)
    }

    /// Run every due action once. Returns how many fired.
    pub fn tick(&mut self, ctx: &C, now: Millis) -> usize {
        let mut n = 0;
        for e in self.entries.iter_mut() {
            if now >= e.due_at {
                e.due_at = now.saturating_add(e.period);
                e.fired += 1;
                (e.action)(ctx, now);
                n += 1;
            }
        }
        n
    }

    /// Make the entry due immediately, whatever is left of its period.
    pub fn force_due(&mut self, id: TaskId, now: Millis) {
        if let Some(e) = self.entries.get_mut(id.0) {
            e.due_at = now;
        }
    }

    pub fn entry(&self, id: TaskId) -> Option<&ScheduleEntry<C>> {
        self.entries.get(id.0)
    }
}

/// Reports high-to-low transitions of a sampled input.
#[derive(Debug)]
pub struct EdgeDetector {
    last_high: bool,
}

impl Default for EdgeDetector {
    // pull-up input idles high
    fn default() -> Self {
        Self { last_high: true }
    }
}

impl EdgeDetector {
    pub fn falling(&mut self, high: bool) -> bool {
        let edge = self.last_high && !high;
        self.last_high = high;
        edge
    }
}


// EOF
