//! Single cooperative tick source for every timer, debounce and
//! animation-frame callback in the hero.
//!
//! Time is a virtual millisecond clock advanced by the caller; nothing here
//! reads the wall clock. Handlers pull one due task at a time through
//! [`Scheduler::pop_due`], so a cancellation performed while handling one
//! task is honoured for the rest of the same tick.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work items the orchestrator schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroTask {
    FadeTick,
    GestureDebounce,
    GestureCooldownEnd,
    CrossfadeCheck,
}

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u64>,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer<T>>,
    requested_frames: Vec<(TimerId, T)>,
    ready_frames: Vec<(TimerId, T)>,
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            timers: Vec::new(),
            requested_frames: Vec::new(),
            ready_frames: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Moves the clock forward. Going backwards is ignored.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn schedule_once(&mut self, delay_ms: u64, task: T) -> TimerId {
        let id = self.allocate_id();
        self.timers.push(Timer {
            id,
            due_ms: self.now_ms + delay_ms,
            period_ms: None,
            task,
        });
        id
    }

    /// Fires every `period_ms` (at least 1) until cancelled.
    pub fn schedule_repeating(&mut self, period_ms: u64, task: T) -> TimerId {
        let period_ms = period_ms.max(1);
        let id = self.allocate_id();
        self.timers.push(Timer {
            id,
            due_ms: self.now_ms + period_ms,
            period_ms: Some(period_ms),
            task,
        });
        id
    }

    /// Runs `task` on the tick after the current one.
    pub fn request_frame(&mut self, task: T) -> TimerId {
        let id = self.allocate_id();
        self.requested_frames.push((id, task));
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending();
        self.timers.retain(|timer| timer.id != id);
        self.requested_frames.retain(|(frame, _)| *frame != id);
        self.ready_frames.retain(|(frame, _)| *frame != id);
        before != self.pending()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
            || self.requested_frames.iter().any(|(frame, _)| *frame == id)
            || self.ready_frames.iter().any(|(frame, _)| *frame == id)
    }

    /// Starts a tick: advances the clock and releases frames requested
    /// before this point.
    pub fn begin_tick(&mut self, now_ms: u64) {
        self.advance_to(now_ms);
        let requested = std::mem::take(&mut self.requested_frames);
        self.ready_frames.extend(requested);
    }

    /// Next task due at the current clock, frames first, then timers in
    /// deadline order.
    pub fn pop_due(&mut self) -> Option<(TimerId, T)> {
        if !self.ready_frames.is_empty() {
            return Some(self.ready_frames.remove(0));
        }

        let now_ms = self.now_ms;
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= now_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.id))
            .map(|(index, _)| index)?;

        let timer = &mut self.timers[index];
        let fired = (timer.id, timer.task);
        match timer.period_ms {
            Some(period_ms) => timer.due_ms += period_ms,
            None => {
                self.timers.remove(index);
            }
        }
        Some(fired)
    }

    pub fn pending(&self) -> usize {
        self.timers.len() + self.requested_frames.len() + self.ready_frames.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
        self.requested_frames.clear();
        self.ready_frames.clear();
    }

    fn allocate_id(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }
}

impl<T: Copy> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
