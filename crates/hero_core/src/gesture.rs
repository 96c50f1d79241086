//! Turns noisy wheel and touch deltas into discrete up/down intents.
//!
//! Two stages: a short debounce that waits for a burst of samples to go
//! quiet, and a longer cooldown after each emitted intent during which
//! nothing else is emitted.

use shared::domain::Direction;
use tracing::debug;

use crate::scheduler::{HeroTask, Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Wheel,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub delta_y: f64,
    pub source: InputSource,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTiming {
    pub noise_floor: f64,
    pub direction_reset_ms: u64,
    pub debounce_ms: u64,
    pub wheel_cooldown_ms: u64,
    pub touch_cooldown_ms: u64,
}

impl GestureTiming {
    pub fn cooldown_ms(&self, source: InputSource) -> u64 {
        match source {
            InputSource::Wheel => self.wheel_cooldown_ms,
            InputSource::Touch => self.touch_cooldown_ms,
        }
    }
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            noise_floor: 1.0,
            direction_reset_ms: 300,
            debounce_ms: 10,
            wheel_cooldown_ms: 1_000,
            touch_cooldown_ms: 1_500,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureState {
    pub last_direction: Option<Direction>,
    pub last_timestamp_ms: Option<u64>,
    pub consecutive_count: u32,
    pub cooldown_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleVerdict {
    BelowNoiseFloor,
    Accepted(Direction),
}

pub struct GestureClassifier {
    timing: GestureTiming,
    state: GestureState,
    last_source: InputSource,
    debounce_timer: Option<TimerId>,
    cooldown_timer: Option<TimerId>,
}

impl GestureClassifier {
    pub fn new(timing: GestureTiming) -> Self {
        Self {
            timing,
            state: GestureState::default(),
            last_source: InputSource::Wheel,
            debounce_timer: None,
            cooldown_timer: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn on_sample(
        &mut self,
        sample: ScrollSample,
        now_ms: u64,
        scheduler: &mut Scheduler<HeroTask>,
    ) -> SampleVerdict {
        if sample.delta_y.abs() <= self.timing.noise_floor {
            return SampleVerdict::BelowNoiseFloor;
        }

        let direction = Direction::from_delta(sample.delta_y);
        let stale = self
            .state
            .last_timestamp_ms
            .map_or(true, |last| {
                now_ms.saturating_sub(last) > self.timing.direction_reset_ms
            });
        if self.state.last_direction != Some(direction) || stale {
            self.state.consecutive_count = 0;
        }

        self.state.consecutive_count += 1;
        self.state.last_direction = Some(direction);
        self.state.last_timestamp_ms = Some(now_ms);
        self.last_source = sample.source;

        if let Some(timer) = self.debounce_timer.take() {
            scheduler.cancel(timer);
        }
        self.debounce_timer =
            Some(scheduler.schedule_once(self.timing.debounce_ms, HeroTask::GestureDebounce));

        SampleVerdict::Accepted(direction)
    }

    /// Debounce expired: emits at most one intent and opens the cooldown.
    pub fn on_debounce(&mut self, scheduler: &mut Scheduler<HeroTask>) -> Option<Direction> {
        self.debounce_timer = None;

        if self.state.cooldown_active {
            debug!(
                "gesture: suppressed during cooldown count={}",
                self.state.consecutive_count
            );
            return None;
        }
        if self.state.consecutive_count < 1 {
            return None;
        }
        let direction = self.state.last_direction?;

        let cooldown_ms = self.timing.cooldown_ms(self.last_source);
        self.state.cooldown_active = true;
        self.cooldown_timer =
            Some(scheduler.schedule_once(cooldown_ms, HeroTask::GestureCooldownEnd));
        debug!("gesture: intent direction={direction:?} cooldown_ms={cooldown_ms}");
        Some(direction)
    }

    pub fn on_cooldown_end(&mut self) {
        self.cooldown_timer = None;
        self.state.cooldown_active = false;
        self.state.consecutive_count = 0;
        self.state.last_direction = None;
    }

    pub fn teardown(&mut self, scheduler: &mut Scheduler<HeroTask>) {
        for timer in [self.debounce_timer.take(), self.cooldown_timer.take()]
            .into_iter()
            .flatten()
        {
            scheduler.cancel(timer);
        }
        self.state = GestureState::default();
    }
}

/// Maps a touch-move sequence onto wheel-style deltas: dragging the finger
/// up scrolls down.
#[derive(Debug, Default)]
pub struct TouchTracker {
    last_y: Option<f64>,
}

impl TouchTracker {
    pub fn begin(&mut self, y: f64) {
        self.last_y = Some(y);
    }

    pub fn move_to(&mut self, y: f64) -> Option<f64> {
        let previous = self.last_y.replace(y)?;
        Some(previous - y)
    }

    pub fn end(&mut self) {
        self.last_y = None;
    }
}

#[cfg(test)]
#[path = "tests/gesture_tests.rs"]
mod tests;
