//! Volume ramps for the background audio channel.
//!
//! Two modes share one cancellation discipline: a timed ramp driven by a
//! repeating scheduler timer, and a continuous mode nudged by scroll samples.
//! Starting either cancels whatever was in flight, so at most one ramp ever
//! writes to the element.

use media_bindings::{MediaElement, PlayOutcome};
use shared::{
    domain::{Direction, FadeDirection},
    error::PlayRejection,
};
use tracing::{debug, warn};

use crate::scheduler::{HeroTask, Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeTiming {
    pub duration_ms: u64,
    pub steps: u32,
}

impl Default for FadeTiming {
    fn default() -> Self {
        Self {
            duration_ms: 1_500,
            steps: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeOperation {
    pub direction: FadeDirection,
    pub current_volume: f64,
    pub step_size: f64,
    pub step_interval_ms: u64,
    pub steps_remaining: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Paused,
    Playing,
    Blocked(PlayRejection),
}

pub struct FadeEngine {
    element: Box<dyn MediaElement>,
    timing: FadeTiming,
    nudge_step: f64,
    playing: bool,
    active: Option<(TimerId, FadeOperation)>,
}

impl FadeEngine {
    pub fn new(element: Box<dyn MediaElement>, timing: FadeTiming, nudge_step: f64) -> Self {
        Self {
            element,
            timing,
            nudge_step,
            playing: false,
            active: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f64 {
        self.element.volume()
    }

    pub fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    pub fn active_fade(&self) -> Option<&FadeOperation> {
        self.active.as_ref().map(|(_, op)| op)
    }

    pub fn set_source(&mut self, src: &str) {
        self.element.set_source(Some(src));
    }

    /// Timed ramp with the engine's default timing.
    pub fn fade(&mut self, direction: FadeDirection, scheduler: &mut Scheduler<HeroTask>) {
        self.fade_with(direction, self.timing, scheduler);
    }

    pub fn fade_with(
        &mut self,
        direction: FadeDirection,
        timing: FadeTiming,
        scheduler: &mut Scheduler<HeroTask>,
    ) {
        self.cancel(scheduler);

        let steps = timing.steps.max(1);
        let step_interval_ms = (timing.duration_ms / u64::from(steps)).max(1);
        let op = FadeOperation {
            direction,
            current_volume: self.element.volume().clamp(0.0, 1.0),
            step_size: 1.0 / f64::from(steps),
            step_interval_ms,
            steps_remaining: steps,
        };
        let timer = scheduler.schedule_repeating(step_interval_ms, HeroTask::FadeTick);
        debug!(
            "audio: fade start direction={direction:?} volume={:.3} interval_ms={step_interval_ms}",
            op.current_volume
        );
        self.active = Some((timer, op));
    }

    /// One step of the in-flight ramp. Stray ticks with no ramp are ignored.
    pub fn on_tick(&mut self, scheduler: &mut Scheduler<HeroTask>) {
        let Some((timer, op)) = self.active.as_mut() else {
            return;
        };

        op.steps_remaining = op.steps_remaining.saturating_sub(1);
        let delta = match op.direction {
            FadeDirection::In => op.step_size,
            FadeDirection::Out => -op.step_size,
        };
        let mut volume = (op.current_volume + delta).clamp(0.0, 1.0);
        if op.steps_remaining == 0 {
            volume = op.direction.bound();
        }
        op.current_volume = volume;
        self.element.set_volume(volume);

        let finished = match op.direction {
            FadeDirection::In => volume >= 1.0,
            FadeDirection::Out => volume <= 0.0,
        };
        if !finished {
            return;
        }

        let (timer, direction) = (*timer, op.direction);
        scheduler.cancel(timer);
        self.active = None;
        if direction == FadeDirection::Out {
            self.element.pause();
        }
        debug!("audio: fade complete direction={direction:?}");
    }

    /// Continuous mode: one fixed step per qualifying scroll sample, down
    /// lowers the volume and up raises it.
    pub fn nudge(&mut self, direction: Direction, scheduler: &mut Scheduler<HeroTask>) {
        if !self.playing {
            return;
        }
        self.cancel(scheduler);
        let delta = match direction {
            Direction::Down => -self.nudge_step,
            Direction::Up => self.nudge_step,
        };
        let volume = (self.element.volume() + delta).clamp(0.0, 1.0);
        self.element.set_volume(volume);
    }

    /// Starts from silence and ramps in once the element confirms playback.
    pub fn start(&mut self, scheduler: &mut Scheduler<HeroTask>) -> PlayOutcome {
        self.cancel(scheduler);
        self.element.set_volume(0.0);
        self.resume(scheduler)
    }

    /// Plays from the current volume and ramps in.
    pub fn resume(&mut self, scheduler: &mut Scheduler<HeroTask>) -> PlayOutcome {
        let outcome = self.element.play();
        match &outcome {
            PlayOutcome::Started => {
                self.playing = true;
                self.fade(FadeDirection::In, scheduler);
            }
            PlayOutcome::Rejected(reason) => {
                self.playing = false;
                warn!("audio: play rejected, staying paused reason={reason}");
            }
        }
        outcome
    }

    /// Flags the channel as not playing immediately and ramps out; the
    /// element pauses when the ramp bottoms out.
    pub fn stop(&mut self, scheduler: &mut Scheduler<HeroTask>) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.fade(FadeDirection::Out, scheduler);
    }

    pub fn toggle(&mut self, scheduler: &mut Scheduler<HeroTask>) -> ToggleOutcome {
        if self.playing {
            self.stop(scheduler);
            return ToggleOutcome::Paused;
        }
        match self.resume(scheduler) {
            PlayOutcome::Started => ToggleOutcome::Playing,
            PlayOutcome::Rejected(reason) => ToggleOutcome::Blocked(reason),
        }
    }

    pub fn teardown(&mut self, scheduler: &mut Scheduler<HeroTask>) {
        self.cancel(scheduler);
        self.playing = false;
        self.element.pause();
    }

    fn cancel(&mut self, scheduler: &mut Scheduler<HeroTask>) {
        if let Some((timer, _)) = self.active.take() {
            scheduler.cancel(timer);
        }
    }
}

#[cfg(test)]
#[path = "tests/fade_tests.rs"]
mod tests;
