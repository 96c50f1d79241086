//! Seamless looping over two video elements carrying the same clip.
//!
//! The active channel plays until it is `lead` seconds from its end; the
//! other channel is rewound and started, and once it confirms playback it
//! becomes active. The previous channel runs out unseen.

use media_bindings::{MediaElement, PlayOutcome};
use shared::{domain::VideoChannelId, error::PlayRejection};
use tracing::{debug, info, warn};

use crate::scheduler::{HeroTask, Scheduler, TimerId};

/// `Swapping` spans the incoming channel's `play()`. A host that delivers
/// time updates re-entrantly from inside `play()` sees `Busy` instead of
/// starting a second swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapState {
    Idle,
    Swapping,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SwapOutcome {
    NotReady,
    NotDue,
    Busy,
    Swapped(VideoChannelId),
    Failed(PlayRejection),
}

pub struct VideoChannel {
    pub id: VideoChannelId,
    element: Box<dyn MediaElement>,
    pub is_active: bool,
}

impl VideoChannel {
    fn new(id: VideoChannelId, element: Box<dyn MediaElement>, is_active: bool) -> Self {
        Self {
            id,
            element,
            is_active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeTiming {
    pub throttle_ms: u64,
    pub lead_seconds: f64,
}

impl Default for CrossfadeTiming {
    fn default() -> Self {
        Self {
            throttle_ms: 100,
            lead_seconds: 1.0,
        }
    }
}

pub struct VideoCrossfadeScheduler {
    channels: [VideoChannel; 2],
    timing: CrossfadeTiming,
    state: SwapState,
    transition_point: Option<f64>,
    last_sample_ms: Option<u64>,
    pending_frame: Option<TimerId>,
}

impl VideoCrossfadeScheduler {
    pub fn new(
        primary: Box<dyn MediaElement>,
        secondary: Box<dyn MediaElement>,
        timing: CrossfadeTiming,
    ) -> Self {
        Self {
            channels: [
                VideoChannel::new(VideoChannelId::Primary, primary, true),
                VideoChannel::new(VideoChannelId::Secondary, secondary, false),
            ],
            timing,
            state: SwapState::Idle,
            transition_point: None,
            last_sample_ms: None,
            pending_frame: None,
        }
    }

    pub fn state(&self) -> SwapState {
        self.state
    }

    pub fn transition_point(&self) -> Option<f64> {
        self.transition_point
    }

    pub fn active(&self) -> VideoChannelId {
        self.channels
            .iter()
            .find(|channel| channel.is_active)
            .map(|channel| channel.id)
            .unwrap_or(VideoChannelId::Primary)
    }

    pub fn channel(&self, id: VideoChannelId) -> &VideoChannel {
        &self.channels[Self::index(id)]
    }

    pub fn set_source(&mut self, src: &str) {
        for channel in &mut self.channels {
            channel.element.set_source(Some(src));
        }
    }

    /// Plays the active channel and primes the other one so both have been
    /// started under the unlocking gesture.
    pub fn start(&mut self) -> Vec<(VideoChannelId, PlayOutcome)> {
        let active = self.active();
        let mut outcomes = Vec::with_capacity(2);

        let outcome = self.channel_mut(active).element.play();
        if let PlayOutcome::Rejected(reason) = &outcome {
            warn!("video: active channel={active} play rejected reason={reason}");
        }
        outcomes.push((active, outcome));

        let standby = self.channel_mut(active.other());
        let outcome = standby.element.play();
        match &outcome {
            PlayOutcome::Started => {
                standby.element.pause();
                standby.element.set_current_time(0.0);
            }
            PlayOutcome::Rejected(reason) => {
                debug!(
                    "video: standby channel={} prime rejected reason={reason}",
                    standby.id
                );
            }
        }
        outcomes.push((active.other(), outcome));
        outcomes
    }

    /// Freezes the transition point from the first channel that knows its
    /// duration.
    pub fn on_metadata(&mut self, id: VideoChannelId) {
        if self.transition_point.is_some() {
            return;
        }
        let Some(duration) = self.channel(id).element.duration() else {
            return;
        };
        if !duration.is_finite() || duration <= self.timing.lead_seconds {
            debug!("video: channel={id} duration={duration} too short to loop, not ready");
            return;
        }
        let point = duration - self.timing.lead_seconds;
        info!("video: transition point fixed at {point:.3}s from channel={id}");
        self.transition_point = Some(point);
    }

    /// Throttled time-update intake; the actual check runs on the next frame.
    pub fn on_time_update(
        &mut self,
        id: VideoChannelId,
        now_ms: u64,
        scheduler: &mut Scheduler<HeroTask>,
    ) {
        if id != self.active() {
            return;
        }
        if let Some(last) = self.last_sample_ms {
            if now_ms.saturating_sub(last) < self.timing.throttle_ms {
                return;
            }
        }
        self.last_sample_ms = Some(now_ms);
        if self.pending_frame.is_none() {
            self.pending_frame = Some(scheduler.request_frame(HeroTask::CrossfadeCheck));
        }
    }

    pub fn on_frame(&mut self) -> SwapOutcome {
        self.pending_frame = None;
        self.check()
    }

    pub fn check(&mut self) -> SwapOutcome {
        if self.state == SwapState::Swapping {
            return SwapOutcome::Busy;
        }
        let active = self.active();
        if self.transition_point.is_none() {
            self.on_metadata(active);
        }
        let Some(point) = self.transition_point else {
            return SwapOutcome::NotReady;
        };
        if self.channel(active).element.current_time() < point {
            return SwapOutcome::NotDue;
        }

        self.state = SwapState::Swapping;
        let next = active.other();
        let incoming = self.channel_mut(next);
        incoming.element.set_current_time(0.0);
        let outcome = incoming.element.play();
        self.state = SwapState::Idle;

        match outcome {
            PlayOutcome::Started => {
                self.channel_mut(active).is_active = false;
                self.channel_mut(next).is_active = true;
                debug!("video: swapped active channel {active} -> {next}");
                SwapOutcome::Swapped(next)
            }
            PlayOutcome::Rejected(reason) => {
                warn!("video: swap to channel={next} rejected, keeping channel={active} reason={reason}");
                SwapOutcome::Failed(reason)
            }
        }
    }

    /// Stops both channels and drops their sources so decoders are released.
    pub fn teardown(&mut self, scheduler: &mut Scheduler<HeroTask>) {
        if let Some(frame) = self.pending_frame.take() {
            scheduler.cancel(frame);
        }
        for channel in &mut self.channels {
            channel.element.pause();
            channel.element.set_source(None);
            channel.element.load();
        }
        self.state = SwapState::Idle;
    }

    fn channel_mut(&mut self, id: VideoChannelId) -> &mut VideoChannel {
        &mut self.channels[Self::index(id)]
    }

    fn index(id: VideoChannelId) -> usize {
        match id {
            VideoChannelId::Primary => 0,
            VideoChannelId::Secondary => 1,
        }
    }
}

#[cfg(test)]
#[path = "tests/crossfade_tests.rs"]
mod tests;
