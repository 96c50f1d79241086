//! Composition root: owns the gate, the scheduler, the audio fade engine,
//! the video pair, the gesture classifier and the view machine, and exposes
//! the small surface the presentation layer drives.

use media_bindings::{HostBindings, ListenerHandle, ListenerKind, MediaElement, PlayOutcome};
use shared::{
    domain::{Direction, FadeDirection, MediaKind, VideoChannelId, ViewTag},
    error::{HeroError, PlayRejection},
    protocol::{EventDisposition, HeroEvent, HeroSnapshot, InputEvent},
};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    crossfade::{CrossfadeTiming, SwapOutcome, VideoCrossfadeScheduler},
    fade::{FadeEngine, FadeTiming, ToggleOutcome},
    gate::InteractionGate,
    gesture::{GestureClassifier, InputSource, SampleVerdict, ScrollSample, TouchTracker},
    scheduler::{HeroTask, Scheduler},
    settings::HeroSettings,
    view::{ViewStateMachine, ViewTransition},
};

const EVENT_CAPACITY: usize = 64;

/// Elements and page bindings handed over to the orchestrator for its
/// lifetime.
pub struct HeroMedia {
    pub audio: Box<dyn MediaElement>,
    pub primary_video: Box<dyn MediaElement>,
    pub secondary_video: Box<dyn MediaElement>,
    pub host: Box<dyn HostBindings>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackSession {
    pub is_playing: bool,
    pub has_initial_interaction: bool,
    pub current_time: f64,
}

pub struct Orchestrator {
    settings: HeroSettings,
    gate: InteractionGate,
    scheduler: Scheduler<HeroTask>,
    audio: FadeEngine,
    videos: VideoCrossfadeScheduler,
    gestures: GestureClassifier,
    touch: TouchTracker,
    views: ViewStateMachine,
    session: PlaybackSession,
    host: Box<dyn HostBindings>,
    listeners: Vec<ListenerHandle>,
    videos_started: bool,
    user_paused: bool,
    resume_after_overlay: bool,
    torn_down: bool,
    events: broadcast::Sender<HeroEvent>,
}

impl Orchestrator {
    pub fn new(media: HeroMedia, settings: HeroSettings) -> Self {
        let mut audio = FadeEngine::new(
            media.audio,
            FadeTiming {
                duration_ms: settings.fade_duration_ms,
                steps: settings.fade_steps,
            },
            settings.scroll_volume_step,
        );
        audio.set_source(&settings.audio_src);

        let mut videos = VideoCrossfadeScheduler::new(
            media.primary_video,
            media.secondary_video,
            CrossfadeTiming {
                throttle_ms: settings.time_update_throttle_ms,
                lead_seconds: settings.swap_lead_seconds,
            },
        );
        videos.set_source(&settings.video_src);

        let gestures = GestureClassifier::new(settings.gesture_timing());

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            settings,
            gate: InteractionGate::new(),
            scheduler: Scheduler::new(),
            audio,
            videos,
            gestures,
            touch: TouchTracker::default(),
            views: ViewStateMachine::new(),
            session: PlaybackSession::default(),
            host: media.host,
            listeners: Vec::new(),
            videos_started: false,
            user_paused: false,
            resume_after_overlay: false,
            torn_down: false,
            events,
        }
    }

    pub fn settings(&self) -> &HeroSettings {
        &self.settings
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing
    }

    pub fn current_view(&self) -> &ViewTag {
        self.views.current()
    }

    pub fn session(&self) -> PlaybackSession {
        self.session
    }

    pub fn volume(&self) -> f64 {
        self.audio.volume()
    }

    pub fn active_video(&self) -> VideoChannelId {
        self.videos.active()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn snapshot(&self) -> HeroSnapshot {
        HeroSnapshot {
            is_playing: self.session.is_playing,
            has_initial_interaction: self.session.has_initial_interaction,
            current_view: self.views.current().clone(),
            backdrop: self.views.current().backdrop(),
            last_main_view: self.views.last_main_view(),
            active_video: self.videos.active(),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<HeroEvent> {
        self.events.subscribe()
    }

    /// Registers every page and media listener. Calling it again while
    /// active is a no-op.
    pub fn activate(&mut self) {
        if self.torn_down || !self.listeners.is_empty() {
            return;
        }
        let kinds = ListenerKind::PAGE.into_iter().chain(
            [VideoChannelId::Primary, VideoChannelId::Secondary]
                .into_iter()
                .flat_map(|id| {
                    [
                        ListenerKind::VideoTimeUpdate(id),
                        ListenerKind::VideoMetadataLoaded(id),
                    ]
                }),
        );
        for kind in kinds {
            let handle = self.host.add_listener(kind);
            self.listeners.push(handle);
        }
        debug!("hero: activated listeners={}", self.listeners.len());
    }

    /// Applies one host input. Anything due at or before `now_ms` runs
    /// first, so the input observes settled timers.
    pub fn handle_input(&mut self, event: InputEvent, now_ms: u64) -> EventDisposition {
        if self.torn_down {
            return EventDisposition::PassThrough;
        }
        self.tick(now_ms);

        match event {
            InputEvent::Tap => {
                self.record_gesture();
                EventDisposition::PassThrough
            }
            InputEvent::TouchStart { y } => {
                self.touch.begin(y);
                self.record_gesture();
                EventDisposition::PassThrough
            }
            InputEvent::TouchMove { y } => match self.touch.move_to(y) {
                Some(delta_y) => self.scroll(
                    ScrollSample {
                        delta_y,
                        source: InputSource::Touch,
                    },
                    now_ms,
                ),
                None if self.views.current().is_overlay() => EventDisposition::PassThrough,
                None => EventDisposition::PreventDefault,
            },
            InputEvent::TouchEnd => {
                self.touch.end();
                EventDisposition::PassThrough
            }
            InputEvent::Wheel { delta_y } => self.scroll(
                ScrollSample {
                    delta_y,
                    source: InputSource::Wheel,
                },
                now_ms,
            ),
            InputEvent::VideoTimeUpdate { channel } => {
                self.videos
                    .on_time_update(channel, now_ms, &mut self.scheduler);
                EventDisposition::PassThrough
            }
            InputEvent::VideoMetadataLoaded { channel } => {
                self.videos.on_metadata(channel);
                EventDisposition::PassThrough
            }
        }
    }

    /// Runs everything due at `now_ms` on the shared scheduler.
    pub fn tick(&mut self, now_ms: u64) {
        if self.torn_down {
            return;
        }
        self.scheduler.begin_tick(now_ms);
        while let Some((_, task)) = self.scheduler.pop_due() {
            match task {
                HeroTask::FadeTick => self.audio.on_tick(&mut self.scheduler),
                HeroTask::GestureDebounce => {
                    if let Some(direction) = self.gestures.on_debounce(&mut self.scheduler) {
                        self.apply_intent(direction);
                    }
                }
                HeroTask::GestureCooldownEnd => self.gestures.on_cooldown_end(),
                HeroTask::CrossfadeCheck => {
                    if let SwapOutcome::Swapped(active) = self.videos.on_frame() {
                        self.emit(HeroEvent::VideoSwapped { active });
                    }
                }
            }
        }
        self.session.current_time = self.audio.current_time();
    }

    pub fn start_playback(&mut self) {
        if self.torn_down {
            return;
        }
        if !self.gate.has_interacted() {
            debug!("playback: start ignored, no interaction recorded");
            return;
        }
        self.user_paused = false;
        self.lock_orientation();
        self.start_videos();

        if self.audio.is_playing() {
            return;
        }
        match self.audio.start(&mut self.scheduler) {
            PlayOutcome::Started => {
                info!("playback: started");
                self.set_playing(true);
            }
            PlayOutcome::Rejected(reason) => self.report_blocked(MediaKind::Audio, reason),
        }
    }

    pub fn stop_playback(&mut self) {
        if self.torn_down {
            return;
        }
        self.user_paused = true;
        self.resume_after_overlay = false;
        self.audio.stop(&mut self.scheduler);
        self.set_playing(false);
    }

    /// Audio button. The click itself counts as a qualifying gesture.
    pub fn toggle_audio(&mut self) {
        if self.torn_down {
            return;
        }
        if self.gate.record_interaction() {
            self.session.has_initial_interaction = true;
            self.start_playback();
            return;
        }

        self.resume_after_overlay = false;
        match self.audio.toggle(&mut self.scheduler) {
            ToggleOutcome::Paused => {
                self.user_paused = true;
                self.set_playing(false);
            }
            ToggleOutcome::Playing => {
                self.user_paused = false;
                self.start_videos();
                self.set_playing(true);
            }
            ToggleOutcome::Blocked(reason) => self.report_blocked(MediaKind::Audio, reason),
        }
    }

    pub fn change_view(&mut self, view: ViewTag) -> Result<(), HeroError> {
        if let Some(transition) = self.views.change_view(view)? {
            self.on_view_changed(transition);
        }
        Ok(())
    }

    pub fn go_back(&mut self) {
        if let Some(transition) = self.views.back() {
            self.on_view_changed(transition);
        }
    }

    /// Releases every timer, frame request, listener and decoder. Safe to
    /// call more than once; also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.audio.teardown(&mut self.scheduler);
        self.gestures.teardown(&mut self.scheduler);
        self.videos.teardown(&mut self.scheduler);
        self.scheduler.clear();
        self.touch.end();
        for handle in self.listeners.drain(..) {
            self.host.remove_listener(handle);
        }
        self.set_playing(false);
        info!("hero: torn down");
    }

    fn record_gesture(&mut self) {
        if self.gate.record_interaction() {
            self.session.has_initial_interaction = true;
            info!("gate: first interaction recorded");
            self.start_playback();
            return;
        }
        // A gesture after an autoplay refusal retries. Audio stays put if the
        // visitor paused on purpose; blocked video is always retried.
        if !self.session.is_playing
            && !self.user_paused
            && !self.resume_after_overlay
            && !self.views.current().is_overlay()
        {
            self.start_playback();
        } else if !self.videos_started {
            self.start_videos();
        }
    }

    fn scroll(&mut self, sample: ScrollSample, now_ms: u64) -> EventDisposition {
        if self.views.current().is_overlay() {
            return EventDisposition::PassThrough;
        }
        if !self.gate.has_interacted() {
            debug!("gesture: sample discarded before first interaction");
            return EventDisposition::PreventDefault;
        }

        let verdict = self.gestures.on_sample(sample, now_ms, &mut self.scheduler);
        if let SampleVerdict::Accepted(direction) = verdict {
            if self.settings.scroll_audio_blend {
                self.audio.nudge(direction, &mut self.scheduler);
            }
        }
        EventDisposition::PreventDefault
    }

    fn apply_intent(&mut self, direction: Direction) {
        if let Some(transition) = self.views.apply_intent(direction) {
            self.on_view_changed(transition);
        }
    }

    fn on_view_changed(&mut self, transition: ViewTransition) {
        let from_main = !transition.from.is_overlay();
        let to_main = !transition.to.is_overlay();

        if from_main && !to_main && self.audio.is_playing() {
            self.audio.stop(&mut self.scheduler);
            self.resume_after_overlay = true;
            self.set_playing(false);
        } else if !from_main && to_main && self.resume_after_overlay {
            self.resume_after_overlay = false;
            if self.gate.has_interacted() {
                match self.audio.resume(&mut self.scheduler) {
                    PlayOutcome::Started => self.set_playing(true),
                    PlayOutcome::Rejected(reason) => {
                        self.report_blocked(MediaKind::Audio, reason)
                    }
                }
            }
        } else if from_main && transition.to == ViewTag::Video && self.audio.is_playing() {
            self.audio.fade(FadeDirection::In, &mut self.scheduler);
        }

        self.emit(HeroEvent::ViewChanged {
            from: transition.from,
            to: transition.to,
        });
    }

    fn start_videos(&mut self) {
        if self.videos_started {
            return;
        }
        let active = self.videos.active();
        for (id, outcome) in self.videos.start() {
            match outcome {
                PlayOutcome::Started if id == active => self.videos_started = true,
                PlayOutcome::Started => {}
                PlayOutcome::Rejected(reason) => {
                    self.report_blocked(MediaKind::Video(id), reason)
                }
            }
        }
    }

    fn lock_orientation(&mut self) {
        if let Err(err) = self.host.lock_orientation() {
            debug!("orientation: lock unavailable reason={err:#}");
        }
    }

    fn set_playing(&mut self, is_playing: bool) {
        if self.session.is_playing == is_playing {
            return;
        }
        self.session.is_playing = is_playing;
        self.emit(HeroEvent::PlaybackChanged { is_playing });
    }

    fn report_blocked(&mut self, media: MediaKind, reason: PlayRejection) {
        info!("playback: {media:?} blocked, waiting for next gesture reason={reason}");
        self.emit(HeroEvent::AutoplayBlocked { media, reason });
    }

    fn emit(&self, event: HeroEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
