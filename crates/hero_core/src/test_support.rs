//! In-memory media elements and host used across the unit tests. Each fake
//! hands out a cloneable handle onto its shared state so assertions can look
//! inside after ownership moved into the orchestrator.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use anyhow::anyhow;
use media_bindings::{HostBindings, ListenerHandle, ListenerKind, MediaElement, PlayOutcome};
use shared::error::PlayRejection;

#[derive(Debug, Default)]
pub struct FakeMediaState {
    pub volume: f64,
    pub paused: bool,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub source: Option<String>,
    pub reject_play: Option<PlayRejection>,
    pub play_calls: u32,
    pub pause_calls: u32,
    pub load_calls: u32,
    pub volume_history: Vec<f64>,
    pub seeks: Vec<f64>,
}

#[derive(Clone, Default)]
pub struct FakeMedia {
    state: Rc<RefCell<FakeMediaState>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        let media = Self::default();
        media.state.borrow_mut().paused = true;
        media.state.borrow_mut().volume = 1.0;
        media
    }

    pub fn with_duration(duration: f64) -> Self {
        let media = Self::new();
        media.state.borrow_mut().duration = Some(duration);
        media
    }

    pub fn rejecting(message: &str) -> Self {
        let media = Self::new();
        media.reject_with(message);
        media
    }

    pub fn boxed(&self) -> Box<dyn MediaElement> {
        Box::new(self.clone())
    }

    pub fn reject_with(&self, message: &str) {
        self.state.borrow_mut().reject_play = Some(PlayRejection::autoplay_blocked(message));
    }

    pub fn allow_play(&self) {
        self.state.borrow_mut().reject_play = None;
    }

    pub fn set_time(&self, seconds: f64) {
        self.state.borrow_mut().current_time = seconds;
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        self.state.borrow_mut().duration = duration;
    }

    pub fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    pub fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    pub fn time(&self) -> f64 {
        self.state.borrow().current_time
    }

    pub fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    pub fn play_calls(&self) -> u32 {
        self.state.borrow().play_calls
    }

    pub fn load_calls(&self) -> u32 {
        self.state.borrow().load_calls
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.state.borrow().seeks.clone()
    }

    pub fn volume_history(&self) -> Vec<f64> {
        self.state.borrow().volume_history.clone()
    }
}

impl MediaElement for FakeMedia {
    fn play(&mut self) -> PlayOutcome {
        let mut state = self.state.borrow_mut();
        state.play_calls += 1;
        match state.reject_play.clone() {
            Some(reason) => PlayOutcome::Rejected(reason),
            None => {
                state.paused = false;
                PlayOutcome::Started
            }
        }
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.pause_calls += 1;
        state.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        let mut state = self.state.borrow_mut();
        state.volume = volume;
        state.volume_history.push(volume);
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        state.current_time = seconds;
        state.seeks.push(seconds);
    }

    fn duration(&self) -> Option<f64> {
        self.state.borrow().duration
    }

    fn set_source(&mut self, src: Option<&str>) {
        let mut state = self.state.borrow_mut();
        state.source = src.map(str::to_string);
        if src.is_none() {
            state.duration = None;
        }
    }

    fn load(&mut self) {
        self.state.borrow_mut().load_calls += 1;
    }
}

#[derive(Debug, Default)]
pub struct FakeHostState {
    pub next_handle: u64,
    pub live: HashMap<ListenerHandle, ListenerKind>,
    pub orientation_fails: bool,
    pub orientation_requests: u32,
}

#[derive(Clone, Default)]
pub struct FakeHost {
    state: Rc<RefCell<FakeHostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_orientation() -> Self {
        let host = Self::new();
        host.state.borrow_mut().orientation_fails = true;
        host
    }

    pub fn boxed(&self) -> Box<dyn HostBindings> {
        Box::new(self.clone())
    }

    pub fn live_listeners(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn has_listener(&self, kind: ListenerKind) -> bool {
        self.state.borrow().live.values().any(|live| *live == kind)
    }

    pub fn orientation_requests(&self) -> u32 {
        self.state.borrow().orientation_requests
    }
}

impl HostBindings for FakeHost {
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = ListenerHandle(state.next_handle);
        state.live.insert(handle, kind);
        handle
    }

    fn remove_listener(&mut self, handle: ListenerHandle) {
        self.state.borrow_mut().live.remove(&handle);
    }

    fn lock_orientation(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.orientation_requests += 1;
        if state.orientation_fails {
            return Err(anyhow!("orientation lock not allowed"));
        }
        Ok(())
    }
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Runs every task due at `now_ms` through `handle`.
pub fn run_due<T: Copy>(
    scheduler: &mut crate::scheduler::Scheduler<T>,
    now_ms: u64,
    mut handle: impl FnMut(&mut crate::scheduler::Scheduler<T>, T),
) {
    scheduler.begin_tick(now_ms);
    while let Some((_, task)) = scheduler.pop_due() {
        handle(scheduler, task);
    }
}
