//! Host seam: the handful of media-element and page operations the
//! orchestrator needs, independent of the embedding (browser, native shell,
//! test double).

use shared::{domain::VideoChannelId, error::PlayRejection};

/// Settled result of a `play()` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Started,
    Rejected(PlayRejection),
}

impl PlayOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, PlayOutcome::Started)
    }
}

/// An owned audio or video element.
pub trait MediaElement {
    fn play(&mut self) -> PlayOutcome;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;
    fn set_source(&mut self, src: Option<&str>);
    /// Forces the element to re-evaluate its source, releasing decoder memory
    /// when the source has been cleared.
    fn load(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
    Click,
    VideoTimeUpdate(VideoChannelId),
    VideoMetadataLoaded(VideoChannelId),
}

impl ListenerKind {
    pub const PAGE: [ListenerKind; 5] = [
        ListenerKind::Wheel,
        ListenerKind::TouchStart,
        ListenerKind::TouchMove,
        ListenerKind::TouchEnd,
        ListenerKind::Click,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

pub trait HostBindings {
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerHandle;
    fn remove_listener(&mut self, handle: ListenerHandle);
    /// Best effort; callers ignore failures.
    fn lock_orientation(&mut self) -> anyhow::Result<()>;
}

/// Host with nothing to bind to.
pub struct DetachedHost {
    next_handle: u64,
}

impl DetachedHost {
    pub fn new() -> Self {
        Self { next_handle: 0 }
    }
}

impl Default for DetachedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBindings for DetachedHost {
    fn add_listener(&mut self, _kind: ListenerKind) -> ListenerHandle {
        self.next_handle += 1;
        ListenerHandle(self.next_handle)
    }

    fn remove_listener(&mut self, _handle: ListenerHandle) {}

    fn lock_orientation(&mut self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("screen orientation is unavailable"))
    }
}
