use serde::{Deserialize, Serialize};

use crate::{
    domain::{Backdrop, MainView, MediaKind, VideoChannelId, ViewTag},
    error::PlayRejection,
};

/// Notifications pushed to whoever renders the hero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum HeroEvent {
    ViewChanged { from: ViewTag, to: ViewTag },
    PlaybackChanged { is_playing: bool },
    VideoSwapped { active: VideoChannelId },
    AutoplayBlocked { media: MediaKind, reason: PlayRejection },
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeroSnapshot {
    pub is_playing: bool,
    pub has_initial_interaction: bool,
    pub current_view: ViewTag,
    pub backdrop: Backdrop,
    pub last_main_view: MainView,
    pub active_video: VideoChannelId,
}

/// Raw input as delivered by the host page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Wheel { delta_y: f64 },
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd,
    Tap,
    VideoTimeUpdate { channel: VideoChannelId },
    VideoMetadataLoaded { channel: VideoChannelId },
}

/// Whether the host should suppress the browser default for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDisposition {
    PreventDefault,
    PassThrough,
}
