//! Fixed media paths served next to the page.

pub const AUDIO_SRC: &str = "/background-music.mp3";
pub const VIDEO_SRC: &str = "/loft-video.webm";
pub const BACKGROUND_IMAGE_SRC: &str = "/fundo.webp";
pub const DUNES_IMAGE_SRC: &str = "/dunes.webp";
