use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assets::{BACKGROUND_IMAGE_SRC, DUNES_IMAGE_SRC};

macro_rules! label_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

label_newtype!(PolicyId);

/// Scroll intent, already normalized from the raw wheel/touch sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Positive deltas scroll the page down.
    pub fn from_delta(delta_y: f64) -> Self {
        if delta_y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeDirection {
    In,
    Out,
}

impl FadeDirection {
    /// Volume at which a fade in this direction terminates.
    pub fn bound(self) -> f64 {
        match self {
            FadeDirection::In => 1.0,
            FadeDirection::Out => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoChannelId {
    Primary,
    Secondary,
}

impl VideoChannelId {
    pub fn other(self) -> Self {
        match self {
            VideoChannelId::Primary => VideoChannelId::Secondary,
            VideoChannelId::Secondary => VideoChannelId::Primary,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            VideoChannelId::Primary => 1,
            VideoChannelId::Secondary => 2,
        }
    }
}

impl fmt::Display for VideoChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video(VideoChannelId),
}

/// The three scroll-reachable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainView {
    Video,
    Black,
    Dunes,
}

impl MainView {
    pub const SEQUENCE: [MainView; 3] = [MainView::Video, MainView::Black, MainView::Dunes];

    /// Neighbour in the main sequence, `None` at either end.
    pub fn step(self, direction: Direction) -> Option<MainView> {
        match (self, direction) {
            (MainView::Video, Direction::Down) => Some(MainView::Black),
            (MainView::Black, Direction::Down) => Some(MainView::Dunes),
            (MainView::Dunes, Direction::Down) => None,
            (MainView::Dunes, Direction::Up) => Some(MainView::Black),
            (MainView::Black, Direction::Up) => Some(MainView::Video),
            (MainView::Video, Direction::Up) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewTag {
    Video,
    Black,
    Dunes,
    Company,
    Projects,
    Gallery,
    Contact,
    Policy(PolicyId),
    Profile,
    Auth,
}

impl ViewTag {
    pub fn main_view(&self) -> Option<MainView> {
        match self {
            ViewTag::Video => Some(MainView::Video),
            ViewTag::Black => Some(MainView::Black),
            ViewTag::Dunes => Some(MainView::Dunes),
            _ => None,
        }
    }

    pub fn is_overlay(&self) -> bool {
        self.main_view().is_none()
    }

    pub fn backdrop(&self) -> Backdrop {
        match self {
            ViewTag::Video => Backdrop::Video,
            ViewTag::Black => Backdrop::Black,
            ViewTag::Dunes => Backdrop::Image(DUNES_IMAGE_SRC),
            _ => Backdrop::Image(BACKGROUND_IMAGE_SRC),
        }
    }
}

impl From<MainView> for ViewTag {
    fn from(value: MainView) -> Self {
        match value {
            MainView::Video => ViewTag::Video,
            MainView::Black => ViewTag::Black,
            MainView::Dunes => ViewTag::Dunes,
        }
    }
}

impl fmt::Display for ViewTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewTag::Video => f.write_str("video"),
            ViewTag::Black => f.write_str("black"),
            ViewTag::Dunes => f.write_str("dunes"),
            ViewTag::Company => f.write_str("company"),
            ViewTag::Projects => f.write_str("projects"),
            ViewTag::Gallery => f.write_str("gallery"),
            ViewTag::Contact => f.write_str("contact"),
            ViewTag::Policy(id) => write!(f, "policy:{}", id.as_str()),
            ViewTag::Profile => f.write_str("profile"),
            ViewTag::Auth => f.write_str("auth"),
        }
    }
}

/// What the presentation layer paints behind a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "snake_case")]
pub enum Backdrop {
    Video,
    Black,
    Image(&'static str),
}
