use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ViewTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCode {
    AutoplayBlocked,
    NotSupported,
    Aborted,
    Unknown,
}

/// Why a media element refused to start.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct PlayRejection {
    pub code: RejectionCode,
    pub message: String,
}

impl PlayRejection {
    pub fn new(code: RejectionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn autoplay_blocked(message: impl Into<String>) -> Self {
        Self::new(RejectionCode::AutoplayBlocked, message)
    }
}

#[derive(Debug, Error)]
pub enum HeroError {
    #[error("view {0} is part of the main sequence and cannot be selected from the menu")]
    NotAnOverlay(ViewTag),
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
    #[error("command queue is full")]
    CommandQueueFull,
    #[error("runtime is no longer accepting commands")]
    RuntimeClosed,
}

impl HeroError {
    pub fn invalid_setting(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
