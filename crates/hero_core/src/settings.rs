use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::{
    assets::{AUDIO_SRC, VIDEO_SRC},
    error::HeroError,
};

use crate::gesture::GestureTiming;

const SETTINGS_FILE: &str = "hero.toml";
const MIN_COOLDOWN_MS: u64 = 1_000;
const MAX_COOLDOWN_MS: u64 = 1_500;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeroSettings {
    pub audio_src: String,
    pub video_src: String,
    pub fade_duration_ms: u64,
    pub fade_steps: u32,
    pub scroll_volume_step: f64,
    pub scroll_audio_blend: bool,
    pub time_update_throttle_ms: u64,
    pub swap_lead_seconds: f64,
    pub noise_floor: f64,
    pub direction_reset_ms: u64,
    pub debounce_ms: u64,
    pub wheel_cooldown_ms: u64,
    pub touch_cooldown_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for HeroSettings {
    fn default() -> Self {
        Self {
            audio_src: AUDIO_SRC.into(),
            video_src: VIDEO_SRC.into(),
            fade_duration_ms: 1_500,
            fade_steps: 30,
            scroll_volume_step: 0.05,
            scroll_audio_blend: true,
            time_update_throttle_ms: 100,
            swap_lead_seconds: 1.0,
            noise_floor: 1.0,
            direction_reset_ms: 300,
            debounce_ms: 10,
            wheel_cooldown_ms: 1_000,
            touch_cooldown_ms: 1_500,
            frame_interval_ms: 16,
        }
    }
}

impl HeroSettings {
    pub fn gesture_timing(&self) -> GestureTiming {
        GestureTiming {
            noise_floor: self.noise_floor,
            direction_reset_ms: self.direction_reset_ms,
            debounce_ms: self.debounce_ms,
            wheel_cooldown_ms: self.wheel_cooldown_ms,
            touch_cooldown_ms: self.touch_cooldown_ms,
        }
    }

    pub fn validate(&self) -> Result<(), HeroError> {
        if self.fade_steps == 0 {
            return Err(HeroError::invalid_setting("fade_steps", "must be at least 1"));
        }
        if !(self.scroll_volume_step > 0.0 && self.scroll_volume_step <= 1.0) {
            return Err(HeroError::invalid_setting(
                "scroll_volume_step",
                format!("{} is outside (0, 1]", self.scroll_volume_step),
            ));
        }
        if !(self.swap_lead_seconds.is_finite() && self.swap_lead_seconds >= 0.0) {
            return Err(HeroError::invalid_setting(
                "swap_lead_seconds",
                "must be a finite, non-negative number of seconds",
            ));
        }
        if !(self.noise_floor.is_finite() && self.noise_floor >= 0.0) {
            return Err(HeroError::invalid_setting(
                "noise_floor",
                "must be a finite, non-negative delta",
            ));
        }
        for (field, value) in [
            ("wheel_cooldown_ms", self.wheel_cooldown_ms),
            ("touch_cooldown_ms", self.touch_cooldown_ms),
        ] {
            if !(MIN_COOLDOWN_MS..=MAX_COOLDOWN_MS).contains(&value) {
                return Err(HeroError::invalid_setting(
                    field,
                    format!("{value}ms is outside {MIN_COOLDOWN_MS}..={MAX_COOLDOWN_MS}ms"),
                ));
            }
        }
        if self.debounce_ms >= self.wheel_cooldown_ms.min(self.touch_cooldown_ms) {
            return Err(HeroError::invalid_setting(
                "debounce_ms",
                "must be shorter than every cooldown",
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(HeroError::invalid_setting(
                "frame_interval_ms",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

pub fn parse_settings(raw: &str) -> anyhow::Result<HeroSettings> {
    let settings: HeroSettings = toml::from_str(raw).context("failed to parse hero settings")?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<HeroSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read hero settings '{}'", path.display()))?;
    parse_settings(&raw)
}

/// `hero.toml` in the working directory, then `HERO__*` environment
/// overrides. Unreadable files and unparsable values keep the defaults.
pub fn load_settings() -> HeroSettings {
    let mut settings = match load_settings_from(Path::new(SETTINGS_FILE)) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::debug!("settings: using defaults reason={err:#}");
            HeroSettings::default()
        }
    };

    if let Ok(v) = std::env::var("HERO__AUDIO_SRC") {
        settings.audio_src = v;
    }
    if let Ok(v) = std::env::var("HERO__VIDEO_SRC") {
        settings.video_src = v;
    }
    override_parsed("HERO__FADE_DURATION_MS", &mut settings.fade_duration_ms);
    override_parsed("HERO__FADE_STEPS", &mut settings.fade_steps);
    override_parsed("HERO__SCROLL_VOLUME_STEP", &mut settings.scroll_volume_step);
    override_parsed("HERO__SCROLL_AUDIO_BLEND", &mut settings.scroll_audio_blend);
    override_parsed(
        "HERO__TIME_UPDATE_THROTTLE_MS",
        &mut settings.time_update_throttle_ms,
    );
    override_parsed("HERO__SWAP_LEAD_SECONDS", &mut settings.swap_lead_seconds);
    override_parsed("HERO__NOISE_FLOOR", &mut settings.noise_floor);
    override_parsed("HERO__DIRECTION_RESET_MS", &mut settings.direction_reset_ms);
    override_parsed("HERO__DEBOUNCE_MS", &mut settings.debounce_ms);
    override_parsed("HERO__WHEEL_COOLDOWN_MS", &mut settings.wheel_cooldown_ms);
    override_parsed("HERO__TOUCH_COOLDOWN_MS", &mut settings.touch_cooldown_ms);
    override_parsed("HERO__FRAME_INTERVAL_MS", &mut settings.frame_interval_ms);

    if let Err(err) = settings.validate() {
        tracing::warn!("settings: overrides rejected, using defaults reason={err}");
        return HeroSettings::default();
    }

    settings
}

fn override_parsed<T: std::str::FromStr>(key: &str, slot: &mut T) {
    if let Ok(v) = std::env::var(key) {
        if let Ok(parsed) = v.parse::<T>() {
            *slot = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
