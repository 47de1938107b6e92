use std::{fs, path::Path};

use log::info;
use serde::Deserialize;

use crate::error::ConfigError;

// ── Sections ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub fps: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub caption: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            screen_width: 432,
            screen_height: 468,
            caption: "Chilly Bird".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FontsConfig {
    pub color: [u8; 3],
    /// Logical pixels per dot of the 3x5 score digits.
    pub score_scale: u8,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            color: [235, 221, 190],
            score_scale: 6,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BirdConfig {
    pub size: [u32; 2],
    pub start_x: f32,
    pub gravity_step: f32,
    pub max_gravity: f32,
    pub jump_gravity: f32,
    pub dead_gravity: f32,
    pub dead_angle: f32,
    pub tilt: f32,
    pub anim_period: u32,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            size: [50, 35],
            start_x: 50.0,
            gravity_step: 0.17,
            max_gravity: 2.6,
            jump_gravity: -3.5,
            dead_gravity: 10.0,
            dead_angle: -75.0,
            tilt: -1.25,
            anim_period: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FlyingConfig {
    pub floor_y: f32,
    pub scroll_speed: f32,
    pub pipe_freq_ms: u64,
    pub pipe_gap: f32,
    /// Pair centres are drawn uniformly from mid-height ± this many pixels.
    pub pipe_offset: i32,
    pub pipe_size: [u32; 2],
    pub road_tile_width: f32,
    pub bob_frames: u32,
}

impl Default for FlyingConfig {
    fn default() -> Self {
        Self {
            floor_y: 384.0,
            scroll_speed: 2.0,
            pipe_freq_ms: 1250,
            pipe_gap: 100.0,
            pipe_offset: 50,
            pipe_size: [52, 320],
            road_tile_width: 17.0,
            bob_frames: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ButtonsConfig {
    pub press_delay_ms: u64,
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            press_delay_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
    pub music_fade_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.5,
            music_fade_ms: 500,
        }
    }
}

// ── Root ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub fonts: FontsConfig,
    pub bird: BirdConfig,
    pub flying: FlyingConfig,
    pub buttons: ButtonsConfig,
    pub audio: AudioConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("loading config from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::parse(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.window;
        let f = &self.flying;
        let [bird_w, bird_h] = self.bird.size;
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if w.fps == 0 {
            return invalid("window.fps must be positive".into());
        }
        if w.screen_width == 0 || w.screen_height == 0 {
            return invalid(format!(
                "window size {}x{} is empty",
                w.screen_width, w.screen_height
            ));
        }
        if f.floor_y <= 0.0 || f.floor_y >= w.screen_height as f32 {
            return invalid(format!(
                "flying.floor_y {} must lie inside the screen height {}",
                f.floor_y, w.screen_height
            ));
        }
        if f.pipe_gap <= 0.0 || f.pipe_freq_ms == 0 || f.road_tile_width <= 0.0 {
            return invalid("pipe gap, pipe frequency and road tile width must be positive".into());
        }
        if f.scroll_speed <= 0.0 {
            return invalid(format!(
                "flying.scroll_speed {} must be positive or pipes never leave the screen",
                f.scroll_speed
            ));
        }
        if f.pipe_offset < 0 {
            return invalid("flying.pipe_offset cannot be negative".into());
        }
        if bird_w == 0 || bird_h == 0 || bird_w >= w.screen_width || bird_h as f32 >= f.floor_y {
            return invalid(format!("bird size {bird_w}x{bird_h} does not fit the play field"));
        }
        if self.bird.anim_period == 0 {
            return invalid("bird.anim_period must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return invalid(format!("audio.volume {} is outside [0, 1]", self.audio.volume));
        }
        Ok(())
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (
            self.window.screen_width as f32,
            self.window.screen_height as f32,
        )
    }
}
