use fundsp::prelude::*;
use log::{debug, info};
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, buffer::SamplesBuffer};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::AudioConfig;

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Jump,
    Hit,
}

/// Fire-and-forget audio. Nothing here reports failure back to the game.
pub trait Audio {
    fn play(&mut self, sound: Sound);
    fn play_music(&mut self);
    fn fade_out_music(&mut self, ms: u64);
    fn is_music_playing(&self) -> bool;
    /// Advances fades; called once per frame.
    fn pump(&mut self) {}
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output: {0}")]
    NoDevice(#[from] rodio::StreamError),
}

// ── Silent ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Silent {
    music: bool,
}

impl Audio for Silent {
    fn play(&mut self, _sound: Sound) {}

    fn play_music(&mut self) {
        self.music = true;
    }

    fn fade_out_music(&mut self, _ms: u64) {
        self.music = false;
    }

    fn is_music_playing(&self) -> bool {
        self.music
    }
}

// ── Sounds ──────────────────────────────────────────────────────────────────

fn render(secs: f32, mut next: impl FnMut() -> f32, gain: impl Fn(f32) -> f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * secs) as usize;
    (0..n)
        .map(|i| next() * gain(i as f32 / SAMPLE_RATE as f32))
        .collect()
}

/// Linear ramp from `from` to `to` over `secs`, then held.
fn ramp(from: f32, to: f32, secs: f32, t: f32) -> f32 {
    from + (to - from) * (t / secs).min(1.0)
}

fn jump_samples() -> Vec<f32> {
    // Quick upward chirp.
    let mut chirp = lfo(|t: f64| 300.0 + 600.0 * (t / 0.12).min(1.0)) >> sine::<f32>();
    render(0.12, || chirp.get_mono(), |t| ramp(0.25, 0.0, 0.12, t))
}

fn hit_samples() -> Vec<f32> {
    // Falling sawtooth, 400Hz to 80Hz over 0.4s.
    let mut fall = lfo(|t: f64| 400.0 - 320.0 * (t / 0.4).min(1.0)) >> saw();
    render(0.5, || fall.get_mono(), |t| ramp(0.15, 0.0, 0.5, t))
}

fn theme_samples() -> Vec<f32> {
    const NOTES: [f32; 16] = [
        523.25, 659.25, 783.99, 659.25, 587.33, 698.46, 880.00, 698.46, 523.25, 659.25, 783.99,
        1046.5, 987.77, 783.99, 587.33, 493.88,
    ];
    const NOTE_SECS: f32 = 0.25;
    let mut out = Vec::new();
    for freq in NOTES {
        let mut tone = sine_hz::<f32>(freq);
        out.extend(render(NOTE_SECS, || tone.get_mono(), |t| {
            0.08 * (1.0 - t / NOTE_SECS).max(0.0)
        }));
    }
    out
}

fn buffer(samples: Vec<f32>) -> SamplesBuffer {
    SamplesBuffer::new(1, SAMPLE_RATE, samples)
}

// ── Rodio output ────────────────────────────────────────────────────────────

struct Fade {
    started: Instant,
    duration: Duration,
}

pub struct RodioAudio {
    stream: OutputStream,
    music: Option<Sink>,
    fade: Option<Fade>,
    volume: f32,
    jump: SamplesBuffer,
    hit: SamplesBuffer,
    theme: SamplesBuffer,
}

impl RodioAudio {
    pub fn open(cfg: &AudioConfig) -> Result<Self, AudioError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // The drop notice would land on the restored terminal.
        stream.log_on_drop(false);
        info!("audio output opened");
        Ok(Self {
            stream,
            music: None,
            fade: None,
            volume: cfg.volume,
            jump: buffer(jump_samples()),
            hit: buffer(hit_samples()),
            theme: buffer(theme_samples()),
        })
    }
}

impl Audio for RodioAudio {
    fn play(&mut self, sound: Sound) {
        let source = match sound {
            Sound::Jump => self.jump.clone(),
            Sound::Hit => self.hit.clone(),
        };
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.detach(); // Play in background
    }

    fn play_music(&mut self) {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(self.theme.clone().repeat_infinite());
        self.music = Some(sink);
        self.fade = None;
        debug!("music started");
    }

    fn fade_out_music(&mut self, ms: u64) {
        if self.music.is_some() {
            self.fade = Some(Fade {
                started: Instant::now(),
                duration: Duration::from_millis(Ord::max(ms, 1)),
            });
        }
    }

    fn is_music_playing(&self) -> bool {
        self.music.is_some() && self.fade.is_none()
    }

    fn pump(&mut self) {
        let Some(fade) = &self.fade else {
            return;
        };
        let t = fade.started.elapsed().as_secs_f32() / fade.duration.as_secs_f32();
        if t >= 1.0 {
            // Dropping a sink that was never detached stops it.
            self.music = None;
            self.fade = None;
            debug!("music faded out");
        } else if let Some(sink) = &self.music {
            sink.set_volume(self.volume * (1.0 - t));
        }
    }
}
