//! Frame pacing around poll → tick → draw → present.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, trace};

use crate::error::GameError;
use crate::gfx::{BLACK, PixelBuf};
use crate::input::Frame;
use crate::machine::Game;

/// Where frames come from and go to.
pub trait Host {
    fn poll(&mut self) -> io::Result<Frame>;
    fn present(&mut self, canvas: &PixelBuf) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// Measure each frame and sleep off the rest of its budget.
    RealTime,
    /// Constant step, no sleeping.
    Fixed(Duration),
}

pub struct RunLoop {
    frame_budget: Duration,
    timing: Timing,
}

impl RunLoop {
    pub fn new(fps: u32) -> Self {
        Self {
            frame_budget: Duration::from_secs(1) / fps.max(1),
            timing: Timing::RealTime,
        }
    }

    pub fn fixed(dt: Duration) -> Self {
        Self {
            frame_budget: dt,
            timing: Timing::Fixed(dt),
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Runs until the game stops; returns the number of frames played.
    pub fn run(&self, game: &mut Game, host: &mut dyn Host, canvas: &mut PixelBuf) -> Result<u64, GameError> {
        let mut frames = 0u64;
        let mut dt = self.frame_budget;
        while game.is_running() {
            let frame_start = Instant::now();

            let frame = host.poll()?;
            game.tick(&frame, dt.as_millis() as u64)?;
            canvas.clear(BLACK);
            game.draw(canvas);
            host.present(canvas)?;
            frames += 1;

            dt = match self.timing {
                Timing::Fixed(step) => step,
                Timing::RealTime => {
                    let elapsed = frame_start.elapsed();
                    if elapsed < self.frame_budget {
                        thread::sleep(self.frame_budget - elapsed);
                    } else {
                        trace!("frame {frames} over budget by {:?}", elapsed - self.frame_budget);
                    }
                    frame_start.elapsed()
                }
            };
        }
        info!("run loop finished after {frames} frames");
        Ok(frames)
    }
}
