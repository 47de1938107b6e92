//! Visual and physics objects owned by scenes.

mod bird;
mod pipe;
mod road;
mod widgets;

pub use bird::{Bird, BirdPhysics, BirdState};
pub use pipe::{Orientation, Pipe, PipeCommand, PipeGroup, PipeId};
pub use road::Road;
pub use widgets::{Button, ButtonAction, Girl, ScoreText, TextSprite};

use crate::gfx::Surface;

/// Axis-aligned box in logical pixels, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Touching edges do not count as an overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn contains(&self, (x, y): (f32, f32)) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }
}

pub trait Entity {
    fn rect(&self) -> Rect;
    fn draw(&self, surface: &mut dyn Surface);
}
