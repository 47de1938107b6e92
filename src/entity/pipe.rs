use std::rc::Rc;

use log::{debug, trace};

use super::{Entity, Rect};
use crate::gfx::{Sprite, Surface};

pub type PipeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Below the gap, opening upwards.
    Up,
    /// Above the gap, the mirrored image.
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipeCommand {
    SetScrollSpeed(f32),
}

pub struct Pipe {
    id: PipeId,
    rect: Rect,
    orientation: Orientation,
    sprite: Rc<Sprite>,
    scroll_speed: f32,
    bob_frames: u32,
    bob_phase: u32,
    alive: bool,
}

impl Pipe {
    /// `anchor` is the gap centre; the pipe sits `gap / 2` away from it.
    /// The sprite is used as given, so pass the mirrored one for `Down`.
    pub fn new(
        id: PipeId,
        anchor: (f32, f32),
        orientation: Orientation,
        gap: f32,
        scroll_speed: f32,
        sprite: Rc<Sprite>,
    ) -> Self {
        let (w, h) = (sprite.width() as f32, sprite.height() as f32);
        let x = anchor.0.round();
        let y = match orientation {
            Orientation::Up => (anchor.1 + gap / 2.0).round(),
            Orientation::Down => (anchor.1 - gap / 2.0).round() - h,
        };
        trace!("pipe {id} {orientation:?} at ({x}, {y})");
        Self {
            id,
            rect: Rect::new(x, y, w, h),
            orientation,
            sprite,
            scroll_speed,
            bob_frames: 10,
            bob_phase: 0,
            alive: true,
        }
    }

    pub fn with_bob_frames(mut self, frames: u32) -> Self {
        self.bob_frames = frames;
        self
    }

    pub fn update(&mut self, cmd: Option<PipeCommand>) {
        if let Some(PipeCommand::SetScrollSpeed(speed)) = cmd {
            if speed != self.scroll_speed {
                debug!(
                    "pipe {} scroll speed {} -> {}",
                    self.id, self.scroll_speed, speed
                );
            }
            self.scroll_speed = speed;
        }

        if self.scroll_speed == 0.0 {
            return;
        }

        self.rect.x -= self.scroll_speed;

        // Up for `bob_frames`, then down for as many.
        if self.bob_frames > 0 {
            if self.bob_phase < self.bob_frames {
                self.rect.y -= 1.0;
            } else {
                self.rect.y += 1.0;
            }
            self.bob_phase = (self.bob_phase + 1) % (2 * self.bob_frames);
        }

        if self.rect.right() < 0.0 {
            trace!("pipe {} left the screen", self.id);
            self.alive = false;
        }
    }

    pub fn id(&self) -> PipeId {
        self.id
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

impl Entity for Pipe {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.blit(&self.sprite, self.rect.x as i32, self.rect.y as i32);
    }
}

/// The pipes of one flight, oldest first.
#[derive(Default)]
pub struct PipeGroup {
    pipes: Vec<Pipe>,
}

impl PipeGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    /// Updates every pipe and drops the ones that left the screen.
    pub fn update(&mut self, cmd: Option<PipeCommand>) {
        for pipe in &mut self.pipes {
            pipe.update(cmd);
        }
        self.pipes.retain(Pipe::is_alive);
    }

    pub fn lead(&self) -> Option<&Pipe> {
        self.pipes.first()
    }

    pub fn clear(&mut self) {
        self.pipes.clear();
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter()
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for pipe in &self.pipes {
            pipe.draw(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(w: usize, h: usize) -> Rc<Sprite> {
        Rc::new(Sprite::new(w, h))
    }

    #[test]
    fn pair_leaves_the_gap_open() {
        let up = Pipe::new(0, (432.0, 234.0), Orientation::Up, 100.0, 2.0, sprite(52, 320));
        let down = Pipe::new(1, (432.0, 234.0), Orientation::Down, 100.0, 2.0, sprite(52, 320));
        assert_eq!(up.rect().top(), 284.0);
        assert_eq!(down.rect().bottom(), 184.0);
        assert_eq!(up.rect().left(), down.rect().left());
    }

    #[test]
    fn pipe_past_the_left_edge_is_removed_on_the_same_update() {
        let mut group = PipeGroup::new();
        // right edge at x = 5
        group.push(Pipe::new(0, (1.0, 200.0), Orientation::Up, 100.0, 10.0, sprite(4, 20)));
        assert_eq!(group.lead().unwrap().rect().right(), 5.0);

        let mut lone = Pipe::new(0, (1.0, 200.0), Orientation::Up, 100.0, 10.0, sprite(4, 20));
        lone.update(None);
        assert_eq!(lone.rect().right(), -5.0);
        assert!(!lone.is_alive());

        group.update(None);
        assert!(group.is_empty());
    }

    #[test]
    fn zero_speed_freezes_everything() {
        let mut pipe = Pipe::new(0, (200.0, 234.0), Orientation::Up, 100.0, 2.0, sprite(52, 320));
        pipe.update(Some(PipeCommand::SetScrollSpeed(0.0)));
        let frozen = pipe.rect();
        for _ in 0..50 {
            pipe.update(None);
        }
        assert_eq!(pipe.rect(), frozen);
        assert_eq!(pipe.scroll_speed(), 0.0);
    }

    #[test]
    fn new_speed_is_adopted_before_moving() {
        let mut pipe = Pipe::new(0, (200.0, 234.0), Orientation::Up, 100.0, 2.0, sprite(52, 320));
        pipe.update(Some(PipeCommand::SetScrollSpeed(5.0)));
        assert_eq!(pipe.rect().left(), 195.0);
    }

    #[test]
    fn bob_is_symmetric() {
        let mut pipe = Pipe::new(0, (400.0, 234.0), Orientation::Up, 100.0, 1.0, sprite(52, 320));
        let y0 = pipe.rect().y;
        let mut lowest = y0;
        for _ in 0..10 {
            pipe.update(None);
            lowest = lowest.min(pipe.rect().y);
        }
        assert_eq!(lowest, y0 - 10.0);
        for _ in 0..10 {
            pipe.update(None);
        }
        assert_eq!(pipe.rect().y, y0);
    }

    #[test]
    fn lead_is_the_oldest_survivor() {
        let mut group = PipeGroup::new();
        group.push(Pipe::new(7, (10.0, 200.0), Orientation::Down, 100.0, 20.0, sprite(4, 20)));
        group.push(Pipe::new(8, (300.0, 200.0), Orientation::Down, 100.0, 20.0, sprite(4, 20)));
        assert_eq!(group.lead().map(Pipe::id), Some(7));
        group.update(None);
        assert_eq!(group.lead().map(Pipe::id), Some(8));
        assert_eq!(group.len(), 1);
    }
}
