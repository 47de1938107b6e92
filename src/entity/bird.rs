use std::rc::Rc;

use log::{debug, trace};

use super::{Entity, Rect};
use crate::config::{BirdConfig, FlyingConfig};
use crate::gfx::{Sprite, Surface};

/// Tuning constants for the bird, taken from config once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdPhysics {
    pub floor_y: f32,
    pub gravity_step: f32,
    pub max_gravity: f32,
    pub jump_gravity: f32,
    pub dead_gravity: f32,
    pub dead_angle: f32,
    pub tilt: f32,
    pub anim_period: u32,
}

impl BirdPhysics {
    pub fn from_config(bird: &BirdConfig, flying: &FlyingConfig) -> Self {
        Self {
            floor_y: flying.floor_y,
            gravity_step: bird.gravity_step,
            max_gravity: bird.max_gravity,
            jump_gravity: bird.jump_gravity,
            dead_gravity: bird.dead_gravity,
            dead_angle: bird.dead_angle,
            tilt: bird.tilt,
            anim_period: bird.anim_period.max(1),
        }
    }
}

impl Default for BirdPhysics {
    fn default() -> Self {
        Self::from_config(&BirdConfig::default(), &FlyingConfig::default())
    }
}

/// Everything about the bird that `reset` restores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdState {
    pub center: (f32, f32),
    pub gravity: f32,
    pub frame: usize,
    pub angle: f32,
    pub flying: bool,
    pub visible: bool,
    pub clicked: bool,
}

pub struct Bird {
    initial_center: (f32, f32),
    rect: Rect,
    frames: Vec<Rc<Sprite>>,
    initial_frames: Vec<Rc<Sprite>>,
    frame: usize,
    anim_ticks: u32,
    gravity: f32,
    angle: f32,
    clicked: bool,
    /// Under gravity and accepting jumps.
    pub flying: bool,
    /// Alive; a dead bird is drawn plunging instead of flapping.
    pub visible: bool,
    physics: BirdPhysics,
}

impl Bird {
    pub fn new(
        center: (f32, f32),
        size: (f32, f32),
        frames: Vec<Rc<Sprite>>,
        physics: BirdPhysics,
    ) -> Self {
        debug!("bird created at {center:?} with {} frames", frames.len());
        Self {
            initial_center: center,
            rect: Rect::from_center(center.0, center.1, size.0, size.1),
            initial_frames: frames.clone(),
            frames,
            frame: 0,
            anim_ticks: 0,
            gravity: 0.0,
            angle: 0.0,
            clicked: false,
            flying: false,
            visible: true,
            physics,
        }
    }

    pub fn reset(&mut self) {
        let (w, h) = (self.rect.w, self.rect.h);
        let (cx, cy) = self.initial_center;
        self.rect = Rect::from_center(cx, cy, w, h);
        self.frame = 0;
        self.anim_ticks = 0;
        self.gravity = 0.0;
        self.angle = 0.0;
        self.clicked = false;
        self.flying = false;
        self.visible = true;
    }

    /// Advances one frame. Returns true when a jump fired.
    pub fn update(&mut self, pressed: bool) -> bool {
        let mut jumped = false;
        if self.flying {
            self.fly();
        }

        if self.visible {
            if self.flying {
                if pressed && !self.clicked {
                    trace!("bird jump");
                    self.clicked = true;
                    self.gravity = self.physics.jump_gravity;
                    jumped = true;
                }
                if !pressed {
                    self.clicked = false;
                }
            }

            self.anim_ticks += 1;
            if self.anim_ticks >= self.physics.anim_period {
                self.anim_ticks = 0;
                self.frame = (self.frame + 1) % self.frames.len().max(1);
            }
            self.angle = self.gravity * self.physics.tilt;
        } else {
            self.angle = self.physics.dead_angle;
            // A bird lying on the floor keeps its last gravity.
            if self.flying {
                self.gravity = self.physics.dead_gravity;
            }
        }
        jumped
    }

    fn fly(&mut self) {
        self.gravity = (self.gravity + self.physics.gravity_step).min(self.physics.max_gravity);
        if self.rect.bottom() < self.physics.floor_y {
            self.rect.y += self.gravity.floor();
        }
    }

    /// Replaces every animation frame with `skin`.
    pub fn set_skin(&mut self, skin: Rc<Sprite>) {
        let n = self.frames.len().max(1);
        self.frames = vec![skin; n];
    }

    /// Goes back to the frames the bird was created with.
    pub fn redress(&mut self) {
        self.frames = self.initial_frames.clone();
    }

    pub fn current_frame(&self) -> Option<&Rc<Sprite>> {
        self.frames.get(self.frame)
    }

    pub fn is_alive(&self) -> bool {
        self.visible
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn move_to(&mut self, center: (f32, f32)) {
        self.rect = Rect::from_center(center.0, center.1, self.rect.w, self.rect.h);
    }

    pub fn state(&self) -> BirdState {
        BirdState {
            center: self.rect.center(),
            gravity: self.gravity,
            frame: self.frame,
            angle: self.angle,
            flying: self.flying,
            visible: self.visible,
            clicked: self.clicked,
        }
    }
}

impl Entity for Bird {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let Some(frame) = self.current_frame() else {
            return;
        };
        let image = frame.rotated(self.angle);
        let (cx, cy) = self.rect.center();
        let x = (cx - image.width() as f32 / 2.0).round() as i32;
        let y = (cy - image.height() as f32 / 2.0).round() as i32;
        surface.blit(&image, x, y);
    }
}
