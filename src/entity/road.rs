use std::rc::Rc;

use log::debug;

use super::{Entity, Rect};
use crate::gfx::{Sprite, Surface};

/// The floor strip. Scrolls by shifting its texture left within one tile.
pub struct Road {
    sprite: Rc<Sprite>,
    y: f32,
    scroll: f32,
}

impl Road {
    pub fn new(sprite: Rc<Sprite>, y: f32) -> Self {
        debug!("road created at y={y}");
        Self {
            sprite,
            y,
            scroll: 0.0,
        }
    }

    pub fn set_scroll(&mut self, scroll: f32) {
        self.scroll = scroll;
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }
}

impl Entity for Road {
    fn rect(&self) -> Rect {
        Rect::new(
            self.scroll,
            self.y,
            self.sprite.width() as f32,
            self.sprite.height() as f32,
        )
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.blit(&self.sprite, self.scroll.round() as i32, self.y as i32);
    }
}
