//! Bird reskinning.

use std::rc::Rc;

use log::info;

use crate::assets::{SKINS, paint_bird};
use crate::gfx::Sprite;

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Saved(Rc<Sprite>),
    Cancelled,
    /// The player asked to leave the whole game from inside the editor.
    Quit,
}

/// Runs synchronously and owns the display until it returns.
pub trait SkinEditor {
    fn edit(&mut self, current: &Sprite) -> EditOutcome;
}

/// Native size of a painted skin, scaled to the bird on save.
const SKIN_CANVAS: (usize, usize) = (50, 35);

/// Hands out the bird re-painted in the next palette on every call.
pub struct PaletteSkins {
    next: usize,
}

impl PaletteSkins {
    pub fn new() -> Self {
        Self { next: 0 }
    }
}

impl Default for PaletteSkins {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinEditor for PaletteSkins {
    fn edit(&mut self, current: &Sprite) -> EditOutcome {
        let palette = &SKINS[self.next % SKINS.len()];
        self.next += 1;
        info!("bird reskinned as {}", palette.name);
        let skin = paint_bird(SKIN_CANVAS.0, SKIN_CANVAS.1, palette, 0);
        EditOutcome::Saved(Rc::new(skin.scaled(current.width(), current.height())))
    }
}
