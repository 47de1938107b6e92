use std::rc::Rc;

use log::info;

use super::{Entity, Rect};
use crate::gfx::{Align, Font, Sprite, Surface, TextStyle};
use crate::input::{GameEvent, InputState, MouseButton, Outbox};

// ── Buttons ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Start,
    Restart,
    Reskin,
    Redress,
    ToggleMusic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cooldown {
    Ready,
    Armed { since_ms: u64 },
    /// The next poll starts a fresh cooldown instead of firing.
    HoldOff,
}

/// A clickable sprite that posts `ButtonPressed` while the left button is
/// held over it, at most once per `press_delay_ms`.
pub struct Button {
    rect: Rect,
    sprite: Rc<Sprite>,
    label: Option<String>,
    label_style: TextStyle,
    action: ButtonAction,
    press_delay_ms: u64,
    cooldown: Cooldown,
}

impl Button {
    pub fn new(pos: (f32, f32), sprite: Rc<Sprite>, action: ButtonAction, press_delay_ms: u64) -> Self {
        Self {
            rect: Rect::new(pos.0, pos.1, sprite.width() as f32, sprite.height() as f32),
            sprite,
            label: None,
            label_style: TextStyle {
                font: Font::Body,
                color: crate::gfx::WHITE,
                align: Align::Center,
            },
            action,
            press_delay_ms,
            cooldown: Cooldown::Ready,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>, style: TextStyle) -> Self {
        self.label = Some(label.into());
        self.label_style = style;
        self
    }

    pub fn action(&self) -> ButtonAction {
        self.action
    }

    pub fn hold_off(&mut self) {
        self.cooldown = Cooldown::HoldOff;
    }

    /// Returns true when the press was posted.
    pub fn poll(&mut self, input: &InputState, now_ms: u64, outbox: &mut Outbox) -> bool {
        if self.cooldown == Cooldown::HoldOff {
            self.cooldown = Cooldown::Armed { since_ms: now_ms };
            return false;
        }
        if !input.is_held(MouseButton::Left) || !self.rect.contains(input.mouse) {
            return false;
        }
        self.fire(now_ms, outbox)
    }

    /// A fresh left press at `pos`. Fires even when the button was released
    /// again within the same frame; a pending hold-off does not apply to it.
    pub fn press_at(&mut self, pos: (f32, f32), now_ms: u64, outbox: &mut Outbox) -> bool {
        if !self.rect.contains(pos) {
            return false;
        }
        if self.cooldown == Cooldown::HoldOff {
            self.cooldown = Cooldown::Ready;
        }
        self.fire(now_ms, outbox)
    }

    fn fire(&mut self, now_ms: u64, outbox: &mut Outbox) -> bool {
        if let Cooldown::Armed { since_ms } = self.cooldown {
            if now_ms.saturating_sub(since_ms) <= self.press_delay_ms {
                return false;
            }
        }
        info!("button {:?} pressed", self.action);
        self.cooldown = Cooldown::Armed { since_ms: now_ms };
        outbox.post(GameEvent::ButtonPressed(self.action));
        true
    }
}

impl Entity for Button {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.blit(&self.sprite, self.rect.x as i32, self.rect.y as i32);
        if let Some(label) = &self.label {
            let (cx, cy) = self.rect.center();
            surface.text(label, cx as i32, cy as i32, self.label_style);
        }
    }
}

// ── Static sprites ──────────────────────────────────────────────────────────

/// The disappointed onlooker of the game-over screen.
pub struct Girl {
    rect: Rect,
    sprite: Rc<Sprite>,
}

impl Girl {
    pub fn new(pos: (f32, f32), sprite: Rc<Sprite>) -> Self {
        Self {
            rect: Rect::new(pos.0, pos.1, sprite.width() as f32, sprite.height() as f32),
            sprite,
        }
    }
}

impl Entity for Girl {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.blit(&self.sprite, self.rect.x as i32, self.rect.y as i32);
    }
}

// ── Text ────────────────────────────────────────────────────────────────────

pub struct TextSprite {
    text: String,
    pos: (f32, f32),
    style: TextStyle,
}

impl TextSprite {
    pub fn new(text: impl Into<String>, pos: (f32, f32), style: TextStyle) -> Self {
        Self {
            text: text.into(),
            pos,
            style,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
        }
    }
}

impl Entity for TextSprite {
    fn rect(&self) -> Rect {
        Rect::new(self.pos.0, self.pos.1, 0.0, 0.0)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.text(&self.text, self.pos.0 as i32, self.pos.1 as i32, self.style);
    }
}

/// Score read-out; re-renders its text only when the value changes.
pub struct ScoreText {
    value: u32,
    text: TextSprite,
}

impl ScoreText {
    pub fn new(pos: (f32, f32), style: TextStyle) -> Self {
        Self {
            value: 0,
            text: TextSprite::new("0", pos, style),
        }
    }

    pub fn set(&mut self, value: u32) {
        if value != self.value {
            self.value = value;
            self.text.set_text(&value.to_string());
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn text(&self) -> &str {
        self.text.text()
    }
}

impl Entity for ScoreText {
    fn rect(&self) -> Rect {
        self.text.rect()
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.text.draw(surface);
    }
}
