//! Per-frame input and the game-level event queue.

use std::collections::VecDeque;

use crate::entity::ButtonAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// 1 = left, 2 = middle, 3 = right.
    pub fn id(self) -> u8 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
        }
    }

    fn index(self) -> usize {
        self.id() as usize - 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Char(char),
}

/// Events raised by the game itself rather than by the player's devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ButtonPressed(ButtonAction),
    ToggleMusic,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Quit,
    MouseDown { button: MouseButton, pos: (f32, f32) },
    MouseUp { button: MouseButton, pos: (f32, f32) },
    MouseMotion { pos: (f32, f32) },
    Key(Key),
    Game(GameEvent),
}

/// Continuously pollable device state, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    pub mouse: (f32, f32),
    held: [bool; 3],
}

impl InputState {
    pub fn is_held(&self, button: MouseButton) -> bool {
        self.held[button.index()]
    }

    pub fn set_held(&mut self, button: MouseButton, held: bool) {
        self.held[button.index()] = held;
    }
}

/// What the host hands the machine every frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub events: Vec<InputEvent>,
    pub input: InputState,
}

impl Frame {
    pub fn idle(input: InputState) -> Self {
        Self {
            events: Vec::new(),
            input,
        }
    }
}

/// Game events posted now are delivered on the next drain, never re-entrantly.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<GameEvent>,
}

impl Outbox {
    pub fn post(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_ids_match_mouse_convention() {
        assert_eq!(MouseButton::Left.id(), 1);
        assert_eq!(MouseButton::Middle.id(), 2);
        assert_eq!(MouseButton::Right.id(), 3);
    }

    #[test]
    fn held_state_is_per_button() {
        let mut s = InputState::default();
        s.set_held(MouseButton::Right, true);
        assert!(s.is_held(MouseButton::Right));
        assert!(!s.is_held(MouseButton::Left));
    }

    #[test]
    fn outbox_drains_in_post_order() {
        let mut outbox = Outbox::default();
        outbox.post(GameEvent::ToggleMusic);
        outbox.post(GameEvent::Quit);
        let drained: Vec<_> = outbox.drain().collect();
        assert_eq!(drained, vec![GameEvent::ToggleMusic, GameEvent::Quit]);
        assert!(outbox.is_empty());
    }
}
