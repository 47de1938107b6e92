//! Terminal host: crossterm input in, half-block frames out.

use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute, terminal,
};
use log::{debug, info, warn};

use crate::config::WindowConfig;
use crate::gfx::PixelBuf;
use crate::input::{Frame, InputEvent, InputState, Key, MouseButton};
use crate::run_loop::Host;

/// Turns terminal events into logical-pixel input.
#[derive(Debug, Clone)]
pub struct InputMapper {
    logical: (f32, f32),
    cols: u16,
    rows: u16,
    pressed: [bool; 3],
    input: InputState,
}

impl InputMapper {
    pub fn new(logical: (f32, f32), cols: u16, rows: u16) -> Self {
        Self {
            logical,
            cols: cols.max(1),
            rows: rows.max(1),
            pressed: [false; 3],
            input: InputState::default(),
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        debug!("terminal resized to {cols}x{rows}");
        self.cols = cols.max(1);
        self.rows = rows.max(1);
    }

    pub fn terminal_size(&self) -> (usize, usize) {
        (self.cols as usize, self.rows as usize)
    }

    /// Centre of the cell, in logical pixels.
    pub fn to_logical(&self, column: u16, row: u16) -> (f32, f32) {
        (
            (column as f32 + 0.5) * self.logical.0 / self.cols as f32,
            (row as f32 + 0.5) * self.logical.1 / self.rows as f32,
        )
    }

    fn button(b: event::MouseButton) -> MouseButton {
        match b {
            event::MouseButton::Left => MouseButton::Left,
            event::MouseButton::Middle => MouseButton::Middle,
            event::MouseButton::Right => MouseButton::Right,
        }
    }

    fn set_pressed(&mut self, button: MouseButton, down: bool) {
        self.pressed[button.id() as usize - 1] = down;
        self.input.set_held(button, down);
    }

    fn mouse(&mut self, m: MouseEvent, out: &mut Vec<InputEvent>) {
        let pos = self.to_logical(m.column, m.row);
        self.input.mouse = pos;
        match m.kind {
            MouseEventKind::Down(b) => {
                let button = Self::button(b);
                self.set_pressed(button, true);
                out.push(InputEvent::MouseDown { button, pos });
            }
            MouseEventKind::Up(b) => {
                let button = Self::button(b);
                self.set_pressed(button, false);
                out.push(InputEvent::MouseUp { button, pos });
            }
            MouseEventKind::Drag(_) | MouseEventKind::Moved => out.push(InputEvent::MouseMotion { pos }),
            _ => {}
        }
    }

    /// Returns true when the key taps the left button for this frame.
    fn key(&mut self, k: KeyEvent, out: &mut Vec<InputEvent>) -> bool {
        if k.kind != KeyEventKind::Press {
            return false;
        }
        match k.code {
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => out.push(InputEvent::Quit),
            KeyCode::Char('q') | KeyCode::Esc => out.push(InputEvent::Quit),
            KeyCode::Char(' ') | KeyCode::Up => {
                out.push(InputEvent::Key(Key::Space));
                return true;
            }
            KeyCode::Enter => out.push(InputEvent::Key(Key::Enter)),
            KeyCode::Char(c) => out.push(InputEvent::Key(Key::Char(c))),
            _ => {}
        }
        false
    }

    /// Builds one frame from everything the terminal reported since the last.
    pub fn frame(&mut self, events: impl IntoIterator<Item = Event>) -> Frame {
        // A key tap only lasts one frame; real buttons stay as reported.
        let left = self.pressed[0];
        self.input.set_held(MouseButton::Left, left);

        let mut out = Vec::new();
        let mut tap = false;
        for ev in events {
            match ev {
                Event::Key(k) => tap |= self.key(k, &mut out),
                Event::Mouse(m) => self.mouse(m, &mut out),
                Event::Resize(c, r) => self.resize(c, r),
                _ => {}
            }
        }
        if tap {
            self.input.set_held(MouseButton::Left, true);
        }
        Frame {
            events: out,
            input: self.input,
        }
    }
}

/// Owns the terminal for the lifetime of the game and restores it on drop.
pub struct TerminalHost {
    out: Stdout,
    mapper: InputMapper,
}

impl TerminalHost {
    pub fn open(window: &WindowConfig) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
            EnableMouseCapture,
            terminal::SetTitle(&window.caption),
        )?;
        let (cols, rows) = terminal::size()?;
        info!("terminal opened at {cols}x{rows}");
        Ok(Self {
            out,
            mapper: InputMapper::new(
                (window.screen_width as f32, window.screen_height as f32),
                cols,
                rows,
            ),
        })
    }
}

impl Host for TerminalHost {
    fn poll(&mut self) -> io::Result<Frame> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            events.push(event::read()?);
        }
        Ok(self.mapper.frame(events))
    }

    fn present(&mut self, canvas: &PixelBuf) -> io::Result<()> {
        let (cols, rows) = self.mapper.terminal_size();
        canvas.render(&mut self.out, cols, rows)
    }
}

impl Drop for TerminalHost {
    fn drop(&mut self) {
        let restored = execute!(
            self.out,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )
        .and_then(|_| terminal::disable_raw_mode())
        .and_then(|_| self.out.flush());
        if let Err(e) = restored {
            warn!("failed to restore the terminal: {e}");
        }
    }
}
