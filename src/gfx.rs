use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    pub const fn darken(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }

    fn to_crossterm(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb(c[0], c[1], c[2])
    }
}

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Sprites ─────────────────────────────────────────────────────────────────

/// A small transparent-capable image in logical pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    w: usize,
    h: usize,
    px: Vec<Option<Rgb>>,
}

impl Sprite {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![None; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = Some(c);
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize]
        } else {
            None
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, c: Rgb) {
        let (x0, x1) = ((cx - rx).floor() as i32, (cx + rx).ceil() as i32);
        let (y0, y1) = ((cy - ry).floor() as i32, (cy + ry).ceil() as i32);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.set(x, y, c);
                }
            }
        }
    }

    pub fn flipped_vertical(&self) -> Sprite {
        let mut out = Sprite::new(self.w, self.h);
        for y in 0..self.h {
            let src = (self.h - 1 - y) * self.w;
            out.px[y * self.w..(y + 1) * self.w].copy_from_slice(&self.px[src..src + self.w]);
        }
        out
    }

    /// Rotates counter-clockwise by `degrees`, growing the frame to fit.
    pub fn rotated(&self, degrees: f32) -> Sprite {
        if degrees.rem_euclid(360.0) == 0.0 {
            return self.clone();
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (self.w as f32, self.h as f32);
        let nw = (w * cos.abs() + h * sin.abs()).round().max(1.0) as usize;
        let nh = (w * sin.abs() + h * cos.abs()).round().max(1.0) as usize;
        let (scx, scy) = (w / 2.0, h / 2.0);
        let (dcx, dcy) = (nw as f32 / 2.0, nh as f32 / 2.0);

        let mut out = Sprite::new(nw, nh);
        for y in 0..nh {
            for x in 0..nw {
                let dx = x as f32 + 0.5 - dcx;
                let dy = y as f32 + 0.5 - dcy;
                let sx = cos * dx - sin * dy + scx;
                let sy = sin * dx + cos * dy + scy;
                if let Some(c) = self.get(sx.floor() as i32, sy.floor() as i32) {
                    out.px[y * nw + x] = Some(c);
                }
            }
        }
        out
    }

    pub fn scaled(&self, w: usize, h: usize) -> Sprite {
        let mut out = Sprite::new(w, h);
        if self.w == 0 || self.h == 0 {
            return out;
        }
        for y in 0..h {
            for x in 0..w {
                out.px[y * w + x] = self.px[(y * self.h / h) * self.w + x * self.w / w];
            }
        }
        out
    }

    pub fn recolored(&self, f: impl Fn(Rgb) -> Rgb) -> Sprite {
        Sprite {
            w: self.w,
            h: self.h,
            px: self.px.iter().map(|p| p.map(&f)).collect(),
        }
    }
}

// ── Drawing contract ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Font {
    /// 3x5 bitmap digits, each dot `scale` pixels square.
    Score { scale: u8 },
    /// Terminal text laid over the pixels.
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub font: Font,
    pub color: Rgb,
    pub align: Align,
}

pub trait Surface {
    fn size(&self) -> (usize, usize);
    fn blit(&mut self, sprite: &Sprite, x: i32, y: i32);
    fn text(&mut self, text: &str, x: i32, y: i32, style: TextStyle);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
    pub align: Align,
}

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize,
    px: Vec<Rgb>,
    labels: Vec<Label>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![BLACK; w * h],
            labels: Vec::new(),
        }
    }

    pub fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
        self.labels.clear();
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Colour seen by terminal pixel (`col`, `prow`) of a `cols` x `prows` grid.
    fn sample(&self, col: usize, prow: usize, cols: usize, prows: usize) -> Rgb {
        let x = ((2 * col + 1) * self.w / (2 * cols)).min(self.w - 1);
        let y = ((2 * prow + 1) * self.h / (2 * prows)).min(self.h - 1);
        self.get(x, y)
    }

    /// Downsamples onto a `cols` x `rows` terminal, two pixels per cell.
    pub fn render(&self, out: &mut impl Write, cols: usize, rows: usize) -> io::Result<()> {
        if cols == 0 || rows == 0 || self.w == 0 || self.h == 0 {
            return Ok(());
        }
        queue!(out, cursor::MoveTo(0, 0))?;
        let prows = rows * 2;
        let mut prev_fg = BLACK;
        let mut prev_bg = BLACK;
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..cols {
                let top = self.sample(col, row * 2, cols, prows);
                let bot = self.sample(col, row * 2 + 1, cols, prows);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(top.to_crossterm()))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(top.to_crossterm()))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(bot.to_crossterm()))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }

        for label in &self.labels {
            self.render_label(out, label, cols, rows)?;
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }

    fn render_label(
        &self,
        out: &mut impl Write,
        label: &Label,
        cols: usize,
        rows: usize,
    ) -> io::Result<()> {
        if label.x < 0 || label.y < 0 || label.y as usize >= self.h {
            return Ok(());
        }
        let row = label.y as usize * rows / self.h;
        let anchor = (label.x as usize * cols / self.w) as i64;
        let len = label.text.chars().count() as i64;
        let start = match label.align {
            Align::Left => anchor,
            Align::Center => anchor - len / 2,
        };
        let skip = (-start).max(0) as usize;
        let col = start.max(0) as usize;
        if col >= cols {
            return Ok(());
        }
        let visible: String = label.text.chars().skip(skip).take(cols - col).collect();
        let bg = self.sample(col, row * 2 + 1, cols, rows * 2);
        queue!(
            out,
            cursor::MoveTo(col as u16, row as u16),
            style::SetForegroundColor(label.color.to_crossterm()),
            style::SetBackgroundColor(bg.to_crossterm()),
            style::Print(visible),
        )
    }
}

impl Surface for PixelBuf {
    fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    fn blit(&mut self, sprite: &Sprite, x: i32, y: i32) {
        for sy in 0..sprite.h {
            let ty = y + sy as i32;
            if ty < 0 || ty as usize >= self.h {
                continue;
            }
            for sx in 0..sprite.w {
                if let Some(c) = sprite.px[sy * sprite.w + sx] {
                    self.set(x + sx as i32, ty, c);
                }
            }
        }
    }

    fn text(&mut self, text: &str, x: i32, y: i32, style: TextStyle) {
        match style.font {
            Font::Score { scale } => {
                let cx = match style.align {
                    Align::Center => x,
                    Align::Left => x + number_width(text, scale) / 2,
                };
                draw_number(self, cx, y, text, style.color, scale.max(1) as i32);
            }
            Font::Body => self.labels.push(Label {
                text: text.to_owned(),
                x,
                y,
                color: style.color,
                align: style.align,
            }),
        }
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb, scale: i32) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32 * scale;
                let py = y + row as i32 * scale;
                buf.fill_rect(px + scale / 2, py + scale / 2, scale, scale, SHADOW);
                buf.fill_rect(px, py, scale, scale, fg);
            }
        }
    }
}

fn number_width(text: &str, scale: u8) -> i32 {
    let digits = text.chars().filter(char::is_ascii_digit).count() as i32;
    (digits * 4 - 1).max(0) * scale.max(1) as i32 // 3 dots per digit + 1 spacing
}

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, text: &str, fg: Rgb, scale: i32) {
    let digits: Vec<u8> = text
        .chars()
        .filter_map(|ch| ch.to_digit(10).map(|d| d as u8))
        .collect();
    let total_w = (digits.len() as i32 * 4 - 1) * scale;
    let start_x = cx - total_w / 2;
    for (i, d) in digits.into_iter().enumerate() {
        draw_digit(buf, start_x + i as i32 * 4 * scale, y, d, fg, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb(200, 0, 0);

    #[test]
    fn lerp_endpoints() {
        assert_eq!(Rgb::lerp(BLACK, WHITE, 0), BLACK);
        assert_eq!(Rgb::lerp(BLACK, WHITE, 256), WHITE);
    }

    #[test]
    fn flip_swaps_rows() {
        let mut s = Sprite::new(2, 3);
        s.set(0, 0, RED);
        let f = s.flipped_vertical();
        assert_eq!(f.get(0, 2), Some(RED));
        assert_eq!(f.get(0, 0), None);
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let mut s = Sprite::new(10, 4);
        s.fill_rect(0, 0, 10, 4, RED);
        let r = s.rotated(90.0);
        assert_eq!((r.width(), r.height()), (4, 10));
    }

    #[test]
    fn counter_clockwise_turn_lifts_the_right_edge() {
        let mut s = Sprite::new(9, 9);
        s.set(8, 4, RED); // right-middle
        let r = s.rotated(90.0);
        // The right-middle pixel ends up top-middle.
        assert_eq!(r.get(4, 0), Some(RED));
    }

    #[test]
    fn zero_rotation_is_identity() {
        let mut s = Sprite::new(3, 2);
        s.set(1, 1, RED);
        assert_eq!(s.rotated(0.0), s);
    }

    #[test]
    fn blit_skips_transparent_pixels() {
        let mut buf = PixelBuf::new(4, 4);
        buf.clear(WHITE);
        let mut s = Sprite::new(2, 2);
        s.set(1, 1, RED);
        buf.blit(&s, 1, 1);
        assert_eq!(buf.get(1, 1), WHITE);
        assert_eq!(buf.get(2, 2), RED);
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut buf = PixelBuf::new(2, 2);
        let mut s = Sprite::new(3, 3);
        s.fill_rect(0, 0, 3, 3, RED);
        buf.blit(&s, -1, -1);
        assert_eq!(buf.get(0, 0), RED);
        assert_eq!(buf.get(1, 1), RED);
    }

    #[test]
    fn body_text_becomes_a_label_and_clear_drops_it() {
        let mut buf = PixelBuf::new(10, 10);
        let style = TextStyle {
            font: Font::Body,
            color: WHITE,
            align: Align::Center,
        };
        buf.text("hi", 5, 5, style);
        assert_eq!(buf.labels().len(), 1);
        assert_eq!(buf.labels()[0].text, "hi");
        buf.clear(BLACK);
        assert!(buf.labels().is_empty());
    }

    #[test]
    fn score_text_paints_digits() {
        let mut buf = PixelBuf::new(40, 20);
        buf.clear(BLACK);
        let style = TextStyle {
            font: Font::Score { scale: 2 },
            color: WHITE,
            align: Align::Center,
        };
        buf.text("1", 20, 2, style);
        // Middle column of "1" is lit on the first row.
        let lit = (0..40).any(|x| buf.get(x, 2) == WHITE);
        assert!(lit);
        assert!(buf.labels().is_empty());
    }

    #[test]
    fn render_emits_half_blocks() {
        let mut buf = PixelBuf::new(2, 4);
        buf.clear(WHITE);
        buf.set(0, 0, RED);
        let mut out = Vec::new();
        buf.render(&mut out, 2, 2).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('\u{2580}'));
    }
}
